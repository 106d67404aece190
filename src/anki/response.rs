use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use crate::core::BridgeError;

/// Response envelope the remote store wraps every result in.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl ApiResponse<Value> {
    pub fn parse(raw: Value) -> Result<Self, BridgeError> {
        Ok(serde_json::from_value(raw)?)
    }
}

impl<T> ApiResponse<T> {
    /// Application-level errors come back as a non-null `error` field with a
    /// 200 status; surface them verbatim.
    pub fn into_result(self) -> Result<Option<T>, BridgeError> {
        match self.error {
            Some(error) => Err(BridgeError::Remote(error)),
            None => Ok(self.result),
        }
    }
}
