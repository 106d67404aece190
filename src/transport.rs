use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tokio::runtime::Runtime;

use crate::core::BridgeError;

/// Carries one serialized request body to the remote store and returns the
/// raw response body. Called from the correlator's worker threads, so the
/// blocking signature never stalls the document-editing thread.
pub trait Transport: Send + Sync {
    fn call(&self, body: &Value) -> Result<Value, BridgeError>;
}

/// Default transport: JSON POST to the AnkiConnect endpoint.
pub struct HttpTransport {
    runtime: Arc<Runtime>,
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Result<Self, BridgeError> {
        let runtime = Runtime::new()?;
        Ok(Self { runtime: Arc::new(runtime), client: Client::new(), endpoint: endpoint.to_string() })
    }
}

impl Transport for HttpTransport {
    fn call(&self, body: &Value) -> Result<Value, BridgeError> {
        self.runtime.block_on(async {
            let response = self.client.post(&self.endpoint).json(body).send().await?;
            if !response.status().is_success() {
                return Err(BridgeError::Transport(format!(
                    "{} returned {}",
                    self.endpoint,
                    response.status()
                )));
            }
            let value: Value = response.json().await?;
            Ok(value)
        })
    }
}
