use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Property {key} not set on entry, inherited, or configured as a default")]
    MissingProperty { key: String },

    #[error("No field schema configured for note type: {0}")]
    UnknownModel(String),

    #[error("Render batch misaligned: expected {expected} {unit}, got {got}")]
    RenderAlignment { expected: usize, got: usize, unit: &'static str },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("BridgeError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for BridgeError {
    fn from(error: std::io::Error) -> Self {
        BridgeError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(error: reqwest::Error) -> Self {
        BridgeError::Reqwest(Box::new(error))
    }
}
