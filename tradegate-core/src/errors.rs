use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Session lookup failed: {0}")]
    SessionLookup(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        GateError::Serialization(err.to_string())
    }
}

pub type GateResult<T> = Result<T, GateError>;
