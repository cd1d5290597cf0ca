use thiserror::Error;

/// Top-level error type for the Ilmquest service.
///
/// Subsystem crates define their own error types and convert into this one
/// where they cross into configuration or server start-up code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IlmquestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for IlmquestError {
    fn from(err: toml::de::Error) -> Self {
        IlmquestError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for IlmquestError {
    fn from(err: toml::ser::Error) -> Self {
        IlmquestError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for IlmquestError {
    fn from(err: serde_json::Error) -> Self {
        IlmquestError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ilmquest operations.
pub type Result<T> = std::result::Result<T, IlmquestError>;
