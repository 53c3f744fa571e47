use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error: HTTP {status}")]
    Server { status: u16 },

    #[error("{message}")]
    Client { status: u16, message: String },

    #[error("{0}")]
    ExtractionParse(String),

    #[error("{0}")]
    Protocol(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// True for failure classes the transport is allowed to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Network(_) | PipelineError::Server { .. })
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
