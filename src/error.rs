use thiserror::Error;

/// Unified error type for the blocklist engine and DNS request pipeline.
#[derive(Debug, Clone, Error)]
pub enum BlockerError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("upstream returned status {status}: {detail}")]
    ProtocolError { status: u16, detail: String },
    #[error("truncated: {0}")]
    Truncated(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for BlockerError {
    fn from(e: std::io::Error) -> Self {
        BlockerError::Io(e.to_string())
    }
}

impl From<crate::dns::ParseError> for BlockerError {
    fn from(e: crate::dns::ParseError) -> Self {
        BlockerError::Truncated(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlockerError>;
