use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Remote service rejected request ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Pulse not found: {0}")]
    PulseNotFound(String),

    #[error("This action requires authentication")]
    AuthRequired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl PulseError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
