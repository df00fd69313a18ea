use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatementError>;

#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for StatementError {
    fn from(err: reqwest::Error) -> Self {
        StatementError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for StatementError {
    fn from(err: serde_json::Error) -> Self {
        StatementError::Parse(err.to_string())
    }
}
