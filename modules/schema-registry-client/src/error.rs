use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchemaRegistryError>;

#[derive(Debug, Error)]
pub enum SchemaRegistryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SchemaRegistryError {
    fn from(err: reqwest::Error) -> Self {
        SchemaRegistryError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SchemaRegistryError {
    fn from(err: serde_json::Error) -> Self {
        SchemaRegistryError::Parse(err.to_string())
    }
}
