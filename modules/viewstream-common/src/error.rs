use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewstreamError>;

#[derive(Error, Debug)]
pub enum ViewstreamError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid value for {name}: {message}")]
    InvalidEnv { name: String, message: String },
}
