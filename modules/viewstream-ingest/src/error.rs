use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Dataset is missing required column: {0}")]
    MissingColumn(String),

    #[error("Download failed (status {status}): {message}")]
    Download { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Producer error: {0}")]
    Producer(String),
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Dataset(err.to_string())
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Dataset(err.to_string())
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        IngestError::Dataset(format!("network: {err}"))
    }
}

impl From<zip::result::ZipError> for IngestError {
    fn from(err: zip::result::ZipError) -> Self {
        IngestError::Dataset(format!("archive: {err}"))
    }
}

impl From<apache_avro::Error> for IngestError {
    fn from(err: apache_avro::Error) -> Self {
        IngestError::Serialize(err.to_string())
    }
}

impl From<rdkafka::error::KafkaError> for IngestError {
    fn from(err: rdkafka::error::KafkaError) -> Self {
        IngestError::Producer(err.to_string())
    }
}
