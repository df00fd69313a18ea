pub mod avro;
pub mod dataset;
pub mod error;
pub mod mapper;
pub mod pipeline;
pub mod publisher;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use avro::{AvroEncoder, ACTIVITY_EVENT_SCHEMA};
pub use dataset::{DatasetFetcher, DatasetLoader, DatasetRow, KaggleFetcher};
pub use error::{IngestError, Result};
pub use mapper::map_row;
pub use pipeline::{run_ingest, IngestOptions};
pub use publisher::{DeliveryReport, EventSink, KafkaPublisher};
