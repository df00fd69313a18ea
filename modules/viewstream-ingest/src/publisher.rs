use std::time::Duration;

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use viewstream_common::{ActivityEvent, IngestConfig};

use crate::avro::AvroEncoder;
use crate::error::{IngestError, Result};

/// How long a send may wait for room in the producer queue.
const QUEUE_TIMEOUT: Duration = Duration::from_secs(30);

/// How long `flush` waits for outstanding deliveries.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(60);

/// Where a delivered event landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// Destination for activity events. `publish` resolves once the broker has
/// acknowledged (or rejected) the event. No retries.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, key: &str, event: &ActivityEvent) -> Result<DeliveryReport>;

    /// Wait for every outstanding send to complete.
    async fn flush(&self) -> Result<()>;
}

/// Publishes Avro-encoded events to a Kafka topic.
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    encoder: AvroEncoder,
}

impl KafkaPublisher {
    pub fn new(config: &IngestConfig, encoder: AvroEncoder) -> Result<Self> {
        let producer: FutureProducer = client_config(config).create()?;
        tracing::info!(
            bootstrap_servers = %config.bootstrap_servers,
            topic = %config.topic,
            schema_id = encoder.schema_id(),
            "Kafka producer created"
        );

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            encoder,
        })
    }
}

/// librdkafka settings for the producer.
pub fn client_config(config: &IngestConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("security.protocol", &config.security_protocol)
        .set("client.id", "viewstream-producer");

    if let Some(creds) = &config.sasl_credentials {
        client_config
            .set("sasl.mechanisms", &config.sasl_mechanisms)
            .set("sasl.username", &creds.username)
            .set("sasl.password", &creds.password);
    }

    client_config
}

#[async_trait]
impl EventSink for KafkaPublisher {
    async fn publish(&self, key: &str, event: &ActivityEvent) -> Result<DeliveryReport> {
        let payload = self.encoder.encode(event)?;
        let record = FutureRecord::to(&self.topic).key(key).payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(QUEUE_TIMEOUT))
            .await
        {
            Ok((partition, offset)) => Ok(DeliveryReport {
                topic: self.topic.clone(),
                partition,
                offset,
            }),
            Err((err, _message)) => Err(IngestError::Delivery(err.to_string())),
        }
    }

    async fn flush(&self) -> Result<()> {
        // librdkafka's flush blocks the calling thread until the queue drains.
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(FLUSH_TIMEOUT)))
            .await
            .map_err(|e| IngestError::Producer(format!("flush task: {e}")))??;
        Ok(())
    }
}
