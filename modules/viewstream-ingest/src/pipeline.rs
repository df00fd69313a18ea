use std::time::Duration;

use tracing::{info, warn};

use crate::dataset::DatasetRow;
use crate::mapper::map_row;
use crate::publisher::EventSink;

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Pause after every send so the broker isn't flooded.
    pub delay: Duration,
    /// Stop after this many rows.
    pub limit: Option<usize>,
}

/// Publish one event per row, in order. A failed row is logged and skipped;
/// the run always finishes with a flush. Returns the number of publish attempts.
pub async fn run_ingest(
    rows: &[DatasetRow],
    sink: &dyn EventSink,
    topic: &str,
    options: &IngestOptions,
) -> usize {
    let total = options.limit.map_or(rows.len(), |l| l.min(rows.len()));
    info!(records = total, topic, "Starting to stream records");

    let mut attempts = 0;
    for row in rows.iter().take(total) {
        let event = map_row(row);
        attempts += 1;

        match sink.publish(event.key(), &event).await {
            Ok(report) => info!(
                topic = %report.topic,
                partition = report.partition,
                offset = report.offset,
                "Message delivered"
            ),
            Err(e) => warn!(user_id = %event.user_id, error = %e, "Message delivery failed"),
        }

        if !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    if let Err(e) = sink.flush().await {
        warn!(error = %e, "Flush did not complete cleanly");
    }

    info!(attempts, "Finished streaming all records");
    attempts
}
