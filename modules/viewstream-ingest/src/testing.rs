// In-memory EventSink for tests: records every publish attempt, can be told
// to reject specific keys, and remembers whether it was flushed.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use viewstream_common::ActivityEvent;

use crate::error::{IngestError, Result};
use crate::publisher::{DeliveryReport, EventSink};

pub struct MockSink {
    topic: String,
    attempts: Mutex<Vec<(String, ActivityEvent)>>,
    reject_keys: HashSet<String>,
    flushed: AtomicBool,
}

impl MockSink {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            attempts: Mutex::new(Vec::new()),
            reject_keys: HashSet::new(),
            flushed: AtomicBool::new(false),
        }
    }

    /// Fail every publish whose key is `key`.
    pub fn rejecting(mut self, key: &str) -> Self {
        self.reject_keys.insert(key.to_string());
        self
    }

    /// Every `(key, event)` passed to `publish`, including rejected ones.
    pub fn attempts(&self) -> Vec<(String, ActivityEvent)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn was_flushed(&self) -> bool {
        self.flushed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for MockSink {
    async fn publish(&self, key: &str, event: &ActivityEvent) -> Result<DeliveryReport> {
        let offset = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push((key.to_string(), event.clone()));
            attempts.len() as i64 - 1
        };

        if self.reject_keys.contains(key) {
            return Err(IngestError::Delivery(format!("rejected key {key}")));
        }

        Ok(DeliveryReport {
            topic: self.topic.clone(),
            partition: 0,
            offset,
        })
    }

    async fn flush(&self) -> Result<()> {
        self.flushed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
