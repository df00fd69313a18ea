use serde::{Deserialize, Serialize};

/// Activity type stamped on every event. The source dataset only records views.
pub const VIEW_ACTIVITY: &str = "view";

/// One clickstream row mapped into the published event schema.
///
/// Field names serialize in upper snake case to match the Avro schema and
/// the streaming-query stream definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ActivityEvent {
    pub user_id: String,
    pub timestamp: String,
    pub activity_type: String,
    pub title_id: String,
    pub duration: Option<i32>,
    pub device_type: Option<String>,
    pub location: Option<String>,
    pub title: String,
    pub genres: String,
    pub release_date: String,
    pub movie_id: String,
}

impl ActivityEvent {
    /// Message key used for partitioning: events from one user stay ordered.
    pub fn key(&self) -> &str {
        &self.user_id
    }
}
