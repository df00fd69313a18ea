use viewstream_common::{ActivityEvent, VIEW_ACTIVITY};

use crate::dataset::DatasetRow;

/// Map a dataset row into the event schema. Text fields are copied verbatim;
/// the dataset carries no device or location, so those stay null.
pub fn map_row(row: &DatasetRow) -> ActivityEvent {
    ActivityEvent {
        user_id: row.user_id.clone(),
        timestamp: row.datetime.clone(),
        activity_type: VIEW_ACTIVITY.to_string(),
        title_id: row.movie_id.clone(),
        duration: parse_duration(&row.duration),
        device_type: None,
        location: None,
        title: row.title.clone(),
        genres: row.genres.clone(),
        release_date: row.release_date.clone(),
        movie_id: row.movie_id.clone(),
    }
}

/// Durations are stored as floats (`"120.0"`); truncate toward zero.
/// Empty, non-finite and out-of-range values map to null.
fn parse_duration(raw: &str) -> Option<i32> {
    let value = raw.trim().parse::<f64>().ok()?.trunc();
    if !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&value) {
        return None;
    }
    Some(value as i32)
}
