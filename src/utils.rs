use chrono::{DateTime, Utc};

/// Calendar date of an instant, as understood by the affiliates API.
pub fn ymd_utc(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}
