use chrono::Utc;

/// Milliseconds since the Unix epoch, as stored in the timestamp properties.
#[inline]
pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}
