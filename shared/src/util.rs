/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Timestamp `minutes` from now, in milliseconds
///
/// Used as the expiry of verification and password-reset links.
pub fn expiry_millis(minutes: i64) -> i64 {
    (chrono::Utc::now() + chrono::Duration::minutes(minutes)).timestamp_millis()
}

/// Whether a millisecond expiry timestamp lies in the past
pub fn is_expired(expiry_ms: i64) -> bool {
    now_millis() > expiry_ms
}
