// Helper functions for time handling and safe logging

use chrono::{DateTime, Utc};

/// One day in milliseconds
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Current time as milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// UTC calendar day (`YYYY-MM-DD`) for a millisecond timestamp
pub fn day_key(timestamp_ms: i64) -> String {
    let secs = timestamp_ms.div_euclid(1000);
    let nanos = (timestamp_ms.rem_euclid(1000) * 1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

/// Masks email addresses for safe logging
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first: String = parts[0].chars().take(1).collect();
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}
