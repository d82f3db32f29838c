// Shared time helpers

use chrono::Utc;

pub const MAX_QUERY_DAYS: i64 = 3_650;
pub const MAX_RETENTION_DAYS: i64 = 36_500;
const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn current_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Clamp a day-count coming from the control plane before any date
/// arithmetic. Query windows allow 0 (today only).
pub fn clamp_query_days(days: i64) -> i64 {
    days.clamp(0, MAX_QUERY_DAYS)
}

/// Retention for cleanup keeps at least one day of history.
pub fn clamp_retention_days(days: i64) -> i64 {
    days.clamp(1, MAX_RETENTION_DAYS)
}

/// Millisecond timestamp marking the start of a day-count window ending now.
pub fn window_start_millis(now_ms: i64, days: i64) -> i64 {
    now_ms.saturating_sub(days.saturating_mul(MILLIS_PER_DAY))
}
