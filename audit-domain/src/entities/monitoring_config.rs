// Monitoring configuration singleton
//
// Mutable at runtime through the control plane, read as a snapshot on
// every ingest. Persisted by the settings repository so restarts keep the
// operator's thresholds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Cumulative value inside the window that marks a pair suspicious.
    pub suspicious_value_threshold: i64,
    /// Sliding window, in hours, for both value accumulation and pattern
    /// counting.
    pub time_window_hours: u32,
    /// Transfer count between one pair inside the window that counts as a
    /// repeated-transfer pattern.
    pub pattern_threshold: u32,
    pub logging_enabled: bool,
    pub suspicious_detection_enabled: bool,
    pub admin_notifications_enabled: bool,
    pub summaries_enabled: bool,
    pub item_tracking_enabled: bool,
    pub track_all_items: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            suspicious_value_threshold: 100_000,
            time_window_hours: 24,
            pattern_threshold: 5,
            logging_enabled: true,
            suspicious_detection_enabled: true,
            admin_notifications_enabled: true,
            summaries_enabled: true,
            item_tracking_enabled: false,
            track_all_items: true,
        }
    }
}

impl MonitoringConfig {
    pub fn window_millis(&self) -> i64 {
        i64::from(self.time_window_hours) * 3_600_000
    }
}
