// Suspicious-transfer alert payload

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousAlert {
    pub from_player: String,
    pub to_player: String,
    pub transfer_type: String,
    pub quantity: i64,
    pub value: i64,
    /// Accumulated value for the pair inside the active window, including
    /// this transfer.
    pub cumulative_value: i64,
    pub threshold: i64,
    pub window_hours: u32,
    pub reason: String,
}
