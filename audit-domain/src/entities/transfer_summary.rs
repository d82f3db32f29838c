// Transfer summary entity
// One mutable aggregate per (from, to, transfer_type)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SummaryKey {
    pub from_player: String,
    pub to_player: String,
    pub transfer_type: String,
}

impl SummaryKey {
    pub fn new(from_player: &str, to_player: &str, transfer_type: &str) -> Self {
        Self {
            from_player: from_player.to_string(),
            to_player: to_player.to_string(),
            transfer_type: transfer_type.to_string(),
        }
    }
}

/// One event's contribution to its summary row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SummaryDelta {
    pub quantity: i64,
    pub value: i64,
    pub suspicious: bool,
    pub occurred_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSummary {
    pub from_player: String,
    pub to_player: String,
    pub transfer_type: String,
    pub transfer_count: i64,
    pub total_quantity: i64,
    pub total_value: i64,
    pub suspicious_count: i64,
    /// Sticky: set the first time a transfer in this pair is flagged,
    /// never cleared by later updates.
    pub is_suspicious: bool,
    pub first_transfer_ms: i64,
    pub last_transfer_ms: i64,
    pub created_ms: i64,
    pub updated_ms: i64,
}
