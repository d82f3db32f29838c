// Transfer event entity
// One immutable row per completed player-to-player transfer

use serde::{Deserialize, Serialize};

use crate::value_objects::TransferType;

/// Incoming transfer as reported by the game server. Optional context
/// (IPs, creation dates) degrades to unknown, it never fails an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestTransfer {
    pub transfer_type: String,
    pub from_player: String,
    pub to_player: String,
    #[serde(default)]
    pub from_account: String,
    #[serde(default)]
    pub to_account: String,
    #[serde(default)]
    pub item_name: Option<String>,
    pub quantity: i64,
    /// Appraised value; defaults to the quantity for currency transfers.
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub occurred_at_ms: Option<i64>,
    #[serde(default)]
    pub from_account_created_ms: Option<i64>,
    #[serde(default)]
    pub to_account_created_ms: Option<i64>,
    #[serde(default)]
    pub from_character_created_ms: Option<i64>,
    #[serde(default)]
    pub to_character_created_ms: Option<i64>,
    #[serde(default)]
    pub from_ip: Option<String>,
    #[serde(default)]
    pub to_ip: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl IngestTransfer {
    pub fn effective_value(&self) -> i64 {
        self.value.unwrap_or(self.quantity)
    }

    pub fn transfer_type(&self) -> TransferType {
        TransferType::from(self.transfer_type.as_str())
    }
}

/// Batch envelope posted by the game server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestEnvelope {
    pub schema_version: String,
    pub events: Vec<IngestTransfer>,
}

/// Persisted transfer record. Created once at ingest, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferEvent {
    pub event_id: String,
    pub transfer_type: String,
    pub from_player: String,
    pub to_player: String,
    pub from_account: String,
    pub to_account: String,
    pub item_name: Option<String>,
    pub quantity: i64,
    pub value: i64,
    pub occurred_at_ms: i64,
    pub from_account_created_ms: Option<i64>,
    pub to_account_created_ms: Option<i64>,
    pub from_character_created_ms: Option<i64>,
    pub to_character_created_ms: Option<i64>,
    pub from_ip: Option<String>,
    pub to_ip: Option<String>,
    pub details: Option<String>,
    pub suspicious: bool,
}

impl TransferEvent {
    pub fn from_ingest(
        event_id: String,
        ingest: IngestTransfer,
        occurred_at_ms: i64,
        suspicious: bool,
    ) -> Self {
        let value = ingest.effective_value();
        let transfer_type = ingest.transfer_type().as_str().to_string();
        Self {
            event_id,
            transfer_type,
            from_player: ingest.from_player.trim().to_lowercase(),
            to_player: ingest.to_player.trim().to_lowercase(),
            from_account: ingest.from_account.trim().to_lowercase(),
            to_account: ingest.to_account.trim().to_lowercase(),
            item_name: ingest.item_name,
            quantity: ingest.quantity,
            value,
            occurred_at_ms,
            from_account_created_ms: ingest.from_account_created_ms,
            to_account_created_ms: ingest.to_account_created_ms,
            from_character_created_ms: ingest.from_character_created_ms,
            to_character_created_ms: ingest.to_character_created_ms,
            from_ip: ingest.from_ip,
            to_ip: ingest.to_ip,
            details: ingest.details,
            suspicious,
        }
    }

    pub fn involves(&self, player: &str) -> bool {
        self.from_player == player || self.to_player == player
    }

    pub fn crosses_ip(&self) -> bool {
        match (&self.from_ip, &self.to_ip) {
            (Some(from), Some(to)) => from != to,
            _ => false,
        }
    }
}
