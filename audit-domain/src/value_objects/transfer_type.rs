// Transfer type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferType {
    Currency,
    Item,
    Trade,
    Other,
}

impl TransferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferType::Currency => "currency",
            TransferType::Item => "item",
            TransferType::Trade => "trade",
            TransferType::Other => "other",
        }
    }
}

impl From<&str> for TransferType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "currency" | "money" | "gold" => TransferType::Currency,
            "item" => TransferType::Item,
            "trade" => TransferType::Trade,
            _ => TransferType::Other,
        }
    }
}
