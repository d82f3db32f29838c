// Watch subject value object
//
// A blacklist or bank-ban target is either a player name or an account
// name, never both. The tagged variant makes the invalid both/neither
// states unrepresentable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum WatchSubject {
    Player(String),
    Account(String),
}

impl WatchSubject {
    pub fn player(name: impl AsRef<str>) -> Self {
        WatchSubject::Player(normalize(name.as_ref()))
    }

    pub fn account(name: impl AsRef<str>) -> Self {
        WatchSubject::Account(normalize(name.as_ref()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WatchSubject::Player(_) => "player",
            WatchSubject::Account(_) => "account",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WatchSubject::Player(name) | WatchSubject::Account(name) => name,
        }
    }

    pub fn from_kind(kind: &str, name: &str) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "player" => Some(WatchSubject::player(name)),
            "account" => Some(WatchSubject::account(name)),
            _ => None,
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}
