// Tracked item entity

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedItem {
    pub item_name: String,
    pub active: bool,
}

/// Snapshot of active tracked-item names, consulted on every ingest when
/// track-all mode is off.
#[derive(Debug, Clone, Default)]
pub struct TrackedItemSet {
    names: HashSet<String>,
}

impl TrackedItemSet {
    pub fn from_items(items: &[TrackedItem]) -> Self {
        Self {
            names: items
                .iter()
                .filter(|item| item.active)
                .map(|item| item.item_name.trim().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, item_name: &str) -> bool {
        self.names.contains(&item_name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_items_are_excluded_from_snapshot() {
        let set = TrackedItemSet::from_items(&[
            TrackedItem {
                item_name: "Ancient Coin".to_string(),
                active: true,
            },
            TrackedItem {
                item_name: "Iron Sword".to_string(),
                active: false,
            },
        ]);
        assert!(set.contains("ancient coin"));
        assert!(set.contains(" Ancient Coin "));
        assert!(!set.contains("iron sword"));
    }
}
