// Monitoring blacklist
//
// Subjects on the watch set stay fully visible in history; they are only
// excluded from suspicious classification and alerting.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::WatchSubject;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchSet {
    subjects: HashSet<WatchSubject>,
}

impl WatchSet {
    pub fn from_subjects(subjects: impl IntoIterator<Item = WatchSubject>) -> Self {
        Self {
            subjects: subjects.into_iter().collect(),
        }
    }

    pub fn contains(&self, subject: &WatchSubject) -> bool {
        self.subjects.contains(subject)
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// True when any participant of a transfer is blacklisted, by player
    /// name or by account name.
    pub fn covers_transfer(
        &self,
        from_player: &str,
        to_player: &str,
        from_account: &str,
        to_account: &str,
    ) -> bool {
        self.contains(&WatchSubject::player(from_player))
            || self.contains(&WatchSubject::player(to_player))
            || (!from_account.is_empty() && self.contains(&WatchSubject::account(from_account)))
            || (!to_account.is_empty() && self.contains(&WatchSubject::account(to_account)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_transfer_matches_either_side_and_kind() {
        let set = WatchSet::from_subjects([
            WatchSubject::player("miner_joe"),
            WatchSubject::account("guild_vault"),
        ]);
        assert!(set.covers_transfer("miner_joe", "bob", "a1", "a2"));
        assert!(set.covers_transfer("alice", "bob", "a1", "guild_vault"));
        assert!(!set.covers_transfer("alice", "bob", "a1", "a2"));
    }

    #[test]
    fn empty_account_never_matches() {
        let set = WatchSet::from_subjects([WatchSubject::account("")]);
        assert!(!set.covers_transfer("alice", "bob", "", ""));
    }
}
