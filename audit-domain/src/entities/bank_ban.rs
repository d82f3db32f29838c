// Bank-ban entity
//
// Independent of the monitoring blacklist: a ban blocks the banking
// feature and carries reason/issuer/expiry metadata. Expiry is evaluated
// wherever enforcement happens; the stored active flag alone is never
// sufficient.

use serde::{Deserialize, Serialize};

use crate::value_objects::WatchSubject;

pub const DEFAULT_BAN_REASON: &str = "No reason provided";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankBanEntry {
    pub subject: WatchSubject,
    pub reason: String,
    pub issued_by: String,
    pub created_ms: i64,
    /// None means permanent.
    pub expires_ms: Option<i64>,
    pub active: bool,
}

impl BankBanEntry {
    pub fn is_enforced(&self, now_ms: i64) -> bool {
        if !self.active {
            return false;
        }
        match self.expires_ms {
            Some(expires) => now_ms < expires,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(expires_ms: Option<i64>, active: bool) -> BankBanEntry {
        BankBanEntry {
            subject: WatchSubject::player("dupe_lord"),
            reason: DEFAULT_BAN_REASON.to_string(),
            issued_by: "admin".to_string(),
            created_ms: 1_000,
            expires_ms,
            active,
        }
    }

    #[test]
    fn permanent_ban_stays_enforced() {
        assert!(entry(None, true).is_enforced(i64::MAX));
    }

    #[test]
    fn expiry_overrides_active_flag() {
        let expired = entry(Some(5_000), true);
        assert!(expired.is_enforced(4_999));
        assert!(!expired.is_enforced(5_000));
    }

    #[test]
    fn inactive_ban_never_enforced() {
        assert!(!entry(None, false).is_enforced(0));
    }
}
