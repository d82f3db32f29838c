use tracing::info;

use audit_domain::ports::IdentityResolver;
use audit_domain::utils::{clamp_retention_days, current_millis};
use audit_domain::{BankBanEntry, WatchSubject, DEFAULT_BAN_REASON};

use crate::commands::watchlist_commands::parse_subject;
use crate::{AppError, AppState};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Ban a player or account from the banking feature.
///
/// `raw` holds the subject name followed by an optional free-text reason;
/// see [`split_name_and_reason`] for how the two are separated.
/// `duration_days` of zero or `None` means permanent.
pub async fn add_bank_ban(
    state: &AppState,
    kind: &str,
    raw: &str,
    issued_by: &str,
    duration_days: Option<i64>,
) -> Result<BankBanEntry, AppError> {
    if issued_by.trim().is_empty() {
        return Err(AppError::Validation(
            "issuing admin must not be empty".to_string(),
        ));
    }
    let (name, reason) = split_name_and_reason(state.identity.as_ref(), kind, raw).await?;
    let subject = parse_subject(kind, &name)?;
    let expires_ms = resolve_expiry(duration_days, current_millis())?;

    let entry = BankBanEntry {
        subject,
        reason: if reason.is_empty() {
            DEFAULT_BAN_REASON.to_string()
        } else {
            reason
        },
        issued_by: issued_by.trim().to_string(),
        created_ms: current_millis(),
        expires_ms,
        active: true,
    };
    state.watchlists.add_bank_ban(&entry).await?;
    info!(
        "bank ban added: {} '{}' by {} ({})",
        entry.subject.kind(),
        entry.subject.name(),
        entry.issued_by,
        entry
            .expires_ms
            .map(|ms| format!("until {}", ms))
            .unwrap_or_else(|| "permanent".to_string())
    );
    Ok(entry)
}

pub async fn remove_bank_ban(state: &AppState, kind: &str, name: &str) -> Result<bool, AppError> {
    let subject = parse_subject(kind, name)?;
    let removed = state.watchlists.remove_bank_ban(&subject).await?;
    if removed {
        info!("bank ban removed: {} '{}'", subject.kind(), subject.name());
    }
    Ok(removed)
}

/// Enforcement check used by the banking feature: is either identity of
/// this player currently banned? Expiry is evaluated here, at enforcement
/// time, on top of the stored active flag.
pub async fn is_bank_banned(
    state: &AppState,
    player: &str,
    account: &str,
) -> Result<bool, AppError> {
    let mut subjects = Vec::with_capacity(2);
    if !player.trim().is_empty() {
        subjects.push(WatchSubject::player(player));
    }
    if !account.trim().is_empty() {
        subjects.push(WatchSubject::account(account));
    }
    if subjects.is_empty() {
        return Err(AppError::Validation(
            "player or account name required".to_string(),
        ));
    }
    let entries = state.watchlists.find_bank_bans(&subjects).await?;
    let now = current_millis();
    Ok(entries.iter().any(|entry| entry.is_enforced(now)))
}

/// Split "name possibly with spaces, then a free-text reason" into its two
/// parts. Fallback chain: known-entity longest-prefix match, then a quoted
/// segment, then the first token. Quoting the name is the reliable way to
/// pass multi-word names.
pub async fn split_name_and_reason(
    identity: &dyn IdentityResolver,
    kind: &str,
    raw: &str,
) -> Result<(String, String), AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    // Known-entity match: prefer the longest word prefix that resolves to
    // an existing player/account.
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    for take in (1..=tokens.len()).rev() {
        let candidate = tokens[..take].join(" ");
        if resolves(identity, kind, &candidate).await? {
            let reason = tokens[take..].join(" ");
            return Ok((candidate, reason));
        }
    }

    // Quoted segment: "Multi Word Name" free text reason
    if let Some(rest) = trimmed.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            let name = rest[..end].trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation(
                    "quoted name must not be empty".to_string(),
                ));
            }
            let reason = rest[end + 1..].trim().to_string();
            return Ok((name, reason));
        }
    }

    // First-token heuristic.
    let name = tokens[0].to_string();
    let reason = tokens[1..].join(" ");
    Ok((name, reason))
}

/// Zero or `None` means permanent. Negative durations are rejected rather
/// than treated as permanent; positive ones are clamped to the retention
/// ceiling.
fn resolve_expiry(duration_days: Option<i64>, now_ms: i64) -> Result<Option<i64>, AppError> {
    match duration_days {
        None | Some(0) => Ok(None),
        Some(days) if days < 0 => Err(AppError::Validation(format!(
            "ban duration must be non-negative, got {}",
            days
        ))),
        Some(days) => Ok(Some(now_ms + clamp_retention_days(days) * MILLIS_PER_DAY)),
    }
}

async fn resolves(
    identity: &dyn IdentityResolver,
    kind: &str,
    candidate: &str,
) -> Result<bool, AppError> {
    let known = match kind.trim().to_lowercase().as_str() {
        "account" => identity.account_exists(candidate).await?,
        _ => identity.player_exists(candidate).await?,
    };
    Ok(known)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedRoster {
        players: Vec<&'static str>,
    }

    #[async_trait]
    impl IdentityResolver for FixedRoster {
        async fn player_exists(&self, name: &str) -> anyhow::Result<bool> {
            Ok(self.players.contains(&name))
        }

        async fn account_exists(&self, _name: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn known_entity_match_wins_over_first_token() {
        let roster = FixedRoster {
            players: vec!["iron mike"],
        };
        let (name, reason) =
            split_name_and_reason(&roster, "player", "iron mike repeated gold funneling")
                .await
                .expect("split");
        assert_eq!(name, "iron mike");
        assert_eq!(reason, "repeated gold funneling");
    }

    #[tokio::test]
    async fn quoted_segment_is_used_when_no_entity_matches() {
        let roster = FixedRoster { players: vec![] };
        let (name, reason) = split_name_and_reason(&roster, "player", r#""Dark Lord" dupe abuse"#)
            .await
            .expect("split");
        assert_eq!(name, "Dark Lord");
        assert_eq!(reason, "dupe abuse");
    }

    #[tokio::test]
    async fn falls_back_to_first_token() {
        let roster = FixedRoster { players: vec![] };
        let (name, reason) = split_name_and_reason(&roster, "player", "griefer99 selling exploits")
            .await
            .expect("split");
        assert_eq!(name, "griefer99");
        assert_eq!(reason, "selling exploits");
    }

    #[tokio::test]
    async fn lone_name_has_empty_reason() {
        let roster = FixedRoster { players: vec![] };
        let (name, reason) = split_name_and_reason(&roster, "player", "griefer99")
            .await
            .expect("split");
        assert_eq!(name, "griefer99");
        assert!(reason.is_empty());
    }

    #[test]
    fn zero_or_missing_duration_means_permanent() {
        assert_eq!(resolve_expiry(None, 0).expect("none"), None);
        assert_eq!(resolve_expiry(Some(0), 0).expect("zero"), None);
    }

    #[test]
    fn negative_duration_is_rejected_not_made_permanent() {
        let err = resolve_expiry(Some(-5), 0).expect_err("negative");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn oversized_duration_is_clamped_to_the_retention_ceiling() {
        let expires = resolve_expiry(Some(1_000_000), 0).expect("clamped");
        assert_eq!(expires, Some(36_500 * MILLIS_PER_DAY));
        let expires = resolve_expiry(Some(30), 1_000).expect("plain");
        assert_eq!(expires, Some(1_000 + 30 * MILLIS_PER_DAY));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let roster = FixedRoster { players: vec![] };
        let err = split_name_and_reason(&roster, "player", "   ")
            .await
            .expect_err("empty");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
