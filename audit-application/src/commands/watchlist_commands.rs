use std::sync::Arc;

use tracing::info;

use audit_domain::WatchSubject;

use crate::{AppError, AppState};

/// Add a player or account to the monitoring blacklist. Returns false when
/// the subject was already listed.
pub async fn add_watch(state: &AppState, kind: &str, name: &str) -> Result<bool, AppError> {
    let subject = parse_subject(kind, name)?;
    let added = state.watchlists.add_watch(&subject).await?;
    if added {
        info!("watchlist add: {} '{}'", subject.kind(), subject.name());
        refresh_watch_snapshot(state).await?;
    }
    Ok(added)
}

pub async fn remove_watch(state: &AppState, kind: &str, name: &str) -> Result<bool, AppError> {
    let subject = parse_subject(kind, name)?;
    let removed = state.watchlists.remove_watch(&subject).await?;
    if removed {
        info!("watchlist remove: {} '{}'", subject.kind(), subject.name());
        refresh_watch_snapshot(state).await?;
    }
    Ok(removed)
}

/// Reload the watch set from the store and swap the shared snapshot.
pub async fn refresh_watch_snapshot(state: &AppState) -> Result<(), AppError> {
    let set = state.watchlists.load_watch_set().await?;
    let mut snapshot = state.watch_set.write().await;
    *snapshot = Arc::new(set);
    Ok(())
}

pub(crate) fn parse_subject(kind: &str, name: &str) -> Result<WatchSubject, AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    WatchSubject::from_kind(kind, name).ok_or_else(|| {
        AppError::Validation(format!(
            "unknown subject kind '{}', expected 'player' or 'account'",
            kind
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_subject_requires_known_kind_and_name() {
        assert!(parse_subject("player", "alice").is_ok());
        assert!(parse_subject("account", "vault").is_ok());
        assert!(matches!(
            parse_subject("guild", "alice"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_subject("player", "   "),
            Err(AppError::Validation(_))
        ));
    }
}
