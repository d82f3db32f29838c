use std::sync::Arc;

use tracing::info;

use audit_domain::{MonitoringConfig, TrackedItem, TrackedItemSet};

use crate::{AppError, AppState};

/// Apply one validated setting mutation. The new value is persisted before
/// the in-memory snapshot is swapped, so a failed write leaves no partial
/// state and subsequent ingests keep the previous configuration.
pub async fn update_setting(
    state: &AppState,
    key: &str,
    raw_value: &str,
) -> Result<MonitoringConfig, AppError> {
    let mut config = { state.monitoring.read().await.clone() };
    apply_setting(&mut config, key, raw_value)?;

    state.settings.save_monitoring_config(&config).await?;
    {
        let mut live = state.monitoring.write().await;
        *live = config.clone();
    }
    info!("monitoring setting updated: {} = {}", key, raw_value);
    Ok(config)
}

pub async fn replace_monitoring_config(
    state: &AppState,
    config: MonitoringConfig,
) -> Result<MonitoringConfig, AppError> {
    validate_config(&config)?;
    state.settings.save_monitoring_config(&config).await?;
    {
        let mut live = state.monitoring.write().await;
        *live = config.clone();
    }
    Ok(config)
}

pub async fn add_tracked_item(state: &AppState, item_name: &str) -> Result<(), AppError> {
    let name = item_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "item name must not be empty".to_string(),
        ));
    }
    let item = TrackedItem {
        item_name: name.to_string(),
        active: true,
    };
    state.settings.add_tracked_item(&item).await?;
    refresh_tracked_snapshot(state).await?;
    info!("tracked item added: {}", name);
    Ok(())
}

pub async fn remove_tracked_item(state: &AppState, item_name: &str) -> Result<bool, AppError> {
    let name = item_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "item name must not be empty".to_string(),
        ));
    }
    let removed = state.settings.remove_tracked_item(name).await?;
    if removed {
        refresh_tracked_snapshot(state).await?;
        info!("tracked item removed: {}", name);
    }
    Ok(removed)
}

pub async fn refresh_tracked_snapshot(state: &AppState) -> Result<(), AppError> {
    let items = state.settings.list_tracked_items().await?;
    let mut snapshot = state.tracked_items.write().await;
    *snapshot = Arc::new(TrackedItemSet::from_items(&items));
    Ok(())
}

fn apply_setting(config: &mut MonitoringConfig, key: &str, raw: &str) -> Result<(), AppError> {
    match key.trim().to_lowercase().as_str() {
        "suspicious_value_threshold" => {
            let value = parse_number(key, raw)?;
            if value <= 0 {
                return Err(AppError::Validation(
                    "suspicious_value_threshold must be positive".to_string(),
                ));
            }
            config.suspicious_value_threshold = value;
        }
        "time_window_hours" => {
            let value = parse_number(key, raw)?;
            if !(1..=8_760).contains(&value) {
                return Err(AppError::Validation(
                    "time_window_hours must be in 1..=8760".to_string(),
                ));
            }
            config.time_window_hours = value as u32;
        }
        "pattern_threshold" => {
            let value = parse_number(key, raw)?;
            if !(0..=100_000).contains(&value) {
                return Err(AppError::Validation(
                    "pattern_threshold must be in 0..=100000".to_string(),
                ));
            }
            config.pattern_threshold = value as u32;
        }
        "logging_enabled" => config.logging_enabled = parse_bool(key, raw)?,
        "suspicious_detection_enabled" => {
            config.suspicious_detection_enabled = parse_bool(key, raw)?
        }
        "admin_notifications_enabled" => {
            config.admin_notifications_enabled = parse_bool(key, raw)?
        }
        "summaries_enabled" => config.summaries_enabled = parse_bool(key, raw)?,
        "item_tracking_enabled" => config.item_tracking_enabled = parse_bool(key, raw)?,
        "track_all_items" => config.track_all_items = parse_bool(key, raw)?,
        other => {
            return Err(AppError::Validation(format!(
                "unknown monitoring setting '{}'",
                other
            )))
        }
    }
    Ok(())
}

fn validate_config(config: &MonitoringConfig) -> Result<(), AppError> {
    if config.suspicious_value_threshold <= 0 {
        return Err(AppError::Validation(
            "suspicious_value_threshold must be positive".to_string(),
        ));
    }
    if !(1..=8_760).contains(&config.time_window_hours) {
        return Err(AppError::Validation(
            "time_window_hours must be in 1..=8760".to_string(),
        ));
    }
    Ok(())
}

fn parse_number(key: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("{} expects a number, got '{}'", key, raw)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => Err(AppError::Validation(format!(
            "{} expects on/off/true/false, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_all_normal_forms() {
        assert!(parse_bool("k", "on").unwrap());
        assert!(parse_bool("k", "TRUE").unwrap());
        assert!(!parse_bool("k", "Off").unwrap());
        assert!(!parse_bool("k", "false").unwrap());
        assert!(parse_bool("k", "yes").is_err());
    }

    #[test]
    fn threshold_must_be_a_positive_number() {
        let mut config = MonitoringConfig::default();
        assert!(apply_setting(&mut config, "suspicious_value_threshold", "abc").is_err());
        assert!(apply_setting(&mut config, "suspicious_value_threshold", "-5").is_err());
        apply_setting(&mut config, "suspicious_value_threshold", "250000").unwrap();
        assert_eq!(config.suspicious_value_threshold, 250_000);
    }

    #[test]
    fn unknown_key_is_rejected_without_changes() {
        let mut config = MonitoringConfig::default();
        let before = config.clone();
        assert!(apply_setting(&mut config, "no_such_setting", "1").is_err());
        assert_eq!(
            before.suspicious_value_threshold,
            config.suspicious_value_threshold
        );
    }

    #[test]
    fn window_hours_bounds_are_enforced() {
        let mut config = MonitoringConfig::default();
        assert!(apply_setting(&mut config, "time_window_hours", "0").is_err());
        assert!(apply_setting(&mut config, "time_window_hours", "9999").is_err());
        apply_setting(&mut config, "time_window_hours", "48").unwrap();
        assert_eq!(config.time_window_hours, 48);
    }

    #[test]
    fn toggles_apply_case_insensitively() {
        let mut config = MonitoringConfig::default();
        apply_setting(&mut config, "TRACK_ALL_ITEMS", "OFF").unwrap();
        assert!(!config.track_all_items);
        apply_setting(&mut config, "item_tracking_enabled", "on").unwrap();
        assert!(config.item_tracking_enabled);
    }
}
