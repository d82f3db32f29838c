use std::collections::{HashMap, VecDeque};

use crate::entities::{MonitoringConfig, TransferEvent, WatchSet};

/// Outcome of classifying one transfer against the live windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classification {
    pub suspicious: bool,
    pub pattern: bool,
    /// Accumulated value for the (from, to, type) key inside the window,
    /// including the classified transfer.
    pub cumulative_value: i64,
    /// Transfer count for the (from, to) pair inside the window.
    pub pair_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct ValueRecord {
    time_ms: i64,
    value: i64,
}

/// Value records for one (from, to, type) key with a running total.
/// The total is adjusted on push and prune, so classifying one transfer
/// never re-sums the window while the classifier lock is held.
#[derive(Debug, Default)]
struct ValueWindow {
    records: VecDeque<ValueRecord>,
    total: i64,
}

impl ValueWindow {
    fn push(&mut self, record: ValueRecord) {
        self.total += record.value;
        self.records.push_back(record);
    }

    fn prune(&mut self, now_ms: i64, window_ms: i64) {
        while let Some(front) = self.records.front() {
            if now_ms - front.time_ms > window_ms {
                self.total -= front.value;
                self.records.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Windowed transfer classifier.
///
/// Keeps short-horizon state keyed by participant pair: value records per
/// (from, to, type) and timestamps per (from, to). Entries are pruned as
/// they age out of the configured window; classification is decided at the
/// moment a transfer arrives and earlier transfers are never revisited.
#[derive(Debug, Default)]
pub struct TransferClassifier {
    value_windows: HashMap<(String, String, String), ValueWindow>,
    pair_windows: HashMap<(String, String), VecDeque<i64>>,
}

impl TransferClassifier {
    pub fn classify(
        &mut self,
        event: &TransferEvent,
        config: &MonitoringConfig,
        watch: &WatchSet,
    ) -> Classification {
        let window_ms = config.window_millis();
        let now = event.occurred_at_ms;

        let value_key = (
            event.from_player.clone(),
            event.to_player.clone(),
            event.transfer_type.clone(),
        );
        let values = self.value_windows.entry(value_key).or_default();
        values.push(ValueRecord {
            time_ms: now,
            value: event.value,
        });
        values.prune(now, window_ms);
        let cumulative_value = values.total;

        let pair_key = (event.from_player.clone(), event.to_player.clone());
        let pair = self.pair_windows.entry(pair_key).or_default();
        pair.push_back(now);
        while let Some(front) = pair.front() {
            if now - *front > window_ms {
                pair.pop_front();
            } else {
                break;
            }
        }
        let pair_count = pair.len();

        // Blacklisted participants stay in the windows so history remains
        // complete, but they never produce flags.
        let suppressed = watch.covers_transfer(
            &event.from_player,
            &event.to_player,
            &event.from_account,
            &event.to_account,
        );

        let suspicious = config.suspicious_detection_enabled
            && !suppressed
            && cumulative_value > config.suspicious_value_threshold;
        let pattern = config.pattern_threshold > 0
            && !suppressed
            && pair_count >= config.pattern_threshold as usize;

        Classification {
            suspicious,
            pattern,
            cumulative_value,
            pair_count,
        }
    }

    /// Drop aged-out records and empty keys. Called periodically so idle
    /// pairs do not pin memory between transfers.
    pub fn cleanup(&mut self, now_ms: i64, window_ms: i64) {
        let mut empty_values = Vec::new();
        for (key, window) in self.value_windows.iter_mut() {
            window.prune(now_ms, window_ms);
            if window.records.is_empty() {
                empty_values.push(key.clone());
            }
        }
        for key in empty_values {
            self.value_windows.remove(&key);
        }

        let mut empty_pairs = Vec::new();
        for (key, window) in self.pair_windows.iter_mut() {
            while let Some(front) = window.front() {
                if now_ms - *front > window_ms {
                    window.pop_front();
                } else {
                    break;
                }
            }
            if window.is_empty() {
                empty_pairs.push(key.clone());
            }
        }
        for key in empty_pairs {
            self.pair_windows.remove(&key);
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.value_windows.len() + self.pair_windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::WatchSubject;

    const HOUR_MS: i64 = 3_600_000;

    fn config() -> MonitoringConfig {
        MonitoringConfig {
            suspicious_value_threshold: 100_000,
            time_window_hours: 24,
            pattern_threshold: 3,
            ..MonitoringConfig::default()
        }
    }

    fn event(from: &str, to: &str, value: i64, at_ms: i64) -> TransferEvent {
        TransferEvent {
            event_id: format!("evt-{at_ms}"),
            transfer_type: "currency".to_string(),
            from_player: from.to_string(),
            to_player: to.to_string(),
            from_account: format!("{from}_acc"),
            to_account: format!("{to}_acc"),
            item_name: None,
            quantity: value,
            value,
            occurred_at_ms: at_ms,
            from_account_created_ms: None,
            to_account_created_ms: None,
            from_character_created_ms: None,
            to_character_created_ms: None,
            from_ip: None,
            to_ip: None,
            details: None,
            suspicious: false,
        }
    }

    #[test]
    fn flags_the_transfer_that_crosses_the_threshold() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        let watch = WatchSet::default();

        let first = classifier.classify(&event("a", "b", 60_000, 0), &config, &watch);
        assert!(!first.suspicious);
        assert_eq!(first.cumulative_value, 60_000);

        let second = classifier.classify(&event("a", "b", 50_000, HOUR_MS), &config, &watch);
        assert!(second.suspicious);
        assert_eq!(second.cumulative_value, 110_000);
    }

    #[test]
    fn exact_threshold_is_not_suspicious() {
        let mut classifier = TransferClassifier::default();
        let outcome =
            classifier.classify(&event("a", "b", 100_000, 0), &config(), &WatchSet::default());
        assert!(!outcome.suspicious);
    }

    #[test]
    fn value_outside_window_is_forgotten() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        let watch = WatchSet::default();

        classifier.classify(&event("a", "b", 90_000, 0), &config, &watch);
        // 25h later the first transfer no longer counts.
        let later = classifier.classify(&event("a", "b", 90_000, 25 * HOUR_MS), &config, &watch);
        assert!(!later.suspicious);
        assert_eq!(later.cumulative_value, 90_000);
    }

    #[test]
    fn running_total_matches_window_contents_after_pruning() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        let watch = WatchSet::default();

        classifier.classify(&event("a", "b", 40_000, 0), &config, &watch);
        classifier.classify(&event("a", "b", 40_000, HOUR_MS), &config, &watch);
        let third = classifier.classify(&event("a", "b", 30_000, 2 * HOUR_MS), &config, &watch);
        assert!(third.suspicious);
        assert_eq!(third.cumulative_value, 110_000);

        // 26h in, the first two records have aged out; only the 2h record
        // may still count toward the total.
        let late = classifier.classify(&event("a", "b", 10_000, 26 * HOUR_MS), &config, &watch);
        assert!(!late.suspicious);
        assert_eq!(late.cumulative_value, 40_000);
    }

    #[test]
    fn pattern_fires_at_threshold_not_before() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        let watch = WatchSet::default();

        let one = classifier.classify(&event("a", "b", 10, 0), &config, &watch);
        let two = classifier.classify(&event("a", "b", 10, 1_000), &config, &watch);
        let three = classifier.classify(&event("a", "b", 10, 2_000), &config, &watch);
        assert!(!one.pattern);
        assert!(!two.pattern);
        assert!(three.pattern);
        assert_eq!(three.pair_count, 3);
    }

    #[test]
    fn pattern_counts_span_transfer_types() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        let watch = WatchSet::default();

        classifier.classify(&event("a", "b", 10, 0), &config, &watch);
        let mut item = event("a", "b", 10, 1_000);
        item.transfer_type = "item".to_string();
        classifier.classify(&item, &config, &watch);
        let third = classifier.classify(&event("a", "b", 10, 2_000), &config, &watch);
        assert!(third.pattern);
    }

    #[test]
    fn blacklisted_party_is_never_flagged() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        let watch = WatchSet::from_subjects([WatchSubject::player("a")]);

        let outcome = classifier.classify(&event("a", "b", 500_000, 0), &config, &watch);
        assert!(!outcome.suspicious);
        assert!(!outcome.pattern);
        // Window state is still recorded for the pair.
        assert_eq!(outcome.cumulative_value, 500_000);
    }

    #[test]
    fn disabled_detection_suppresses_suspicious_flag() {
        let mut classifier = TransferClassifier::default();
        let mut config = config();
        config.suspicious_detection_enabled = false;

        let outcome =
            classifier.classify(&event("a", "b", 500_000, 0), &config, &WatchSet::default());
        assert!(!outcome.suspicious);
    }

    #[test]
    fn cleanup_drops_idle_keys() {
        let mut classifier = TransferClassifier::default();
        let config = config();
        classifier.classify(&event("a", "b", 10, 0), &config, &WatchSet::default());
        assert!(classifier.tracked_keys() > 0);
        classifier.cleanup(48 * HOUR_MS, config.window_millis());
        assert_eq!(classifier.tracked_keys(), 0);
    }
}
