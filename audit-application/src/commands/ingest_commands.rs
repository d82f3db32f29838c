use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use audit_domain::utils::current_millis;
use audit_domain::{
    IngestTransfer,
    SummaryDelta,
    SummaryKey,
    SuspiciousAlert,
    TransferEvent,
};

use crate::{AppError, AppState};

/// Result of classifying a single transfer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub logged: bool,
    pub suspicious: bool,
    pub pattern: bool,
}

/// Aggregate result for a batch posted by the game server.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub accepted: usize,
    pub logged: usize,
    pub dropped: usize,
    pub suspicious: usize,
    pub patterns: usize,
}

/// Ingest one completed transfer.
///
/// Classification and rate counters always run; persistence failures are
/// logged and counted but never surface here, since the simulation thread
/// must not stall on storage.
pub async fn process_transfer(
    state: &AppState,
    ingest: IngestTransfer,
) -> Result<ClassificationOutcome, AppError> {
    validate(&ingest)?;

    let monitoring = { state.monitoring.read().await.clone() };
    if !monitoring.logging_enabled {
        return Ok(ClassificationOutcome::default());
    }

    // Non-tracked items are dropped entirely, not logged.
    if monitoring.item_tracking_enabled && !monitoring.track_all_items {
        if let Some(item_name) = &ingest.item_name {
            let tracked = { state.tracked_items.read().await.clone() };
            if !tracked.contains(item_name) {
                state.metrics.record_dropped();
                return Ok(ClassificationOutcome::default());
            }
        }
    }

    let now = current_millis();
    let occurred_at = ingest.occurred_at_ms.unwrap_or(now);
    let watch = { state.watch_set.read().await.clone() };

    let mut event =
        TransferEvent::from_ingest(Uuid::new_v4().to_string(), ingest, occurred_at, false);
    let classification = {
        let mut classifier = state.classifier.lock().await;
        classifier.classify(&event, &monitoring, &watch)
    };
    event.suspicious = classification.suspicious;

    state.rate_monitor.record_transfer(now);
    if event.value >= monitoring.suspicious_value_threshold {
        state.rate_monitor.record_high_value(now);
    }
    if classification.suspicious {
        state.rate_monitor.record_suspicious(now);
    }

    if let Err(err) = state.transfer_log.insert_event(&event).await {
        warn!("failed to persist transfer event: {}", err);
        state.metrics.record_persistence_error();
    } else {
        state.metrics.record_logged();
    }

    if monitoring.summaries_enabled {
        let key = SummaryKey::new(&event.from_player, &event.to_player, &event.transfer_type);
        let delta = SummaryDelta {
            quantity: event.quantity,
            value: event.value,
            suspicious: classification.suspicious,
            occurred_at_ms: event.occurred_at_ms,
        };
        if let Err(err) = state.summaries.upsert(&key, &delta).await {
            warn!("failed to upsert transfer summary: {}", err);
            state.metrics.record_persistence_error();
        }
    }

    if classification.suspicious {
        state.metrics.record_suspicious();
        if monitoring.admin_notifications_enabled {
            let alert = SuspiciousAlert {
                from_player: event.from_player.clone(),
                to_player: event.to_player.clone(),
                transfer_type: event.transfer_type.clone(),
                quantity: event.quantity,
                value: event.value,
                cumulative_value: classification.cumulative_value,
                threshold: monitoring.suspicious_value_threshold,
                window_hours: monitoring.time_window_hours,
                reason: format!(
                    "cumulative value {} exceeded threshold {} within {}h",
                    classification.cumulative_value,
                    monitoring.suspicious_value_threshold,
                    monitoring.time_window_hours
                ),
            };
            state.notifier.spawn_notifications(vec![alert]);
            state.metrics.record_notifications(1);
        }
    }
    if classification.pattern {
        state.metrics.record_pattern();
    }

    Ok(ClassificationOutcome {
        logged: true,
        suspicious: classification.suspicious,
        pattern: classification.pattern,
    })
}

/// Ingest a batch. Malformed entries are dropped with a warning instead of
/// failing the whole batch, mirroring how the game server fires events.
pub async fn process_transfers(
    state: &AppState,
    transfers: Vec<IngestTransfer>,
) -> Result<IngestOutcome, AppError> {
    let mut outcome = IngestOutcome::default();
    for ingest in transfers {
        if let Err(err) = validate(&ingest) {
            warn!("dropped invalid transfer event: {}", err);
            state.metrics.record_dropped();
            outcome.dropped += 1;
            continue;
        }
        outcome.accepted += 1;
        let result = process_transfer(state, ingest).await?;
        if result.logged {
            outcome.logged += 1;
        } else {
            outcome.dropped += 1;
        }
        if result.suspicious {
            outcome.suspicious += 1;
        }
        if result.pattern {
            outcome.patterns += 1;
        }
    }

    // Sweep aged-out window state once per batch so idle pairs do not
    // accumulate between quiet periods.
    let window_ms = { state.monitoring.read().await.window_millis() };
    {
        let mut classifier = state.classifier.lock().await;
        classifier.cleanup(current_millis(), window_ms);
    }

    Ok(outcome)
}

fn validate(ingest: &IngestTransfer) -> Result<(), AppError> {
    if ingest.from_player.trim().is_empty() || ingest.to_player.trim().is_empty() {
        return Err(AppError::Validation(
            "from_player and to_player must not be empty".to_string(),
        ));
    }
    if ingest.quantity < 0 {
        return Err(AppError::Validation(format!(
            "quantity must be non-negative, got {}",
            ingest.quantity
        )));
    }
    if ingest.value.is_some_and(|value| value < 0) {
        return Err(AppError::Validation("value must be non-negative".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex as StdMutex};

    use async_trait::async_trait;
    use tokio::sync::{Mutex, RwLock};

    use audit_domain::ports::{
        IdentityResolver,
        MaintenanceRepository,
        NotificationSink,
        SettingsRepository,
        SummaryRepository,
        TransferLogRepository,
        WatchlistRepository,
    };
    use audit_domain::services::{RateMonitor, TransferClassifier};
    use audit_domain::{
        BankBanEntry,
        IpFunnelRow,
        IpRouteRow,
        MigrationReport,
        MigrationStatus,
        MonitoringConfig,
        RuntimeConfig,
        SummaryRepairReport,
        SuspiciousAlert,
        TopParticipantRow,
        TrackedItem,
        TrackedItemSet,
        TransferSummary,
        WatchSet,
        WatchSubject,
    };

    use super::*;
    use crate::Metrics;

    #[derive(Default)]
    struct RecordingLog {
        events: StdMutex<Vec<TransferEvent>>,
    }

    #[async_trait]
    impl TransferLogRepository for RecordingLog {
        async fn insert_event(&self, event: &TransferEvent) -> anyhow::Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn fetch_history(
            &self,
            _player: &str,
            _since_ms: i64,
        ) -> anyhow::Result<Vec<TransferEvent>> {
            Ok(Vec::new())
        }

        async fn fetch_suspicious(&self, _since_ms: i64) -> anyhow::Result<Vec<TransferEvent>> {
            Ok(Vec::new())
        }

        async fn top_participants(
            &self,
            _since_ms: i64,
            _limit: usize,
        ) -> anyhow::Result<Vec<TopParticipantRow>> {
            Ok(Vec::new())
        }

        async fn ip_routes(
            &self,
            _player: &str,
            _since_ms: i64,
        ) -> anyhow::Result<Vec<IpRouteRow>> {
            Ok(Vec::new())
        }

        async fn ip_funnels(
            &self,
            _player: &str,
            _since_ms: i64,
        ) -> anyhow::Result<Vec<IpFunnelRow>> {
            Ok(Vec::new())
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSummaries {
        deltas: StdMutex<Vec<(SummaryKey, SummaryDelta)>>,
    }

    #[async_trait]
    impl SummaryRepository for RecordingSummaries {
        async fn upsert(&self, key: &SummaryKey, delta: &SummaryDelta) -> anyhow::Result<()> {
            self.deltas.lock().unwrap().push((key.clone(), *delta));
            Ok(())
        }

        async fn fetch_for_player(
            &self,
            _player: &str,
            _since_ms: i64,
        ) -> anyhow::Result<Vec<TransferSummary>> {
            Ok(Vec::new())
        }
    }

    struct NullAdminStore;

    #[async_trait]
    impl WatchlistRepository for NullAdminStore {
        async fn add_watch(&self, _subject: &WatchSubject) -> anyhow::Result<bool> {
            Ok(true)
        }

        async fn remove_watch(&self, _subject: &WatchSubject) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn list_watches(&self) -> anyhow::Result<Vec<WatchSubject>> {
            Ok(Vec::new())
        }

        async fn load_watch_set(&self) -> anyhow::Result<WatchSet> {
            Ok(WatchSet::default())
        }

        async fn add_bank_ban(&self, _entry: &BankBanEntry) -> anyhow::Result<()> {
            Ok(())
        }

        async fn remove_bank_ban(&self, _subject: &WatchSubject) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn list_bank_bans(&self) -> anyhow::Result<Vec<BankBanEntry>> {
            Ok(Vec::new())
        }

        async fn find_bank_bans(
            &self,
            _subjects: &[WatchSubject],
        ) -> anyhow::Result<Vec<BankBanEntry>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl SettingsRepository for NullAdminStore {
        async fn load_monitoring_config(&self) -> anyhow::Result<Option<MonitoringConfig>> {
            Ok(None)
        }

        async fn save_monitoring_config(&self, _config: &MonitoringConfig) -> anyhow::Result<()> {
            Ok(())
        }

        async fn add_tracked_item(&self, _item: &TrackedItem) -> anyhow::Result<()> {
            Ok(())
        }

        async fn remove_tracked_item(&self, _item_name: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn list_tracked_items(&self) -> anyhow::Result<Vec<TrackedItem>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl MaintenanceRepository for NullAdminStore {
        async fn ensure_schema(&self) -> anyhow::Result<Vec<MigrationReport>> {
            Ok(Vec::new())
        }

        async fn repair_summaries(&self) -> anyhow::Result<SummaryRepairReport> {
            Ok(SummaryRepairReport {
                duplicate_groups: 0,
                rows_removed: 0,
                index_status: MigrationStatus::AlreadyExists,
            })
        }

        async fn purge_events(&self, _cutoff_ms: i64, _batch_size: u32) -> anyhow::Result<u64> {
            Ok(0)
        }
    }

    struct SilentSink;

    #[async_trait]
    impl NotificationSink for SilentSink {
        fn spawn_notifications(&self, _alerts: Vec<SuspiciousAlert>) {}

        async fn check_target(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl IdentityResolver for SilentSink {
        async fn player_exists(&self, _name: &str) -> anyhow::Result<bool> {
            Ok(false)
        }

        async fn account_exists(&self, _name: &str) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    fn test_state(
        monitoring: MonitoringConfig,
        tracked: TrackedItemSet,
    ) -> (AppState, Arc<RecordingLog>, Arc<RecordingSummaries>) {
        let log = Arc::new(RecordingLog::default());
        let summaries = Arc::new(RecordingSummaries::default());
        let state = AppState {
            config: RuntimeConfig::default(),
            transfer_log: log.clone(),
            summaries: summaries.clone(),
            watchlists: Arc::new(NullAdminStore),
            settings: Arc::new(NullAdminStore),
            maintenance: Arc::new(NullAdminStore),
            notifier: Arc::new(SilentSink),
            identity: Arc::new(SilentSink),
            classifier: Arc::new(Mutex::new(TransferClassifier::default())),
            rate_monitor: Arc::new(RateMonitor::default()),
            monitoring: Arc::new(RwLock::new(monitoring)),
            watch_set: Arc::new(RwLock::new(Arc::new(WatchSet::default()))),
            tracked_items: Arc::new(RwLock::new(Arc::new(tracked))),
            metrics: Arc::new(Metrics::default()),
        };
        (state, log, summaries)
    }

    fn ingest(quantity: i64) -> IngestTransfer {
        IngestTransfer {
            transfer_type: "currency".to_string(),
            from_player: "alice".to_string(),
            to_player: "bob".to_string(),
            from_account: String::new(),
            to_account: String::new(),
            item_name: None,
            quantity,
            value: None,
            occurred_at_ms: None,
            from_account_created_ms: None,
            to_account_created_ms: None,
            from_character_created_ms: None,
            to_character_created_ms: None,
            from_ip: None,
            to_ip: None,
            details: None,
        }
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = validate(&ingest(-1)).expect_err("negative quantity");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn empty_participant_is_rejected() {
        let mut event = ingest(1);
        event.to_player = "  ".to_string();
        assert!(validate(&event).is_err());
    }

    #[test]
    fn well_formed_event_passes_validation() {
        assert!(validate(&ingest(0)).is_ok());
    }

    #[tokio::test]
    async fn logging_disabled_skips_storage_entirely() {
        let monitoring = MonitoringConfig {
            logging_enabled: false,
            ..MonitoringConfig::default()
        };
        let (state, log, summaries) = test_state(monitoring, TrackedItemSet::default());

        let outcome = process_transfer(&state, ingest(500)).await.expect("ingest");
        assert!(!outcome.logged);
        assert!(log.events.lock().unwrap().is_empty());
        assert!(summaries.deltas.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn untracked_item_is_dropped_and_tracked_item_logged() {
        let monitoring = MonitoringConfig {
            item_tracking_enabled: true,
            track_all_items: false,
            ..MonitoringConfig::default()
        };
        let tracked = TrackedItemSet::from_items(&[TrackedItem {
            item_name: "Ancient Coin".to_string(),
            active: true,
        }]);
        let (state, log, _) = test_state(monitoring, tracked);

        let mut sword = ingest(1);
        sword.transfer_type = "item".to_string();
        sword.item_name = Some("Iron Sword".to_string());
        let dropped = process_transfer(&state, sword).await.expect("ingest");
        assert!(!dropped.logged);
        assert!(log.events.lock().unwrap().is_empty());
        assert!(state
            .metrics
            .render_prometheus()
            .contains("warden_transfers_dropped_total 1"));

        let mut coin = ingest(1);
        coin.transfer_type = "item".to_string();
        coin.item_name = Some("Ancient Coin".to_string());
        let logged = process_transfer(&state, coin).await.expect("ingest");
        assert!(logged.logged);
        let events = log.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].item_name.as_deref(), Some("Ancient Coin"));
    }

    #[tokio::test]
    async fn crossing_the_threshold_flags_event_and_summary() {
        let (state, log, summaries) =
            test_state(MonitoringConfig::default(), TrackedItemSet::default());

        let first = process_transfer(&state, ingest(60_000)).await.expect("first");
        assert!(!first.suspicious);
        let second = process_transfer(&state, ingest(50_000)).await.expect("second");
        assert!(second.suspicious);

        let events = log.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(!events[0].suspicious);
        assert!(events[1].suspicious);

        let deltas = summaries.deltas.lock().unwrap();
        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].0, deltas[1].0);
        assert!(!deltas[0].1.suspicious);
        assert!(deltas[1].1.suspicious);
        assert_eq!(deltas.iter().map(|(_, d)| d.value).sum::<i64>(), 110_000);
    }

    #[tokio::test]
    async fn batch_counts_logged_dropped_and_flagged_entries() {
        let (state, _, _) = test_state(MonitoringConfig::default(), TrackedItemSet::default());

        let outcome = process_transfers(
            &state,
            vec![ingest(60_000), ingest(-1), ingest(50_000)],
        )
        .await
        .expect("batch");
        assert_eq!(outcome.accepted, 2);
        assert_eq!(outcome.logged, 2);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.suspicious, 1);
    }
}
