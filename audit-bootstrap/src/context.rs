use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use audit_application::{AppState, Metrics};
use audit_domain::ports::{MaintenanceRepository, SettingsRepository, WatchlistRepository};
use audit_domain::services::{RateMonitor, TransferClassifier};
use audit_domain::{MonitoringConfig, TrackedItemSet};
use audit_infrastructure::{AppConfig, SqliteStore, StoreIdentityResolver, WebhookNotifier};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let store = SqliteStore::connect(&config.database_path).await?;
        for report in store.ensure_schema().await? {
            info!("migration: {} {}", report.object, report.status.as_str());
        }
        let store = Arc::new(store);

        // First run seeds the defaults so later mutations always have a
        // persisted row to update.
        let monitoring = match store.load_monitoring_config().await? {
            Some(existing) => existing,
            None => {
                let defaults = MonitoringConfig::default();
                store.save_monitoring_config(&defaults).await?;
                info!("seeded default monitoring config");
                defaults
            }
        };

        let watch_set = store.load_watch_set().await?;
        let tracked_items = store.list_tracked_items().await?;
        info!(
            "loaded {} watch subjects, {} tracked items",
            watch_set.len(),
            tracked_items.len()
        );

        let identity = Arc::new(StoreIdentityResolver::new(store.pool().clone()));
        let notifier = Arc::new(WebhookNotifier::new(runtime_config.clone()));

        let state = AppState {
            config: runtime_config,
            transfer_log: store.clone(),
            summaries: store.clone(),
            watchlists: store.clone(),
            settings: store.clone(),
            maintenance: store,
            notifier,
            identity,
            classifier: Arc::new(Mutex::new(TransferClassifier::default())),
            rate_monitor: Arc::new(RateMonitor::default()),
            monitoring: Arc::new(RwLock::new(monitoring)),
            watch_set: Arc::new(RwLock::new(Arc::new(watch_set))),
            tracked_items: Arc::new(RwLock::new(Arc::new(TrackedItemSet::from_items(
                &tracked_items,
            )))),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
