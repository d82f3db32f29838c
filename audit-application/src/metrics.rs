use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    transfers_logged: AtomicU64,
    transfers_dropped: AtomicU64,
    suspicious_flagged: AtomicU64,
    patterns_detected: AtomicU64,
    persistence_errors: AtomicU64,
    notifications_spawned: AtomicU64,
}

impl Metrics {
    pub fn record_logged(&self) {
        self.transfers_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.transfers_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suspicious(&self) {
        self.suspicious_flagged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pattern(&self) {
        self.patterns_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persistence_error(&self) {
        self.persistence_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notifications(&self, count: usize) {
        self.notifications_spawned
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let logged = self.transfers_logged.load(Ordering::Relaxed);
        let dropped = self.transfers_dropped.load(Ordering::Relaxed);
        let suspicious = self.suspicious_flagged.load(Ordering::Relaxed);
        let patterns = self.patterns_detected.load(Ordering::Relaxed);
        let errors = self.persistence_errors.load(Ordering::Relaxed);
        let notifications = self.notifications_spawned.load(Ordering::Relaxed);

        format!(
            "# TYPE warden_transfers_logged_total counter\n\
warden_transfers_logged_total {}\n\
# TYPE warden_transfers_dropped_total counter\n\
warden_transfers_dropped_total {}\n\
# TYPE warden_suspicious_flagged_total counter\n\
warden_suspicious_flagged_total {}\n\
# TYPE warden_patterns_detected_total counter\n\
warden_patterns_detected_total {}\n\
# TYPE warden_persistence_errors_total counter\n\
warden_persistence_errors_total {}\n\
# TYPE warden_notifications_spawned_total counter\n\
warden_notifications_spawned_total {}\n",
            logged, dropped, suspicious, patterns, errors, notifications
        )
    }
}
