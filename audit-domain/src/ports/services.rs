use async_trait::async_trait;

use crate::entities::SuspiciousAlert;

/// Outbound admin notifications. Delivery is fire-and-forget: failures are
/// logged by the implementation and never surface to the ingest path.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    fn spawn_notifications(&self, alerts: Vec<SuspiciousAlert>);
    async fn check_target(&self) -> anyhow::Result<()>;
}

/// Pure read dependency used to disambiguate name/reason splitting in
/// blacklist and ban commands.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn player_exists(&self, name: &str) -> anyhow::Result<bool>;
    async fn account_exists(&self, name: &str) -> anyhow::Result<bool>;
}
