//! Platform sync adapter port.

use std::time::Duration;

use async_trait::async_trait;

/// What a sync run should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncResource {
    /// Everything the adapter knows how to sync.
    Full,
    Locations,
    Customers,
    Catalog,
    /// Orders closed within the last `days_back` days.
    Orders { days_back: u32 },
    Posts,
}

/// An external system that feeds the warehouse.
///
/// Failures are logged by the adapter and reported as `false`; nothing is
/// retried.
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    /// Stable name used in logs and health reports.
    fn name(&self) -> &'static str;

    /// Pull `resource` from the remote system into the warehouse.
    async fn sync(&self, resource: SyncResource) -> bool;

    /// Whether the remote API answers within `timeout`.
    async fn ping(&self, timeout: Duration) -> bool;
}
