//! Cross-platform synchronization: full and quick runs, health checks and
//! the polling scheduler.
//!
//! Square is the foundational source and always runs first. Social adapters
//! run concurrently afterwards; warehouse-wide derived data (customer
//! aggregates, analytics views) is only rebuilt after every source succeeded.

pub mod scheduler;

use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::entity::Platform;
use crate::domain::health::{HealthCheck, HealthReport, HealthStatus};
use crate::port::outbound::sync::{SyncAdapter, SyncResource};
use crate::port::outbound::warehouse::{in_transaction, Warehouse, WarehouseProvider};

/// Social platforms that get a (non-critical) health check.
const CHECKED_PLATFORMS: [(Platform, &str); 2] = [
    (Platform::Instagram, "instagram_api"),
    (Platform::Facebook, "facebook_api"),
];

/// Windows and limits used by [`MasterSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindows {
    pub days_back: u32,
    pub quick_days: u32,
    pub health_timeout: Duration,
}

/// Result of one adapter in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub source: &'static str,
    pub succeeded: bool,
}

/// How a full or quick sync ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub sources: Vec<SourceOutcome>,
    /// `None` when the post-sync step was skipped because a source failed.
    pub post_sync: Option<bool>,
}

impl SyncReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.sources.iter().all(|s| s.succeeded) && self.post_sync == Some(true)
    }
}

/// Coordinates the Square adapter and any configured social adapters.
pub struct MasterSync<P> {
    provider: P,
    square: Box<dyn SyncAdapter>,
    social: Vec<Box<dyn SyncAdapter>>,
    windows: SyncWindows,
}

impl<P> MasterSync<P>
where
    P: WarehouseProvider + Clone + 'static,
{
    pub fn new(
        provider: P,
        square: Box<dyn SyncAdapter>,
        social: Vec<Box<dyn SyncAdapter>>,
        windows: SyncWindows,
    ) -> Self {
        Self {
            provider,
            square,
            social,
            windows,
        }
    }

    /// Square first, then every social adapter concurrently; analytics are
    /// rebuilt only when all of them succeeded.
    pub async fn full_sync(&self) -> SyncReport {
        info!(started_at = %Utc::now(), "Starting full synchronization");

        let mut sources = vec![SourceOutcome {
            source: self.square.name(),
            succeeded: self.square.sync(SyncResource::Full).await,
        }];
        sources.extend(self.sync_social().await);

        let post_sync = if sources.iter().all(|s| s.succeeded) {
            info!("Generating cross-platform analytics");
            Some(self.derive("analytics", |w| w.materialize_analytics()).await)
        } else {
            warn!("Skipping cross-platform analytics due to sync errors");
            None
        };

        let report = SyncReport { sources, post_sync };
        log_report("full", &report);
        report
    }

    /// Recent orders plus social posts; customer aggregates are refreshed
    /// when both succeeded.
    pub async fn quick_sync(&self) -> SyncReport {
        info!(days_back = self.windows.quick_days, "Starting quick synchronization");

        let square = self
            .square
            .sync(SyncResource::Orders {
                days_back: self.windows.quick_days,
            })
            .await;
        let mut sources = vec![SourceOutcome {
            source: self.square.name(),
            succeeded: square,
        }];
        sources.extend(self.sync_social().await);

        let post_sync = if sources.iter().all(|s| s.succeeded) {
            Some(
                self.derive("customer_aggregates", |w| {
                    w.refresh_customer_aggregates().map(|_| ())
                })
                .await,
            )
        } else {
            warn!("Skipping customer aggregates due to sync errors");
            None
        };

        let report = SyncReport { sources, post_sync };
        log_report("quick", &report);
        report
    }

    async fn sync_social(&self) -> Vec<SourceOutcome> {
        if self.social.is_empty() {
            info!("No social media APIs configured");
            return Vec::new();
        }
        let results = join_all(
            self.social
                .iter()
                .map(|adapter| adapter.sync(SyncResource::Full)),
        )
        .await;
        self.social
            .iter()
            .zip(results)
            .map(|(adapter, succeeded)| SourceOutcome {
                source: adapter.name(),
                succeeded,
            })
            .collect()
    }

    async fn derive<F>(&self, step: &'static str, work: F) -> bool
    where
        F: FnOnce(&mut P::Session) -> crate::error::Result<()> + Send + 'static,
    {
        match in_transaction(&self.provider, work).await {
            Ok(()) => {
                info!(step, "Post-sync step finished");
                true
            }
            Err(err) => {
                error!(step, error = %err, "Post-sync step failed");
                false
            }
        }
    }

    /// Database and Square are critical; social APIs are checked only when
    /// configured. Every HTTP check is bounded by the health timeout.
    pub async fn health_check(&self) -> HealthReport {
        let timeout = self.windows.health_timeout;
        let mut checks = Vec::with_capacity(2 + CHECKED_PLATFORMS.len());

        let database = match tokio::time::timeout(
            timeout,
            in_transaction(&self.provider, |w| w.ping()),
        )
        .await
        {
            Ok(Ok(())) => HealthStatus::Healthy,
            Ok(Err(err)) => {
                error!(error = %err, "Database health check failed");
                HealthStatus::Unhealthy(err.to_string())
            }
            Err(_) => HealthStatus::Unhealthy("timed out".into()),
        };
        checks.push(HealthCheck::new("database", true, database));

        let square = if self.square.ping(timeout).await {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("Square API unreachable".into())
        };
        checks.push(HealthCheck::new("square_api", true, square));

        for (platform, check) in CHECKED_PLATFORMS {
            let adapter = self
                .social
                .iter()
                .find(|adapter| adapter.name() == platform.as_str());
            let status = match adapter {
                None => HealthStatus::Skipped,
                Some(adapter) => {
                    if adapter.ping(timeout).await {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unhealthy(format!("{platform} API unreachable"))
                    }
                }
            };
            checks.push(HealthCheck::new(check, false, status));
        }

        let report = HealthReport::new(Utc::now(), checks);
        info!(overall = report.is_healthy(), "Health check finished");
        report
    }
}

fn log_report(kind: &'static str, report: &SyncReport) {
    for source in &report.sources {
        info!(kind, source = source.source, succeeded = source.succeeded, "Source result");
    }
    if report.is_success() {
        info!(kind, "Synchronization completed successfully");
    } else {
        error!(kind, "Synchronization completed with errors");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryWarehouse;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Adapter with a fixed outcome that records what it was asked to do.
    struct FakeAdapter {
        name: &'static str,
        ok: bool,
        calls: Arc<Mutex<Vec<(&'static str, SyncResource)>>>,
    }

    #[async_trait]
    impl SyncAdapter for FakeAdapter {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn sync(&self, resource: SyncResource) -> bool {
            self.calls.lock().push((self.name, resource));
            self.ok
        }

        async fn ping(&self, _timeout: Duration) -> bool {
            self.ok
        }
    }

    type Calls = Arc<Mutex<Vec<(&'static str, SyncResource)>>>;

    fn fake(name: &'static str, ok: bool, calls: &Calls) -> Box<dyn SyncAdapter> {
        Box::new(FakeAdapter {
            name,
            ok,
            calls: Arc::clone(calls),
        })
    }

    fn windows() -> SyncWindows {
        SyncWindows {
            days_back: 30,
            quick_days: 7,
            health_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn full_sync_runs_square_first_then_analytics() {
        let calls = Calls::default();
        let warehouse = MemoryWarehouse::new();
        let master = MasterSync::new(
            warehouse.clone(),
            fake("square", true, &calls),
            vec![fake("instagram", true, &calls), fake("facebook", true, &calls)],
            windows(),
        );

        let report = master.full_sync().await;

        assert!(report.is_success());
        assert_eq!(calls.lock()[0], ("square", SyncResource::Full));
        assert_eq!(calls.lock().len(), 3);
        assert_eq!(warehouse.snapshot().analytics_runs, 1);
    }

    #[tokio::test]
    async fn social_failure_skips_analytics() {
        let calls = Calls::default();
        let warehouse = MemoryWarehouse::new();
        let master = MasterSync::new(
            warehouse.clone(),
            fake("square", true, &calls),
            vec![fake("instagram", false, &calls)],
            windows(),
        );

        let report = master.full_sync().await;

        assert!(!report.is_success());
        assert_eq!(report.post_sync, None);
        assert_eq!(warehouse.snapshot().analytics_runs, 0);
    }

    #[tokio::test]
    async fn no_social_adapters_still_succeeds() {
        let calls = Calls::default();
        let master = MasterSync::new(
            MemoryWarehouse::new(),
            fake("square", true, &calls),
            Vec::new(),
            windows(),
        );
        assert!(master.full_sync().await.is_success());
    }

    #[tokio::test]
    async fn quick_sync_uses_quick_window_and_refreshes_aggregates() {
        let calls = Calls::default();
        let warehouse = MemoryWarehouse::new();
        let master = MasterSync::new(
            warehouse.clone(),
            fake("square", true, &calls),
            vec![fake("facebook", true, &calls)],
            windows(),
        );

        let report = master.quick_sync().await;

        assert!(report.is_success());
        assert_eq!(
            calls.lock()[0],
            ("square", SyncResource::Orders { days_back: 7 })
        );
        assert_eq!(warehouse.snapshot().aggregate_refreshes, 1);
        assert_eq!(warehouse.snapshot().analytics_runs, 0);
    }

    #[tokio::test]
    async fn quick_sync_failure_leaves_aggregates_alone() {
        let calls = Calls::default();
        let warehouse = MemoryWarehouse::new();
        let master = MasterSync::new(
            warehouse.clone(),
            fake("square", false, &calls),
            Vec::new(),
            windows(),
        );

        assert!(!master.quick_sync().await.is_success());
        assert_eq!(warehouse.snapshot().aggregate_refreshes, 0);
    }

    #[tokio::test]
    async fn failed_analytics_fails_the_run() {
        let calls = Calls::default();
        let warehouse = MemoryWarehouse::new();
        warehouse.fail_writes_after(0);
        let master = MasterSync::new(
            warehouse.clone(),
            fake("square", true, &calls),
            Vec::new(),
            windows(),
        );

        let report = master.full_sync().await;
        assert_eq!(report.post_sync, Some(false));
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn health_depends_on_critical_checks_only() {
        let calls = Calls::default();
        let master = MasterSync::new(
            MemoryWarehouse::new(),
            fake("square", true, &calls),
            vec![fake("instagram", false, &calls)],
            windows(),
        );

        let report = master.health_check().await;

        assert!(report.is_healthy());
        assert!(report.check("database").unwrap().is_healthy());
        assert!(!report.check("instagram_api").unwrap().is_healthy());
        assert_eq!(
            report.check("facebook_api").unwrap().status(),
            &HealthStatus::Skipped
        );
    }

    #[tokio::test]
    async fn square_outage_is_unhealthy() {
        let calls = Calls::default();
        let master = MasterSync::new(
            MemoryWarehouse::new(),
            fake("square", false, &calls),
            Vec::new(),
            windows(),
        );
        assert!(!master.health_check().await.is_healthy());
    }
}
