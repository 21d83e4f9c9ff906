//! `closet-sync sync`, `closet-sync health` and `closet-sync schedule`.

use chrono::Local;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use super::command::{SyncArgs, SyncMode};
use super::health;
use super::output::Output;
use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::application::sync::scheduler::{Job, Schedule, TICK};
use crate::application::sync::{MasterSync, SyncReport};
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_master_sync, open_warehouse};
use crate::infrastructure::config::settings::Settings;

fn master(settings: &Settings) -> Result<MasterSync<DbPool>> {
    let pool = open_warehouse(&settings.database)?;
    build_master_sync(settings, pool)
}

pub async fn execute(settings: &Settings, args: &SyncArgs, out: &Output) -> Result<bool> {
    let master = master(settings)?;
    let (title, report) = match args.mode {
        SyncMode::Full => ("Full Sync", master.full_sync().await),
        SyncMode::Quick => ("Quick Sync", master.quick_sync().await),
    };
    render_report(title, &report, out);
    Ok(report.is_success())
}

pub async fn health(settings: &Settings, out: &Output) -> Result<bool> {
    let report = master(settings)?.health_check().await;
    Ok(health::render(&report, out))
}

/// Run the standard schedule until Ctrl-C.
pub async fn schedule(settings: &Settings, out: &Output) -> Result<bool> {
    let master = master(settings)?;
    let schedule = Schedule::standard(Local::now().naive_local());

    out.section("Scheduler");
    for (label, job) in [
        ("Next full sync", Job::FullSync),
        ("Next quick sync", Job::QuickSync),
        ("Next health check", Job::HealthCheck),
    ] {
        if let Some(at) = schedule.next_run(job) {
            out.field(label, at.format("%Y-%m-%d %H:%M"));
        }
    }
    out.note("Press Ctrl-C to stop");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    master.run_schedule(schedule, TICK, shutdown_rx).await;
    out.success("Scheduler stopped");
    Ok(true)
}

fn render_report(title: &str, report: &SyncReport, out: &Output) {
    out.section(title);
    for source in &report.sources {
        let state = if source.succeeded { "synced" } else { "failed" };
        out.status(source.succeeded, &format!("{}: {state}", source.source));
    }
    match report.post_sync {
        Some(true) => out.success("Post-sync step finished"),
        Some(false) => out.error("Post-sync step failed"),
        None => out.warning("Post-sync step skipped because a source failed"),
    }
    out.data("sync", report);
    out.status(
        report.is_success(),
        if report.is_success() {
            "Synchronization completed successfully"
        } else {
            "Synchronization completed with errors"
        },
    );
}
