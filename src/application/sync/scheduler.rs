//! Polling scheduler for unattended runs.
//!
//! Full sync daily at 02:00 local time, quick sync every four hours and a
//! health check every hour. The schedule is a plain value polled with the
//! current time, so timing rules are testable without a clock.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tracing::{info, warn};

use super::MasterSync;
use crate::port::outbound::warehouse::WarehouseProvider;

/// How often the schedule is polled.
pub const TICK: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    FullSync,
    QuickSync,
    HealthCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    DailyAt(NaiveTime),
    Every(ChronoDuration),
}

impl Cadence {
    /// First run strictly after `now`.
    fn next_after(self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::DailyAt(time) => {
                let today = now.date().and_time(time);
                if today > now {
                    today
                } else {
                    today + ChronoDuration::days(1)
                }
            }
            Self::Every(interval) => now + interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    job: Job,
    cadence: Cadence,
    next_run: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    entries: Vec<Entry>,
}

impl Schedule {
    /// Jobs with their cadences, first runs computed from `now`.
    #[must_use]
    pub fn new(jobs: &[(Job, Cadence)], now: NaiveDateTime) -> Self {
        let entries = jobs
            .iter()
            .map(|&(job, cadence)| Entry {
                job,
                cadence,
                next_run: cadence.next_after(now),
            })
            .collect();
        Self { entries }
    }

    /// Daily full sync at 02:00, quick sync every 4 hours, hourly health.
    #[must_use]
    pub fn standard(now: NaiveDateTime) -> Self {
        let two_am = NaiveTime::from_hms_opt(2, 0, 0).unwrap_or_default();
        Self::new(
            &[
                (Job::FullSync, Cadence::DailyAt(two_am)),
                (Job::QuickSync, Cadence::Every(ChronoDuration::hours(4))),
                (Job::HealthCheck, Cadence::Every(ChronoDuration::hours(1))),
            ],
            now,
        )
    }

    /// Jobs due at `now`, in schedule order; each is rescheduled from `now`.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<Job> {
        self.entries
            .iter_mut()
            .filter(|entry| entry.next_run <= now)
            .map(|entry| {
                entry.next_run = entry.cadence.next_after(now);
                entry.job
            })
            .collect()
    }

    #[must_use]
    pub fn next_run(&self, job: Job) -> Option<NaiveDateTime> {
        self.entries
            .iter()
            .find(|entry| entry.job == job)
            .map(|entry| entry.next_run)
    }
}

impl<P> MasterSync<P>
where
    P: WarehouseProvider + Clone + 'static,
{
    pub async fn run_job(&self, job: Job) {
        match job {
            Job::FullSync => {
                self.full_sync().await;
            }
            Job::QuickSync => {
                self.quick_sync().await;
            }
            Job::HealthCheck => {
                let report = self.health_check().await;
                if !report.is_healthy() {
                    warn!("Scheduled health check found problems");
                }
            }
        }
    }

    /// Poll `schedule` every `tick` until `shutdown` turns true.
    pub async fn run_schedule(
        &self,
        mut schedule: Schedule,
        tick: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            next_full = ?schedule.next_run(Job::FullSync),
            next_quick = ?schedule.next_run(Job::QuickSync),
            "Scheduler started"
        );
        let mut interval = tokio::time::interval(tick);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Scheduler stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    let now = chrono::Local::now().naive_local();
                    for job in schedule.due(now) {
                        info!(?job, "Running scheduled job");
                        self.run_job(job).await;
                    }
                }
            }
        }
    }
}
