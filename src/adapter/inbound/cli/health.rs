//! `closet-sync health`.

use super::output::Output;
use crate::domain::health::{HealthReport, HealthStatus};

/// Render a health report; returns whether every critical check passed.
pub fn render(report: &HealthReport, out: &Output) -> bool {
    out.section("Health Check");
    for check in report.checks() {
        let suffix = if check.critical() { " (critical)" } else { "" };
        let label = format!("{}{suffix}", check.name());
        match check.status() {
            HealthStatus::Healthy => out.field(&label, "healthy"),
            HealthStatus::Skipped => out.field(&label, "not configured"),
            HealthStatus::Unhealthy(reason) => out.field(&label, format!("unhealthy: {reason}")),
        }
    }
    out.data("health", report);
    out.status(
        report.is_healthy(),
        if report.is_healthy() {
            "Health check passed"
        } else {
            "Health check failed"
        },
    );
    report.is_healthy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::health::HealthCheck;
    use chrono::Utc;

    #[test]
    fn optional_failures_do_not_fail_the_command() {
        let report = HealthReport::new(
            Utc::now(),
            vec![
                HealthCheck::new("database", true, HealthStatus::Healthy),
                HealthCheck::new("square_api", true, HealthStatus::Healthy),
                HealthCheck::new("instagram_api", false, HealthStatus::Unhealthy("401".into())),
                HealthCheck::new("facebook_api", false, HealthStatus::Skipped),
            ],
        );
        assert!(render(&report, &Output::new(false, true)));
    }

    #[test]
    fn critical_failure_fails_the_command() {
        let report = HealthReport::new(
            Utc::now(),
            vec![HealthCheck::new("database", true, HealthStatus::Unhealthy("locked".into()))],
        );
        assert!(!render(&report, &Output::new(false, true)));
    }
}
