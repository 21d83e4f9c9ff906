//! Health reporting for the warehouse and the upstream APIs.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
    /// The dependency is not configured, so it was not checked.
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    name: &'static str,
    critical: bool,
    status: HealthStatus,
}

impl HealthCheck {
    #[must_use]
    pub fn new(name: &'static str, critical: bool, status: HealthStatus) -> Self {
        Self {
            name,
            critical,
            status,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    timestamp: DateTime<Utc>,
    checks: Vec<HealthCheck>,
    overall: bool,
}

impl HealthReport {
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, checks: Vec<HealthCheck>) -> Self {
        let overall = checks
            .iter()
            .filter(|check| check.critical())
            .all(HealthCheck::is_healthy);
        Self {
            timestamp,
            checks,
            overall,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.iter().find(|check| check.name == name)
    }

    /// Overall health considers critical checks only.
    pub fn is_healthy(&self) -> bool {
        self.overall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &'static str, critical: bool, healthy: bool) -> HealthCheck {
        let status = if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy("down".into())
        };
        HealthCheck::new(name, critical, status)
    }

    #[test]
    fn healthy_when_all_critical_checks_pass() {
        let report = HealthReport::new(
            Utc::now(),
            vec![check("database", true, true), check("instagram_api", false, false)],
        );
        assert!(report.is_healthy());
        assert!(!report.check("instagram_api").unwrap().is_healthy());
    }

    #[test]
    fn unhealthy_when_a_critical_check_fails() {
        let report = HealthReport::new(
            Utc::now(),
            vec![check("database", true, true), check("square_api", true, false)],
        );
        assert!(!report.is_healthy());
    }

    #[test]
    fn skipped_checks_are_not_healthy() {
        let skipped = HealthCheck::new("facebook_api", false, HealthStatus::Skipped);
        assert!(!skipped.is_healthy());
        let report = HealthReport::new(Utc::now(), vec![skipped]);
        assert!(report.is_healthy());
    }

    #[test]
    fn report_serializes_with_overall_flag() {
        let report = HealthReport::new(Utc::now(), vec![check("database", true, true)]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["overall"], true);
        assert_eq!(json["checks"][0]["name"], "database");
        assert_eq!(json["checks"][0]["status"]["state"], "healthy");
    }
}
