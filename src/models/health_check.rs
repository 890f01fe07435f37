//! Periodic health check snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::HealthState;

/// Outcome of the five boolean sub-checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthChecks {
    pub connectivity: bool,
    pub performance: bool,
    pub error_rate: bool,
    pub dependencies: bool,
    pub resources: bool,
}

impl HealthChecks {
    pub fn passed(&self) -> u32 {
        [
            self.connectivity,
            self.performance,
            self.error_rate,
            self.dependencies,
            self.resources,
        ]
        .iter()
        .filter(|passed| **passed)
        .count() as u32
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == crate::constants::HEALTH_CHECK_COUNT
    }
}

/// Latest health snapshot for one automation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationHealthCheckResult {
    pub automation_id: String,
    pub timestamp: DateTime<Utc>,
    pub overall_health: HealthState,
    pub checks: HealthChecks,
    /// 0-100
    pub score: u8,
    pub recommendations: Vec<String>,
    pub next_check_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_counts_true_checks() {
        let checks = HealthChecks {
            connectivity: true,
            performance: false,
            error_rate: true,
            dependencies: true,
            resources: false,
        };
        assert_eq!(checks.passed(), 3);
        assert!(!checks.all_passed());
    }
}
