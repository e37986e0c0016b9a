//! Result aggregation and reporting.
//!
//! Collects check results in execution order, derives the overall verdict
//! and summary counts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::{CheckResult, RunConfig, Status};

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// `Fail` iff any result failed. Warnings and skips do not fail a run.
    pub fn from_results(results: &[CheckResult]) -> Self {
        if results.iter().any(|r| r.status == Status::Fail) {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    }

    /// Process exit code for this verdict
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
        }
    }
}

/// Result summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSummary {
    pub passed: u32,
    pub warned: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total: u32,
    pub total_duration_ms: u64,
}

/// Presentation context of a run; not part of the JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub member_group_id: u64,
    pub advertiser_id: u64,
    pub client_name: String,
    pub generated_at: DateTime<Utc>,
    pub total_duration_ms: u64,
}

impl RunContext {
    pub fn from_config(config: &RunConfig) -> Self {
        RunContext {
            member_group_id: config.member_group_id,
            advertiser_id: config.advertiser_id,
            client_name: config.client_name.clone(),
            generated_at: Utc::now(),
            total_duration_ms: 0,
        }
    }
}

/// Ordered results of one run plus the overall verdict.
///
/// Serializes as `{"checks": [...], "overall": "pass" | "fail"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub checks: Vec<CheckResult>,
    pub overall: Verdict,
    #[serde(skip)]
    pub context: RunContext,
}

impl HealthReport {
    pub fn new(checks: Vec<CheckResult>, context: RunContext) -> Self {
        let overall = Verdict::from_results(&checks);
        HealthReport {
            checks,
            overall,
            context,
        }
    }

    /// Calculate summary statistics
    pub fn summary(&self) -> ResultSummary {
        let mut summary = ResultSummary::default();

        for check in &self.checks {
            summary.total += 1;
            summary.total_duration_ms += check.duration_ms;

            match check.status {
                Status::Pass => summary.passed += 1,
                Status::Warn => summary.warned += 1,
                Status::Fail => summary.failed += 1,
                Status::Skipped => summary.skipped += 1,
            }
        }

        summary
    }

    /// Most severe status in the run (`Pass` for an empty report)
    pub fn worst_status(&self) -> Status {
        self.checks
            .iter()
            .map(|c| c.status)
            .max_by_key(|s| s.severity())
            .unwrap_or(Status::Pass)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Result aggregator for collecting check results in order
#[derive(Debug, Default)]
pub struct ResultAggregator {
    checks: Vec<CheckResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        ResultAggregator { checks: Vec::new() }
    }

    /// Add a completed or skipped check result
    pub fn add_result(&mut self, result: CheckResult) {
        self.checks.push(result);
    }

    /// Create the final report
    pub fn into_report(self, context: RunContext) -> HealthReport {
        HealthReport::new(self.checks, context)
    }
}
