//! koddi-healthcheck library
//!
//! End-to-end health check for Koddi Ads advertiser integrations.
//!
//! A run issues up to seven HTTP calls against the console API and the
//! auction engine, classifies each response as PASS, WARN or FAIL, and
//! records checks whose prerequisites failed as SKIPPED instead of calling
//! their endpoints:
//! - Authentication (console login, yields the session token)
//! - Advertiser lookup, campaigns report, entity registration failures
//! - Active bidders and attributable entities caches
//! - A test auction against the client's auction engine
//!
//! # Example
//!
//! ```no_run
//! use koddi_healthcheck::engine::orchestrator::NoopObserver;
//! use koddi_healthcheck::{run_healthcheck, RunConfig};
//!
//! let config = RunConfig::new("ops@example.com", "secret", 42, 1001, "myretailer");
//! let report = run_healthcheck(&config, &mut NoopObserver).expect("HTTP client");
//! println!("Overall: {}", report.overall);
//! ```

pub mod checks;
pub mod cli;
pub mod config;
pub mod engine;
pub mod http;
pub mod version;

use checks::{CheckKind, ClassifiedError};
use engine::orchestrator::{Orchestrator, RunObserver};
use engine::result::HealthReport;
use http::client::{HttpConfig, HttpTransport};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

// Re-exports for public API
pub use engine::orchestrator::Orchestrator as HealthcheckOrchestrator;
pub use engine::result::{ResultSummary, Verdict};

/// Default console API base URL.
pub const DEFAULT_BASE_URL: &str = "https://koddi.io/console/v1";

/// Default site ID used for the test auction.
pub const DEFAULT_SITE_ID: &str = "homepage";

/// Default timeout applied to every request of a run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outcome status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Check passed
    Pass,
    /// Check passed but found something worth a look
    Warn,
    /// Check failed
    Fail,
    /// Check was not attempted because a prerequisite failed
    Skipped,
}

impl Status {
    /// Aggregation rank: Fail > Warn > Skipped > Pass.
    pub fn severity(self) -> u8 {
        match self {
            Status::Pass => 0,
            Status::Skipped => 1,
            Status::Warn => 2,
            Status::Fail => 3,
        }
    }

    /// Lowercase wire name, as used in the JSON report.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Warn => "warn",
            Status::Fail => "fail",
            Status::Skipped => "skipped",
        }
    }

    /// Uppercase label for human-facing reports.
    pub fn as_str_upper(self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
            Status::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str_upper())
    }
}

/// Why a check was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AuthenticationFailed,
    AdvertiserCheckFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AuthenticationFailed => write!(f, "authentication failed"),
            SkipReason::AdvertiserCheckFailed => write!(f, "advertiser check failed"),
        }
    }
}

/// Opaque session credential returned by the console login.
///
/// Replayed verbatim in the `Authorization` header. `Debug` never prints
/// the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        SessionToken(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<redacted>)")
    }
}

/// What a classifier derived from one successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub status: Status,
    pub details: String,
    /// Structured payload for library consumers (counts, HTTP status)
    pub extra: Option<serde_json::Value>,
    /// Token carried forward to later checks (authentication only)
    pub token: Option<SessionToken>,
}

impl CheckOutcome {
    pub fn pass(details: impl Into<String>) -> Self {
        CheckOutcome {
            status: Status::Pass,
            details: details.into(),
            extra: None,
            token: None,
        }
    }

    pub fn warn(details: impl Into<String>) -> Self {
        CheckOutcome {
            status: Status::Warn,
            details: details.into(),
            extra: None,
            token: None,
        }
    }

    pub fn with_extra(mut self, extra: serde_json::Value) -> Self {
        self.extra = Some(extra);
        self
    }

    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }
}

/// Result record for one check of one run.
///
/// Serializes to `{"check", "name", "status", "details"}`. `extra` and
/// `duration_ms` stay out of the report document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    #[serde(rename = "check")]
    pub number: u8,
    pub name: String,
    pub status: Status,
    pub details: String,
    #[serde(skip)]
    pub extra: Option<serde_json::Value>,
    #[serde(skip)]
    pub duration_ms: u64,
}

impl CheckResult {
    /// Build the record for an executed check that classified cleanly.
    pub fn from_outcome(kind: CheckKind, outcome: CheckOutcome, duration_ms: u64) -> Self {
        CheckResult {
            number: kind.number(),
            name: kind.name().to_string(),
            status: outcome.status,
            details: outcome.details,
            extra: outcome.extra,
            duration_ms,
        }
    }

    /// Build the FAIL record for an executed check.
    pub fn failed(kind: CheckKind, error: &ClassifiedError, duration_ms: u64) -> Self {
        CheckResult {
            number: kind.number(),
            name: kind.name().to_string(),
            status: Status::Fail,
            details: error.to_string(),
            extra: None,
            duration_ms,
        }
    }

    /// Build the record for a check that was not attempted.
    pub fn skipped(kind: CheckKind, reason: SkipReason) -> Self {
        CheckResult {
            number: kind.number(),
            name: kind.name().to_string(),
            status: Status::Skipped,
            details: format!("Skipped — {}", reason),
            extra: None,
            duration_ms: 0,
        }
    }

    /// First line of the details, for one-line summaries.
    pub fn headline(&self) -> &str {
        self.details.lines().next().unwrap_or("")
    }
}

/// Error types for koddi-healthcheck operations.
///
/// Individual checks never fail a run; these cover everything around it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealthcheckError {
    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    /// Configuration is missing or invalid
    #[error("configuration error: {message}")]
    Config { message: String },
    /// I/O error
    #[error("I/O error in {context}: {message}")]
    Io { context: String, message: String },
}

/// Inputs of one health-check run. Immutable for the duration of the run.
#[derive(Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub email: String,
    pub password: String,
    pub member_group_id: u64,
    pub advertiser_id: u64,
    /// Client name, also the auction engine subdomain
    pub client_name: String,
    pub site_id: String,
    pub experience_name: Option<String>,
    /// Console API base URL without trailing slash
    pub base_url: String,
    /// Timeout shared by every request of the run
    pub timeout: Duration,
}

impl RunConfig {
    /// Create a configuration with default site, base URL and timeout.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        member_group_id: u64,
        advertiser_id: u64,
        client_name: impl Into<String>,
    ) -> Self {
        RunConfig {
            email: email.into(),
            password: password.into(),
            member_group_id,
            advertiser_id,
            client_name: client_name.into(),
            site_id: DEFAULT_SITE_ID.to_string(),
            experience_name: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = site_id.into();
        self
    }

    /// Blank names are treated as absent.
    pub fn with_experience_name(mut self, experience_name: Option<String>) -> Self {
        self.experience_name = experience_name.filter(|name| !name.trim().is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("member_group_id", &self.member_group_id)
            .field("advertiser_id", &self.advertiser_id)
            .field("client_name", &self.client_name)
            .field("site_id", &self.site_id)
            .field("experience_name", &self.experience_name)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Strip trailing slashes from a base URL.
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Run the health check.
///
/// This is the main entry point. It opens one HTTP transport for the run,
/// walks the seven checks in order and returns the ordered report.
///
/// # Arguments
///
/// * `config` - Credentials, identifiers and transport settings
/// * `observer` - Receives progress callbacks as checks start and finish
///
/// # Returns
///
/// Returns a `HealthReport` with exactly seven results, or a
/// `HealthcheckError` if the HTTP client could not be built. Check
/// failures are reported inside the report, never as errors.
pub fn run_healthcheck(
    config: &RunConfig,
    observer: &mut dyn RunObserver,
) -> Result<HealthReport, HealthcheckError> {
    let transport = HttpTransport::new(&HttpConfig {
        timeout: config.timeout,
        ..HttpConfig::default()
    })?;

    let orchestrator = Orchestrator::new(config, &transport);
    Ok(orchestrator.run(observer))
}
