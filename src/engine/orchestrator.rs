//! Check execution orchestrator.
//!
//! Walks the check catalog in fixed order, owns the session state of the
//! run, and decides for each check whether to execute or skip it.
//!
//! # Dependency rules
//!
//! - Authentication (1) and the test auction (7) always run
//! - Without a session token, checks 2-6 are skipped ("authentication failed")
//! - If the advertiser check (2) fails, checks 3-4 are skipped
//!   ("advertiser check failed"); 5-6 still run, they are member-group scoped
//!
//! # Graceful Degradation
//!
//! - Transport failures: converted to a FAIL result for that check
//! - Undecodable bodies: converted to a FAIL "Unexpected error" result
//! - Check panics: caught via std::panic::catch_unwind, converted to FAIL
//!
//! Every run yields exactly one result per check, in order. No function in
//! this module returns an error.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::checks::{CheckKind, ClassifiedError, Requirement};
use crate::engine::result::{HealthReport, ResultAggregator, RunContext};
use crate::http::client::Transport;
use crate::{CheckOutcome, CheckResult, RunConfig, SessionToken, SkipReason, Status};

/// Receives progress callbacks while a run is in flight
pub trait RunObserver {
    fn on_check_started(&mut self, _kind: CheckKind) {}
    fn on_check_finished(&mut self, _result: &CheckResult) {}
}

/// Observer that ignores every callback
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Mutable state of one run. Never outlives it.
#[derive(Debug)]
pub struct SessionState {
    token: Option<SessionToken>,
    advertiser_viable: bool,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            token: None,
            advertiser_viable: true,
        }
    }

    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Reason to skip `kind`, or `None` when it may run
    pub fn gate(&self, kind: CheckKind) -> Option<SkipReason> {
        match kind.requirement() {
            Requirement::None => None,
            Requirement::Session if !self.is_authenticated() => {
                Some(SkipReason::AuthenticationFailed)
            }
            Requirement::Session => None,
            Requirement::Advertiser if !self.is_authenticated() => {
                Some(SkipReason::AuthenticationFailed)
            }
            Requirement::Advertiser if !self.advertiser_viable => {
                Some(SkipReason::AdvertiserCheckFailed)
            }
            Requirement::Advertiser => None,
        }
    }

    /// Keep the token from a passing authentication outcome
    fn absorb(&mut self, kind: CheckKind, outcome: &mut CheckOutcome) {
        if kind == CheckKind::Authentication && outcome.status == Status::Pass {
            self.token = outcome.token.take();
        }
    }

    /// Update gating flags from a finished result
    fn record(&mut self, result: &CheckResult) {
        if result.number == CheckKind::AdvertiserExists.number() {
            self.advertiser_viable = result.status != Status::Fail;
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Check orchestrator for one run.
///
/// Borrows the configuration and the transport; both are scoped to the run.
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    transport: &'a dyn Transport,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a RunConfig, transport: &'a dyn Transport) -> Self {
        Orchestrator { config, transport }
    }

    /// Run every check in order, reporting progress to `observer`
    pub fn run(&self, observer: &mut dyn RunObserver) -> HealthReport {
        let start = Instant::now();
        let mut session = SessionState::new();
        let mut aggregator = ResultAggregator::new();

        info!(
            member_group_id = self.config.member_group_id,
            advertiser_id = self.config.advertiser_id,
            client = %self.config.client_name,
            "starting health check"
        );

        for kind in CheckKind::ALL {
            observer.on_check_started(kind);

            let result = match session.gate(kind) {
                Some(reason) => {
                    debug!(check = kind.number(), %reason, "skipping check");
                    CheckResult::skipped(kind, reason)
                }
                None => self.execute(kind, &mut session),
            };
            session.record(&result);

            match result.status {
                Status::Fail => warn!(check = result.number, details = %result.headline(), "check failed"),
                status => info!(check = result.number, %status, "check finished"),
            }

            observer.on_check_finished(&result);
            aggregator.add_result(result);
        }

        let mut context = RunContext::from_config(self.config);
        context.total_duration_ms = start.elapsed().as_millis() as u64;

        let report = aggregator.into_report(context);
        info!(overall = %report.overall, "health check complete");
        report
    }

    /// Run every check without progress callbacks
    pub fn run_silent(&self) -> HealthReport {
        self.run(&mut NoopObserver)
    }

    /// Execute a single check: one request, one classification
    fn execute(&self, kind: CheckKind, session: &mut SessionState) -> CheckResult {
        let start = Instant::now();
        let request = kind.request(self.config, session.token());
        debug!(check = kind.number(), method = %request.method, url = %request.url, "executing check");

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.transport
                .send(&request)
                .map_err(|e| kind.classify_transport_error(e))
                .and_then(|response| kind.classify(self.config, &response))
        }))
        .unwrap_or_else(|_| {
            Err(ClassifiedError::Unexpected(
                "check panicked during execution".to_string(),
            ))
        });

        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(mut outcome) => {
                session.absorb(kind, &mut outcome);
                CheckResult::from_outcome(kind, outcome, duration_ms)
            }
            Err(error) => CheckResult::failed(kind, &error, duration_ms),
        }
    }
}
