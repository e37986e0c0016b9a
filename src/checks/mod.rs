//! Check catalog and response classification.
//!
//! The seven checks, in execution order:
//! - 1 Authentication (console login)
//! - 2 Advertiser Exists
//! - 3 Campaigns Report
//! - 4 Entity Registration Failures
//! - 5 Active Bidders Cache
//! - 6 Attributable Entities Cache
//! - 7 Winning Ads (test auction)
//!
//! # Classification rules
//!
//! Every check turns one response into `Result<CheckOutcome, ClassifiedError>`:
//! - Console responses (1-6) must carry an envelope with `status == "success"`
//! - The auction engine (7) is judged on HTTP status alone
//! - Transport failures map to timeout / connection / unexpected errors
//! - Bodies that do not decode are unexpected errors, never panics
//!
//! Classification is pure; the same response always yields the same outcome.

pub mod auction;
pub mod console;
pub mod envelope;

use serde_json::json;

use crate::http::client::{ApiRequest, ApiResponse, TransportError};
use crate::{CheckOutcome, RunConfig, SessionToken};

/// Prerequisite a check needs before it may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Always runs
    None,
    /// Needs the session token from authentication
    Session,
    /// Needs the session token and a passing advertiser check
    Advertiser,
}

/// Why an executed check failed. `Display` is the FAIL detail text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifiedError {
    #[error("Request timed out")]
    TransportTimeout,
    #[error("{}", connect_detail(.host))]
    TransportConnect { host: Option<String> },
    /// Envelope status other than "success"
    #[error("Error {code}: {message}")]
    Domain { code: String, message: String },
    /// Envelope error on the login call
    #[error("Login failed — code {code}: {message}")]
    LoginRejected { code: String, message: String },
    #[error("No {0} in response")]
    MissingField(&'static str),
    /// Non-200 answer from the auction engine
    #[error("HTTP {status} — auction engine may be misconfigured or client '{client}' is not provisioned")]
    AuctionRejected { status: u16, client: String },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<TransportError> for ClassifiedError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout => ClassifiedError::TransportTimeout,
            TransportError::Connect { host } => ClassifiedError::TransportConnect { host: Some(host) },
            TransportError::Other(message) => ClassifiedError::Unexpected(message),
        }
    }
}

fn connect_detail(host: &Option<String>) -> String {
    match host {
        Some(host) => format!("Connection error — cannot reach {}", host),
        None => "Connection error".to_string(),
    }
}

/// The seven checks of a health-check run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    Authentication,
    AdvertiserExists,
    CampaignsReport,
    EntityRegistrationFailures,
    ActiveBidders,
    AttributableEntities,
    WinningAds,
}

impl CheckKind {
    /// All checks in execution order
    pub const ALL: [CheckKind; 7] = [
        CheckKind::Authentication,
        CheckKind::AdvertiserExists,
        CheckKind::CampaignsReport,
        CheckKind::EntityRegistrationFailures,
        CheckKind::ActiveBidders,
        CheckKind::AttributableEntities,
        CheckKind::WinningAds,
    ];

    pub fn number(self) -> u8 {
        match self {
            CheckKind::Authentication => 1,
            CheckKind::AdvertiserExists => 2,
            CheckKind::CampaignsReport => 3,
            CheckKind::EntityRegistrationFailures => 4,
            CheckKind::ActiveBidders => 5,
            CheckKind::AttributableEntities => 6,
            CheckKind::WinningAds => 7,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.number() == number)
    }

    pub fn name(self) -> &'static str {
        match self {
            CheckKind::Authentication => "Authentication",
            CheckKind::AdvertiserExists => "Advertiser Exists",
            CheckKind::CampaignsReport => "Campaigns Report",
            CheckKind::EntityRegistrationFailures => "Entity Registration Failures",
            CheckKind::ActiveBidders => "Active Bidders Cache",
            CheckKind::AttributableEntities => "Attributable Entities Cache",
            CheckKind::WinningAds => "Winning Ads (Test Auction)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CheckKind::Authentication => "Log in to the console API and obtain a session token",
            CheckKind::AdvertiserExists => "Verify the advertiser exists under the member group",
            CheckKind::CampaignsReport => "List the advertiser's campaigns",
            CheckKind::EntityRegistrationFailures => "Report failed entity registrations",
            CheckKind::ActiveBidders => "Verify the active bidders cache is populated",
            CheckKind::AttributableEntities => "Verify the attributable entities cache is populated",
            CheckKind::WinningAds => "Run a test auction against the client's auction engine",
        }
    }

    pub fn requirement(self) -> Requirement {
        match self {
            CheckKind::Authentication | CheckKind::WinningAds => Requirement::None,
            CheckKind::AdvertiserExists
            | CheckKind::ActiveBidders
            | CheckKind::AttributableEntities => Requirement::Session,
            CheckKind::CampaignsReport | CheckKind::EntityRegistrationFailures => {
                Requirement::Advertiser
            }
        }
    }

    /// Render the request for this check.
    ///
    /// `token` is attached only to checks that require a session.
    pub fn request(self, config: &RunConfig, token: Option<&SessionToken>) -> ApiRequest {
        let base = &config.base_url;
        let mgid = config.member_group_id;
        let aid = config.advertiser_id;

        let request = match self {
            CheckKind::Authentication => ApiRequest::post(
                format!("{}/session/login", base),
                json!({
                    "email": config.email,
                    "password": config.password,
                    "member_group_id": mgid,
                }),
            ),
            CheckKind::AdvertiserExists => {
                ApiRequest::get(format!("{}/member_groups/{}/advertisers/{}", base, mgid, aid))
            }
            CheckKind::CampaignsReport => ApiRequest::post(
                format!(
                    "{}/member_groups/{}/advertisers/{}/campaigns_report",
                    base, mgid, aid
                ),
                json!({"pagination": {"start": 0}}),
            ),
            CheckKind::EntityRegistrationFailures => ApiRequest::post(
                format!(
                    "{}/member_groups/{}/advertisers/{}/entity_registrations/failed/report",
                    base, mgid, aid
                ),
                json!({"pagination": {"count": console::FAILURE_PAGE_SIZE, "start": 0}}),
            ),
            CheckKind::ActiveBidders => {
                ApiRequest::get(format!("{}/member_groups/{}/active_bidders", base, mgid))
            }
            CheckKind::AttributableEntities => {
                ApiRequest::get(format!("{}/member_groups/{}/attributable_entities", base, mgid))
            }
            CheckKind::WinningAds => return auction::winning_ads_request(config),
        };

        match self.requirement() {
            Requirement::None => request,
            Requirement::Session | Requirement::Advertiser => request.with_auth(token),
        }
    }

    /// Classify a response received for this check
    pub fn classify(
        self,
        config: &RunConfig,
        response: &ApiResponse,
    ) -> Result<CheckOutcome, ClassifiedError> {
        match self {
            CheckKind::Authentication => console::classify_login(response),
            CheckKind::AdvertiserExists => console::classify_advertiser(response),
            CheckKind::CampaignsReport => console::classify_campaigns(response),
            CheckKind::EntityRegistrationFailures => console::classify_registration_failures(response),
            CheckKind::ActiveBidders => console::classify_active_bidders(response),
            CheckKind::AttributableEntities => console::classify_attributable_entities(response),
            CheckKind::WinningAds => auction::classify_winning_ads(&config.client_name, response),
        }
    }

    /// Map a transport failure for this check.
    ///
    /// Authentication and the test auction name the unreachable host.
    pub fn classify_transport_error(self, error: TransportError) -> ClassifiedError {
        match ClassifiedError::from(error) {
            ClassifiedError::TransportConnect { .. }
                if !matches!(self, CheckKind::Authentication | CheckKind::WinningAds) =>
            {
                ClassifiedError::TransportConnect { host: None }
            }
            classified => classified,
        }
    }
}
