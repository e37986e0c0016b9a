//! Console API checks (1 through 6).
//!
//! Typed schemas for each endpoint's `result` payload and the classifiers
//! that turn them into outcomes.

use serde::Deserialize;
use serde_json::{json, Value};

use super::envelope::{self, display_or, NOT_AVAILABLE};
use super::ClassifiedError;
use crate::http::client::ApiResponse;
use crate::{CheckOutcome, SessionToken};

/// Page size requested from the failed registrations report
pub const FAILURE_PAGE_SIZE: u32 = 50;

/// Failed registrations listed in the details
pub const FAILURE_PREVIEW_LIMIT: usize = 5;

/// `result` of `POST /session/login`
#[derive(Debug, Default, Deserialize)]
pub struct LoginResult {
    #[serde(default)]
    pub token: Option<LoginToken>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginToken {
    #[serde(default)]
    pub id_token: Option<String>,
}

/// `result` of `GET /member_groups/{mgid}/advertisers/{aid}`
#[derive(Debug, Default, Deserialize)]
pub struct Advertiser {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub entity_count: Option<Value>,
    #[serde(default)]
    pub currency_code: Option<Value>,
}

/// `result` of the campaigns report
#[derive(Debug, Default, Deserialize)]
pub struct CampaignsReport {
    #[serde(default)]
    pub campaigns: Option<Vec<Campaign>>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Campaign {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub always_on: Option<Value>,
    #[serde(default)]
    pub budget_type: Option<Value>,
    #[serde(default)]
    pub budget_amount: Option<Value>,
}

/// `result` of the failed entity registrations report
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationFailures {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub entity_registrations: Option<Vec<RegistrationFailure>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationFailure {
    #[serde(default)]
    pub error_code: Option<Value>,
    #[serde(default)]
    pub error_message: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActiveBidders {
    #[serde(default)]
    pub active_bidders: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttributableEntities {
    #[serde(default)]
    pub attributable_entities: Option<Vec<Value>>,
}

/// Check 1: the login must yield a non-empty `id_token`
pub fn classify_login(response: &ApiResponse) -> Result<CheckOutcome, ClassifiedError> {
    let result: LoginResult = envelope::open(response).map_err(|err| match err {
        ClassifiedError::Domain { code, message } => ClassifiedError::LoginRejected { code, message },
        other => other,
    })?;

    let token = result
        .token
        .and_then(|t| t.id_token)
        .filter(|t| !t.is_empty())
        .ok_or(ClassifiedError::MissingField("id_token"))?;

    Ok(CheckOutcome::pass("Authenticated successfully").with_token(SessionToken::new(token)))
}

/// Check 2: any successful envelope passes
pub fn classify_advertiser(response: &ApiResponse) -> Result<CheckOutcome, ClassifiedError> {
    let advertiser: Advertiser = envelope::open(response)?;

    let details = format!(
        "Found: {} | status={} | entities={} | currency={}",
        display_or(advertiser.name.as_ref(), NOT_AVAILABLE),
        display_or(advertiser.status.as_ref(), NOT_AVAILABLE),
        display_or(advertiser.entity_count.as_ref(), NOT_AVAILABLE),
        display_or(advertiser.currency_code.as_ref(), NOT_AVAILABLE),
    );
    Ok(CheckOutcome::pass(details))
}

/// Check 3: warn when the advertiser has no campaigns
pub fn classify_campaigns(response: &ApiResponse) -> Result<CheckOutcome, ClassifiedError> {
    let report: CampaignsReport = envelope::open(response)?;
    let campaigns = report.campaigns.unwrap_or_default();
    let total = report.total.unwrap_or(campaigns.len() as u64);
    let extra = json!({"total": total, "listed": campaigns.len()});

    if total == 0 {
        return Ok(CheckOutcome::warn("Zero campaigns found for this advertiser").with_extra(extra));
    }

    let mut lines = vec![format!("Found {} campaign(s)", total)];
    for campaign in &campaigns {
        lines.push(format!(
            "  • {} | status={} | always_on={} | budget={}/{}",
            display_or(campaign.name.as_ref(), NOT_AVAILABLE),
            display_or(campaign.status.as_ref(), NOT_AVAILABLE),
            display_or(campaign.always_on.as_ref(), NOT_AVAILABLE),
            display_or(campaign.budget_type.as_ref(), NOT_AVAILABLE),
            display_or(campaign.budget_amount.as_ref(), NOT_AVAILABLE),
        ));
    }

    Ok(CheckOutcome::pass(lines.join("\n")).with_extra(extra))
}

/// Check 4: warn when any entity registration failed
pub fn classify_registration_failures(
    response: &ApiResponse,
) -> Result<CheckOutcome, ClassifiedError> {
    let report: RegistrationFailures = envelope::open(response)?;
    let total = report.total.unwrap_or(0);

    if total == 0 {
        return Ok(CheckOutcome::pass("No entity registration failures")
            .with_extra(json!({"total": 0})));
    }

    let failures = report.entity_registrations.unwrap_or_default();
    let preview: Vec<&RegistrationFailure> = failures.iter().take(FAILURE_PREVIEW_LIMIT).collect();

    let mut lines = vec![format!(
        "{} registration failure(s) found. First {}:",
        total,
        preview.len()
    )];
    for failure in &preview {
        lines.push(format!(
            "  • [{}] {}",
            display_or(failure.error_code.as_ref(), NOT_AVAILABLE),
            display_or(failure.error_message.as_ref(), NOT_AVAILABLE),
        ));
    }

    Ok(CheckOutcome::warn(lines.join("\n")).with_extra(json!({"total": total})))
}

/// Check 5: warn on an empty active bidders cache
pub fn classify_active_bidders(response: &ApiResponse) -> Result<CheckOutcome, ClassifiedError> {
    let cache: ActiveBidders = envelope::open(response)?;
    let count = cache.active_bidders.map(|b| b.len()).unwrap_or(0);
    let extra = json!({"count": count});

    if count == 0 {
        return Ok(CheckOutcome::warn(
            "Active bidders list is empty — no ad groups are active",
        )
        .with_extra(extra));
    }
    Ok(CheckOutcome::pass(format!("{} active bidder(s) in cache", count)).with_extra(extra))
}

/// Check 6: warn on an empty attributable entities cache
pub fn classify_attributable_entities(
    response: &ApiResponse,
) -> Result<CheckOutcome, ClassifiedError> {
    let cache: AttributableEntities = envelope::open(response)?;
    let count = cache.attributable_entities.map(|e| e.len()).unwrap_or(0);
    let extra = json!({"count": count});

    if count == 0 {
        return Ok(CheckOutcome::warn(
            "No attributable entities — conversions won't attribute",
        )
        .with_extra(extra));
    }
    Ok(CheckOutcome::pass(format!("{} attributable entit(ies) in cache", count)).with_extra(extra))
}
