//! Test auction against the client's auction engine (check 7).
//!
//! The auction engine lives on a per-client subdomain, takes no session
//! token and does not use the console envelope: any HTTP 200 passes.

use serde::Deserialize;
use serde_json::{json, Value};

use super::ClassifiedError;
use crate::http::client::{ApiRequest, ApiResponse};
use crate::{CheckOutcome, RunConfig};

/// Domain under which every client's auction engine is hosted
pub const AUCTION_DOMAIN: &str = "koddi.io";

/// Synthetic user GUID sent with the test auction
pub const TEST_USER_GUID: &str = "healthcheck-test-user";

#[derive(Debug, Default, Deserialize)]
pub struct WinningAds {
    #[serde(default)]
    pub sponsored_listings: Option<Vec<Value>>,
}

/// Host of the auction engine for `client_name`
pub fn auction_host(client_name: &str) -> String {
    format!("{}.{}", client_name, AUCTION_DOMAIN)
}

/// Render the winning-ads request. No bidders, one slot.
pub fn winning_ads_request(config: &RunConfig) -> ApiRequest {
    let mut body = json!({
        "client_name": config.client_name,
        "site_id": config.site_id,
        "slots_available": 1,
        "max_requested": 1,
        "user": {"guid": TEST_USER_GUID},
        "bidders": [],
    });
    if let (Some(name), Some(fields)) = (&config.experience_name, body.as_object_mut()) {
        fields.insert("experience_name".to_string(), json!(name));
    }

    ApiRequest::post(
        format!("https://{}/auction-engine/winning_ads", auction_host(&config.client_name)),
        body,
    )
}

/// Check 7: HTTP 200 passes; the listing count goes into the details
pub fn classify_winning_ads(
    client_name: &str,
    response: &ApiResponse,
) -> Result<CheckOutcome, ClassifiedError> {
    if response.status != 200 {
        return Err(ClassifiedError::AuctionRejected {
            status: response.status,
            client: client_name.to_string(),
        });
    }

    let body = match response.json::<Value>() {
        Ok(body @ Value::Object(_)) => body,
        Ok(_) => {
            return Err(ClassifiedError::Unexpected(
                "invalid auction response: expected a JSON object".to_string(),
            ))
        }
        Err(e) => {
            return Err(ClassifiedError::Unexpected(format!("invalid auction response: {}", e)))
        }
    };
    let ads: WinningAds = serde_json::from_value(body)
        .map_err(|e| ClassifiedError::Unexpected(format!("invalid auction response: {}", e)))?;
    let count = ads.sponsored_listings.map(|l| l.len()).unwrap_or(0);

    let details = if count == 0 {
        "Auction responded OK — 0 listings (expected with empty bidders)".to_string()
    } else {
        format!("Auction responded OK — {} sponsored listing(s) returned", count)
    };
    Ok(CheckOutcome::pass(details).with_extra(json!({"http_status": 200, "listings": count})))
}
