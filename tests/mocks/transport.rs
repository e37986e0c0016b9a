//! Scripted transport for orchestrator tests.

use std::cell::RefCell;

use koddi_healthcheck::http::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use koddi_healthcheck::RunConfig;
use serde_json::{json, Value};

/// One scripted answer
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub url_suffix: String,
    pub answer: Result<ApiResponse, TransportError>,
}

/// Transport that replays scripted answers and logs every request.
///
/// The last matching route wins, so presets can be overridden by adding
/// a more specific route afterwards. Unrouted requests fail with
/// `TransportError::Other`.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    calls: RefCell<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every endpoint answers with a passing response
    pub fn healthy() -> Self {
        Self::new()
            .on(
                Method::Post,
                "/session/login",
                envelope_ok(json!({"token": {"id_token": "abc"}})),
            )
            .on(
                Method::Get,
                "/member_groups/42/advertisers/1001",
                envelope_ok(json!({
                    "name": "Acme Outdoor",
                    "status": "active",
                    "entity_count": 120,
                    "currency_code": "USD"
                })),
            )
            .on(
                Method::Post,
                "/campaigns_report",
                envelope_ok(json!({
                    "campaigns": [
                        {"name": "Spring Sale", "status": "active", "always_on": false, "budget_type": "daily", "budget_amount": 250}
                    ],
                    "total": 1
                })),
            )
            .on(
                Method::Post,
                "/entity_registrations/failed/report",
                envelope_ok(json!({"total": 0, "entity_registrations": []})),
            )
            .on(
                Method::Get,
                "/active_bidders",
                envelope_ok(json!({"active_bidders": [{"id": 1}, {"id": 2}]})),
            )
            .on(
                Method::Get,
                "/attributable_entities",
                envelope_ok(json!({"attributable_entities": [{"id": "a"}]})),
            )
            .on(
                Method::Post,
                "/auction-engine/winning_ads",
                Ok(ApiResponse::new(200, r#"{"sponsored_listings":[]}"#)),
            )
    }

    /// Add a route; later routes take precedence
    pub fn on(
        mut self,
        method: Method,
        url_suffix: &str,
        answer: Result<ApiResponse, TransportError>,
    ) -> Self {
        self.routes.push(Route {
            method,
            url_suffix: url_suffix.to_string(),
            answer,
        });
        self
    }

    /// Requests received so far, in order
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Number of requests whose URL contains `fragment`
    pub fn calls_to(&self, fragment: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.borrow_mut().push(request.clone());
        self.routes
            .iter()
            .rev()
            .find(|route| route.method == request.method && request.url.ends_with(&route.url_suffix))
            .map(|route| route.answer.clone())
            .unwrap_or_else(|| {
                Err(TransportError::Other(format!(
                    "no mock route for {} {}",
                    request.method, request.url
                )))
            })
    }
}

/// `{"status":"success","result":...}` with HTTP 200
pub fn envelope_ok(result: Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(
        200,
        json!({"status": "success", "result": result}).to_string(),
    ))
}

/// `{"status":"error",...}` with the given HTTP status
pub fn envelope_err(http_status: u16, code: &str, message: &str) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(
        http_status,
        json!({"status": "error", "error_code": code, "message": message}).to_string(),
    ))
}

/// Configuration matching the `healthy()` routes
pub fn test_config() -> RunConfig {
    RunConfig::new("ops@example.com", "hunter2", 42, 1001, "acme")
        .with_base_url("https://console.example.test/console/v1")
}
