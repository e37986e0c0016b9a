//! Blocking HTTP client for console and auction API requests.
//!
//! # Design Notes
//!
//! - One `reqwest::blocking::Client` per run, dropped when the run ends
//! - A single timeout covers every request of the run
//! - No retries: a failed call becomes one FAIL result
//! - Transport failures are reduced to timeout / connect / other so that
//!   every check maps them the same way

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::{HealthcheckError, SessionToken};

/// HTTP method used by a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A fully rendered outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Raw session token for the `Authorization` header
    pub auth: Option<SessionToken>,
    /// JSON body (POST only)
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Get,
            url: url.into(),
            auth: None,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        ApiRequest {
            method: Method::Post,
            url: url.into(),
            auth: None,
            body: Some(body),
        }
    }

    pub fn with_auth(mut self, token: Option<&SessionToken>) -> Self {
        self.auth = token.cloned();
        self
    }
}

/// HTTP response as seen by the classifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        ApiResponse {
            status,
            body: body.into(),
        }
    }

    /// Decode the body into a typed schema
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Transport-level failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("cannot connect to {host}")]
    Connect { host: String },
    #[error("{0}")]
    Other(String),
}

/// Sends one request and returns the raw response.
///
/// Implementations must not retry.
pub trait Transport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Configuration for HTTP requests
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Timeout applied to each request
    pub timeout: Duration,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            user_agent: crate::version::get_build_info().user_agent(),
        }
    }
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    user_agent: String,
}

impl HttpTransport {
    /// Create a transport with the given configuration
    pub fn new(config: &HttpConfig) -> Result<Self, HealthcheckError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HealthcheckError::HttpClient(e.to_string()))?;

        Ok(HttpTransport {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.header(USER_AGENT, &self.user_agent);

        if let Some(token) = &request.auth {
            builder = builder.header(AUTHORIZATION, token.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|e| map_reqwest_error(&request.url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| map_reqwest_error(&request.url, e))?;

        trace!(status, bytes = body.len(), "response received");
        Ok(ApiResponse { status, body })
    }
}

fn map_reqwest_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect {
            host: host_of(url),
        }
    } else {
        TransportError::Other(err.to_string())
    }
}

/// Host part of a URL, or the URL itself when it does not parse
pub fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}
