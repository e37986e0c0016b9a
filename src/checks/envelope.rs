//! Console API response envelope.
//!
//! Every console endpoint wraps its payload as
//! `{"status": "success", "result": {...}}` or
//! `{"status": "error", "error_code": ..., "message": ...}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::ClassifiedError;
use crate::http::client::ApiResponse;

/// Placeholder for fields the API left out
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error_code: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl RawEnvelope {
    fn is_success(&self) -> bool {
        matches!(&self.status, Some(Value::String(s)) if s == "success")
    }

    fn domain_error(&self) -> ClassifiedError {
        let message = present(&self.message)
            .or_else(|| present(&self.error))
            .map(display_value)
            .unwrap_or_else(|| "unknown error".to_string());

        ClassifiedError::Domain {
            code: display_or(self.error_code.as_ref(), "unknown"),
            message,
        }
    }
}

/// Open the envelope and decode `result` into `T`.
///
/// A missing or null `result` decodes as `T::default()`.
pub fn open<T>(response: &ApiResponse) -> Result<T, ClassifiedError>
where
    T: DeserializeOwned + Default,
{
    let body = object_body(response)?;
    let envelope: RawEnvelope = serde_json::from_value(body)
        .map_err(|e| ClassifiedError::Unexpected(format!("invalid response body: {}", e)))?;

    if !envelope.is_success() {
        return Err(envelope.domain_error());
    }

    match envelope.result {
        None | Some(Value::Null) => Ok(T::default()),
        Some(result) => serde_json::from_value(result)
            .map_err(|e| ClassifiedError::Unexpected(format!("invalid result payload: {}", e))),
    }
}

/// Decode the body as a JSON object; arrays and scalars are malformed
fn object_body(response: &ApiResponse) -> Result<Value, ClassifiedError> {
    match response.json::<Value>() {
        Ok(body @ Value::Object(_)) => Ok(body),
        Ok(_) => Err(ClassifiedError::Unexpected(
            "invalid response body: expected a JSON object".to_string(),
        )),
        Err(e) => Err(ClassifiedError::Unexpected(format!("invalid response body: {}", e))),
    }
}

fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

/// Render a loosely typed field; strings print bare
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render an optional field, substituting `fallback` when absent or null
pub fn display_or(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(v) => display_value(v),
    }
}
