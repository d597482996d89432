// Response normalization
// Status classification plus deep snake_casing of JSON keys

use heck::ToSnakeCase;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{PaylocityError, Result};

/// Rendered form of an empty successful response
pub const SUCCESS_SENTINEL: &str = "Success";

/// A normalized 2xx response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 2xx with an empty body
    Success,
    /// Decoded body with underscore-cased keys
    Json(Value),
}

impl ApiResponse {
    pub fn is_success_sentinel(&self) -> bool {
        matches!(self, ApiResponse::Success)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiResponse::Success => None,
            ApiResponse::Json(value) => Some(value),
        }
    }

    /// Collapse into a JSON value; the empty case becomes `"Success"`
    pub fn into_value(self) -> Value {
        match self {
            ApiResponse::Success => Value::String(SUCCESS_SENTINEL.to_string()),
            ApiResponse::Json(value) => value,
        }
    }

    /// Deserialize the body into a typed model
    pub fn into_model<T>(self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match self {
            ApiResponse::Success => Err(PaylocityError::Decode(
                "expected a JSON body, got an empty response".to_string(),
            )),
            ApiResponse::Json(value) => Ok(serde_json::from_value(value)?),
        }
    }
}

impl std::fmt::Display for ApiResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiResponse::Success => f.write_str(SUCCESS_SENTINEL),
            ApiResponse::Json(value) => write!(f, "{}", value),
        }
    }
}

/// One entry of a 400 response body
#[derive(Debug, Deserialize)]
struct ValidationMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    options: Option<Value>,
}

/// Read a `reqwest` response and normalize it
pub async fn parse_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();
    let body = response.text().await?;
    normalize(status, &body)
}

/// Classify a status/body pair into a normalized response or an error
pub fn normalize(status: StatusCode, body: &str) -> Result<ApiResponse> {
    let reason = reason_phrase(status);

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(ApiResponse::Success);
        }
        let data: Value = serde_json::from_str(body)
            .map_err(|e| PaylocityError::Decode(format!("{} (status {})", e, status.as_u16())))?;
        return Ok(ApiResponse::Json(underscore_keys(data)));
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!(status = status.as_u16(), "Rate limited by Paylocity");
            Err(PaylocityError::TooManyRequests {
                status: status.as_u16(),
                reason,
            })
        }
        StatusCode::BAD_REQUEST => {
            let message = format_validation_errors(&reason, body);
            tracing::warn!(status = status.as_u16(), message = %message, "Request rejected");
            Err(PaylocityError::Validation {
                status: status.as_u16(),
                message,
            })
        }
        _ => {
            tracing::error!(
                status = status.as_u16(),
                response_body = %body,
                "Paylocity request failed"
            );
            Err(PaylocityError::Http {
                status: status.as_u16(),
                reason,
            })
        }
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

/// Build `400 - {reason}` followed by one ` - {message} {options}` line per entry
fn format_validation_errors(reason: &str, body: &str) -> String {
    let header = format!("400 - {}", reason);

    let lines = match serde_json::from_str::<Vec<ValidationMessage>>(body) {
        Ok(entries) => entries
            .into_iter()
            .map(|entry| {
                let message = entry.message.unwrap_or_default();
                match entry.options.as_ref().map(render_options) {
                    Some(options) if !options.is_empty() => format!(" - {} {}", message, options),
                    _ => format!(" - {}", message),
                }
            })
            .collect::<Vec<_>>(),
        Err(_) if body.trim().is_empty() => Vec::new(),
        Err(_) => vec![format!(" - {}", body.trim())],
    };

    std::iter::once(header)
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_options(options: &Value) -> String {
    match options {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_options)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Recursively rewrite every object key to snake_case
///
/// Arrays keep their order; scalars pass through. Running it twice is a no-op.
/// When two keys collapse to the same name (`employeeId` and `employee_id`)
/// only one value survives and a warning is logged.
pub fn underscore_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let snake = underscore(&key);
                if out.insert(snake.clone(), underscore_keys(value)).is_some() {
                    tracing::warn!(
                        key = %key,
                        normalized = %snake,
                        "Response keys collide after snake_casing"
                    );
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(underscore_keys).collect()),
        scalar => scalar,
    }
}

/// `employeeId` -> `employee_id`, `HTTPStatus` -> `http_status`
pub fn underscore(key: &str) -> String {
    key.to_snake_case()
}
