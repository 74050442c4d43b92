//! HTTP utilities for ARM REST API calls

use crate::error::{AnfError, Result};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying the status URL of a long-running operation
pub const ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Successful ARM response, with the headers that drive long-running operations
#[derive(Debug, Clone)]
pub struct ArmResponse {
    pub status: u16,
    pub body: Value,
    pub async_operation: Option<String>,
    pub location: Option<String>,
    pub retry_after: Option<Duration>,
}

impl ArmResponse {
    fn from_parts(status: u16, headers: &HeaderMap, body: Value) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };

        Self {
            status,
            body,
            async_operation: header(ASYNC_OPERATION),
            location: header(LOCATION.as_str()),
            retry_after: header(RETRY_AFTER.as_str())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs),
        }
    }

    /// True when the service accepted the request but finishes it asynchronously
    pub fn is_long_running(&self) -> bool {
        self.async_operation.is_some() || (self.status == 202 && self.location.is_some())
    }
}

/// HTTP client wrapper for ARM calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
}

impl ArmHttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("tanf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    pub async fn get(&self, url: &str, token: &str) -> Result<ArmResponse> {
        self.send(Method::GET, url, token, None).await
    }

    pub async fn put(&self, url: &str, token: &str, body: &Value) -> Result<ArmResponse> {
        self.send(Method::PUT, url, token, Some(body)).await
    }

    pub async fn patch(&self, url: &str, token: &str, body: &Value) -> Result<ArmResponse> {
        self.send(Method::PATCH, url, token, Some(body)).await
    }

    pub async fn delete(&self, url: &str, token: &str) -> Result<ArmResponse> {
        self.send(Method::DELETE, url, token, None).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<ArmResponse> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(api_error(status.as_u16(), &text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        Ok(ArmResponse::from_parts(status.as_u16(), &headers, body))
    }
}

/// Build an error from a failed response, using the ARM error envelope when present
fn api_error(status: u16, body: &str) -> AnfError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    let code = error
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
        .to_string();
    let message = error
        .and_then(|e| e.get("message"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| sanitize_for_log(body));

    if status == 404 {
        return AnfError::NotFound(format!("{}: {}", code, message));
    }

    AnfError::Api {
        status,
        code,
        message,
    }
}

/// Short hint for an error, for the final report
pub fn error_hint(error: &AnfError) -> Option<&'static str> {
    match error {
        AnfError::Api { status: 401, .. } => {
            Some("Authentication failed. Check the service principal in AZURE_AUTH_LOCATION.")
        }
        AnfError::Api { status: 403, .. } => {
            Some("Permission denied. Check the service principal's role assignments.")
        }
        AnfError::Api { status: 409, .. } => {
            Some("Resource conflict. The resource may be in use or still being deleted.")
        }
        AnfError::Api { status: 429, .. } => Some("Rate limit exceeded. Try again later."),
        AnfError::Api { status, .. } if *status >= 500 => {
            Some("Azure service temporarily unavailable. Try again.")
        }
        AnfError::Http(_) => Some("Request failed. Check your network connection."),
        _ => None,
    }
}
