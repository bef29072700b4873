use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Startup failures. The process must not serve traffic after one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// PayPal answered with a failure, or could not be reached at all (`status` is `None`).
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
    #[error("order {0} not found")]
    NotFound(String),
    #[error("{0}")]
    Payload(String),
    #[error("{0}")]
    Validation(String),
}

impl GatewayError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        GatewayError::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Upstream { .. } => "upstream_error",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Payload(_) => "payload_error",
            GatewayError::Validation(_) => "validation_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Upstream { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Payload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "PayPal request timed out".to_string()
        } else {
            format!("PayPal request failed: {err}")
        };
        GatewayError::upstream(err.status().map(|s| s.as_u16()), message)
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

/// Human readable detail from a PayPal error body.
///
/// PayPal REST errors carry `message` plus a `details` list of `{issue, description}`;
/// the OAuth endpoint uses `error_description` instead.
pub fn upstream_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let details = value["details"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|d| d["description"].as_str().or_else(|| d["issue"].as_str()))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        if !details.is_empty() {
            return details;
        }
        for key in ["message", "error_description"] {
            if let Some(msg) = value[key].as_str().filter(|s| !s.is_empty()) {
                return msg.to_string();
            }
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{status} {reason}"),
        None => status.to_string(),
    }
}
