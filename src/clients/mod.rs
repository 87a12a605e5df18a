pub mod gotrue;
pub mod postgrest;

use crate::config::BackendConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse backend response: {0}")]
    Parse(String),
}

impl BackendError {
    /// Message suitable for showing to a user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error bodies from both the table and the auth API. Fields vary by
/// endpoint and version.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Picks the most descriptive message out of an error response body.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        })
}

pub(crate) fn build_http_client(config: &BackendConfig) -> Result<Client, BackendError> {
    Ok(Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()?)
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| {
        let truncated: String = body.chars().take(500).collect();
        tracing::debug!(error = %e, response = %truncated, "Failed to parse backend response");
        BackendError::Parse(e.to_string())
    })
}
