use super::{BackendError, build_http_client, error_message, parse_json};
use crate::config::BackendConfig;
use crate::domain::UserId;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::debug;

/// Seconds before the nominal expiry at which a session is treated as stale.
const EXPIRY_LEEWAY_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthAccount {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthAccount,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Fills in `expires_at` from `expires_in` when the server omitted it.
    #[must_use]
    pub fn anchored(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() && self.expires_in > 0 {
            self.expires_at = Some(now.timestamp() + self.expires_in);
        }
        self
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| now.timestamp() + EXPIRY_LEEWAY_SECONDS >= at)
    }
}

/// A sign-up either returns a live session or, when email confirmation is
/// on, only the pending account.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(Session),
    Pending(AuthAccount),
}

/// Client for the `/auth/v1` session API.
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl GoTrueClient {
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}/auth/v1/{path}", self.base_url))
            .header("apikey", &self.anon_key)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let request = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body = self.execute("token", request).await?;
        Ok(parse_json::<Session>(&body)?.anchored(Utc::now()))
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, BackendError> {
        let request = self
            .post("token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let body = self.execute("token", request).await?;
        Ok(parse_json::<Session>(&body)?.anchored(Utc::now()))
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<SignUpResponse, BackendError> {
        let request = self.post("signup").json(&json!({
            "email": email,
            "password": password,
            "data": { "name": name },
        }));
        let body = self.execute("signup", request).await?;
        Ok(match parse_json(&body)? {
            SignUpResponse::Session(session) => {
                SignUpResponse::Session(session.anchored(Utc::now()))
            }
            pending => pending,
        })
    }

    pub async fn logout(&self, access_token: &str) -> Result<(), BackendError> {
        let request = self
            .post("logout")
            .header(AUTHORIZATION, format!("Bearer {access_token}"));
        self.execute("logout", request).await?;
        Ok(())
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthAccount, BackendError> {
        let request = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"));
        let body = self.execute("user", request).await?;
        parse_json(&body)
    }

    /// Sends a password reset email.
    pub async fn recover(&self, email: &str, redirect_to: Option<&str>) -> Result<(), BackendError> {
        let mut request = self.post("recover").json(&json!({ "email": email }));
        if let Some(redirect) = redirect_to {
            request = request.query(&[("redirect_to", redirect)]);
        }
        self.execute("recover", request).await?;
        Ok(())
    }

    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<String, BackendError> {
        let start = Instant::now();
        let response = request.send().await?;
        let status = response.status();

        let labels = [
            ("endpoint", endpoint.to_string()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("auth_requests_total", &labels).increment(1);
        debug!(
            endpoint,
            status = status.as_u16(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Auth request finished"
        );

        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(body)
    }
}
