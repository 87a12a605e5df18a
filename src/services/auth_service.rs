//! Domain service for authentication against the hosted backend.
//!
//! Handles sign-up, sign-in, sign-out, password reset and session restore, and
//! publishes the acting identity.

use crate::clients::BackendError;
use crate::models::AuthUser;
use crate::store::StoreError;
use thiserror::Error;
use tokio::sync::watch;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("User profile not found")]
    ProfileNotFound,

    #[error("Auth backend error: {0}")]
    Backend(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api { status: 400, message }
                if message.to_lowercase().contains("invalid login credentials") =>
            {
                Self::InvalidCredentials
            }
            BackendError::Api { status: 401, .. } => Self::NotAuthenticated,
            other => Self::Backend(other.message()),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::ProfileNotFound,
            other => Self::Backend(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(err: std::io::Error) -> Self {
        Self::Session(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is live and signed in.
    SignedIn(AuthUser),
    /// The backend sent a confirmation email; sign in after confirming.
    ConfirmationRequired { email: String },
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers an account whose display name is the email's local part.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    /// Verifies credentials and resolves the profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails and
    /// [`AuthError::ProfileNotFound`] when the account has no profile row; in
    /// that case no identity is published.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    /// Ends the session locally and on the backend.
    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn reset_password(&self, email: &str, redirect_to: Option<&str>)
    -> Result<(), AuthError>;

    /// Resumes a persisted session, refreshing it first when it has expired.
    async fn restore_session(&self) -> Result<Option<AuthUser>, AuthError>;

    fn current_user(&self) -> Option<AuthUser>;

    /// Receives every identity change, starting with the current one.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}
