//! Backend session implementation of the `AuthService` trait.

use crate::clients::gotrue::{GoTrueClient, Session, SignUpResponse};
use crate::clients::postgrest::PostgrestClient;
use crate::models::AuthUser;
use crate::models::user::default_display_name;
use crate::services::auth_service::{AuthError, AuthService, SignUpOutcome};
use crate::session::SessionFile;
use crate::store::CatalogStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

pub struct GoTrueAuthService {
    gotrue: GoTrueClient,
    postgrest: PostgrestClient,
    store: Arc<dyn CatalogStore>,
    session_file: SessionFile,
    session: Mutex<Option<Session>>,
    identity: watch::Sender<Option<AuthUser>>,
}

impl GoTrueAuthService {
    /// `postgrest` must be the client behind `store` so that a sign-in
    /// authorizes subsequent table requests.
    #[must_use]
    pub fn new(
        gotrue: GoTrueClient,
        postgrest: PostgrestClient,
        store: Arc<dyn CatalogStore>,
        session_file: SessionFile,
    ) -> Self {
        let (identity, _) = watch::channel(None);
        Self {
            gotrue,
            postgrest,
            store,
            session_file,
            session: Mutex::new(None),
            identity,
        }
    }

    /// Adopts a session, persists it and resolves the profile behind it.
    async fn establish(&self, session: Session) -> Result<AuthUser, AuthError> {
        self.postgrest
            .set_access_token(Some(session.access_token.clone()));
        if let Err(e) = self.session_file.save(&session).await {
            warn!(error = %e, path = %self.session_file.path().display(), "Failed to persist session");
        }

        let user_id = session.user.id;
        *self.session.lock().await = Some(session);

        match self.store.fetch_profile(user_id).await {
            Ok(profile) => {
                let user = AuthUser::from(profile);
                info!(user_id = %user.id, email = %user.email, "Signed in");
                self.identity.send_replace(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load user profile");
                self.identity.send_replace(None);
                Err(e.into())
            }
        }
    }

    async fn forget(&self) -> Result<(), AuthError> {
        self.postgrest.set_access_token(None);
        *self.session.lock().await = None;
        self.identity.send_replace(None);
        self.session_file.clear().await?;
        Ok(())
    }
}

#[async_trait]
impl AuthService for GoTrueAuthService {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let name = default_display_name(email);
        match self.gotrue.sign_up(email, password, &name).await? {
            SignUpResponse::Session(session) => {
                let user = self.establish(session).await?;
                Ok(SignUpOutcome::SignedIn(user))
            }
            SignUpResponse::Pending(account) => {
                info!(user_id = %account.id, "Sign-up awaiting email confirmation");
                Ok(SignUpOutcome::ConfirmationRequired {
                    email: account.email.unwrap_or_else(|| email.to_string()),
                })
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let session = self.gotrue.sign_in_with_password(email, password).await?;
        self.establish(session).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .session
            .lock()
            .await
            .as_ref()
            .map(|s| s.access_token.clone());

        if let Some(token) = token
            && let Err(e) = self.gotrue.logout(&token).await
        {
            warn!(error = %e, "Backend logout failed; clearing local session anyway");
        }

        self.forget().await?;
        info!("Signed out");
        Ok(())
    }

    async fn reset_password(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<(), AuthError> {
        self.gotrue.recover(email, redirect_to).await?;
        info!(email, "Password reset requested");
        Ok(())
    }

    async fn restore_session(&self) -> Result<Option<AuthUser>, AuthError> {
        let Some(mut session) = self.session_file.load().await? else {
            self.identity.send_replace(None);
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            match self.gotrue.refresh_session(&session.refresh_token).await {
                Ok(fresh) => session = fresh,
                Err(e) => {
                    warn!(error = %e, "Stored session could not be refreshed");
                    self.forget().await?;
                    return Ok(None);
                }
            }
        }

        self.establish(session).await.map(Some)
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.identity.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.identity.subscribe()
    }
}
