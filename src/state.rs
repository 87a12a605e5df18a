use std::sync::Arc;
use tokio::sync::broadcast;

use crate::clients::gotrue::GoTrueClient;
use crate::clients::postgrest::PostgrestClient;
use crate::config::Config;
use crate::domain::events::NotificationEvent;
use crate::models::AuthUser;
use crate::services::{AuthService, CatalogService, GoTrueAuthService};
use crate::session::SessionFile;
use crate::store::{CatalogStore, RestCatalogStore};

const EVENT_BUS_BUFFER: usize = 100;

/// Everything a command needs, wired from one [`Config`].
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub auth: Arc<dyn AuthService>,

    pub catalog: Arc<CatalogService>,

    pub event_bus: broadcast::Sender<NotificationEvent>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let postgrest = PostgrestClient::new(&config.backend)
            .map_err(|e| anyhow::anyhow!("Failed to build backend client: {e}"))?;
        let gotrue = GoTrueClient::new(&config.backend)
            .map_err(|e| anyhow::anyhow!("Failed to build auth client: {e}"))?;

        let store: Arc<dyn CatalogStore> = Arc::new(RestCatalogStore::new(postgrest.clone()));
        let session_file = SessionFile::new(config.session.resolved_path());
        let auth: Arc<dyn AuthService> = Arc::new(GoTrueAuthService::new(
            gotrue,
            postgrest,
            Arc::clone(&store),
            session_file,
        ));

        let (event_bus, _) = broadcast::channel(EVENT_BUS_BUFFER);
        let catalog = Arc::new(CatalogService::new(store, event_bus.clone()));

        Ok(Self {
            config: Arc::new(config),
            auth,
            catalog,
            event_bus,
        })
    }

    /// Restores the persisted session and points the catalog at it.
    ///
    /// Returns `None` when nobody is signed in.
    pub async fn resume(&self) -> anyhow::Result<Option<AuthUser>> {
        let user = self.auth.restore_session().await?;
        self.catalog.on_identity_changed(user.clone()).await?;
        Ok(user)
    }

    /// Like [`SharedState::resume`] but fails when nobody is signed in.
    pub async fn require_user(&self) -> anyhow::Result<AuthUser> {
        self.resume()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Not signed in. Run 'animedash login <email>' first."))
    }
}
