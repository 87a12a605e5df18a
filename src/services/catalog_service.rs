//! Read model of the signed-in user's catalog.
//!
//! The whole anime → episodes → links → subtitles tree is re-fetched after
//! every mutation and published as a [`CatalogSnapshot`]. There is no
//! incremental patching and no cache beyond the last snapshot.

use crate::domain::events::NotificationEvent;
use crate::domain::{AnimeId, UserId};
use crate::models::{AnimeDraft, AnimeRecord, AnimeUpdate, AnimeWithDetails, AuthUser, LinkDraft};
use crate::services::submission::{RowReport, SubmissionAdapter, SubmissionReport, SubmitError};
use crate::store::{CatalogStore, StoreError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("User not authenticated")]
    AuthRequired,

    #[error("Episode not found")]
    EpisodeNotFound {
        anime_id: AnimeId,
        episode_number: u32,
    },

    #[error(transparent)]
    Submit(SubmitError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SubmitError> for CatalogError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::AuthRequired => Self::AuthRequired,
            other => Self::Submit(other),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub anime: Vec<AnimeWithDetails>,
    pub loading: bool,
    pub owner: Option<UserId>,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    submission: SubmissionAdapter,
    snapshot: watch::Sender<CatalogSnapshot>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        let (snapshot, _) = watch::channel(CatalogSnapshot::default());
        Self {
            submission: SubmissionAdapter::new(Arc::clone(&store)),
            store,
            snapshot,
            event_bus,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.snapshot.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.snapshot.borrow().clone()
    }

    fn owner(&self) -> Option<UserId> {
        self.snapshot.borrow().owner
    }

    fn require_owner(&self) -> Result<UserId, CatalogError> {
        self.owner().ok_or(CatalogError::AuthRequired)
    }

    /// Switches the read model to a new identity.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error for a signed-in identity; the snapshot
    /// keeps its previous contents.
    pub async fn on_identity_changed(&self, user: Option<AuthUser>) -> Result<(), CatalogError> {
        match user {
            Some(user) => {
                let changed = self.owner() != Some(user.id);
                self.snapshot.send_modify(|snapshot| {
                    if changed {
                        snapshot.anime.clear();
                    }
                    snapshot.owner = Some(user.id);
                });
                self.refresh().await
            }
            None => {
                self.snapshot.send_replace(CatalogSnapshot::default());
                Ok(())
            }
        }
    }

    /// Applies every identity change published on `identity`, starting with
    /// the current value.
    pub fn follow_identity(
        self: &Arc<Self>,
        mut identity: watch::Receiver<Option<AuthUser>>,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let user = identity.borrow_and_update().clone();
                if let Err(e) = service.on_identity_changed(user).await {
                    debug!(error = %e, "Identity change left catalog stale");
                }
                if identity.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Re-fetches the owner's full catalog.
    ///
    /// # Errors
    ///
    /// On a fetch failure the previous collection is kept, `loading` is
    /// cleared and the error is returned.
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        let Some(owner) = self.owner() else {
            self.snapshot.send_replace(CatalogSnapshot::default());
            return Ok(());
        };

        self.snapshot.send_modify(|snapshot| snapshot.loading = true);

        match self.store.fetch_catalog(owner).await {
            Ok(anime) => {
                let count = anime.len();
                self.snapshot.send_modify(|snapshot| {
                    if snapshot.owner == Some(owner) {
                        snapshot.anime = anime;
                    }
                    snapshot.loading = false;
                });
                debug!(owner = %owner, count, "Catalog refreshed");
                let _ = self
                    .event_bus
                    .send(NotificationEvent::CatalogRefreshed { count });
                Ok(())
            }
            Err(e) => {
                error!(owner = %owner, error = %e, "Error fetching anime");
                self.snapshot.send_modify(|snapshot| snapshot.loading = false);
                Err(e.into())
            }
        }
    }

    /// Re-fetch after a write. A failed re-fetch is logged by `refresh` and
    /// does not undo the write.
    async fn refetch(&self) {
        let _ = self.refresh().await;
    }

    /// Validates and writes a draft for the current identity.
    ///
    /// # Errors
    ///
    /// See [`SubmissionAdapter::submit`]; a missing identity maps to
    /// [`CatalogError::AuthRequired`].
    pub async fn add_anime(&self, draft: &AnimeDraft) -> Result<SubmissionReport, CatalogError> {
        let report = self.submission.submit(draft, self.owner()).await?;

        let failed_rows = report.failures().count();
        let _ = self.event_bus.send(NotificationEvent::SubmissionFinished {
            title: report.anime.title.clone(),
            episodes: draft.episodes.len(),
            failed_rows,
        });

        self.refetch().await;
        Ok(report)
    }

    /// Patches an owned anime and stamps `updated_at`.
    ///
    /// # Errors
    ///
    /// [`CatalogError::AuthRequired`] without an identity, or the store error.
    pub async fn update_anime(
        &self,
        id: AnimeId,
        patch: AnimeUpdate,
    ) -> Result<AnimeRecord, CatalogError> {
        let owner = self.require_owner()?;
        let patch = patch.stamped(Utc::now());

        let record = self
            .store
            .update_anime(id, owner, &patch)
            .await
            .inspect_err(|e| error!(anime_id = %id, error = %e, "Error updating anime"))?;

        info!(anime_id = %id, "Updated anime");
        self.refetch().await;
        Ok(record)
    }

    /// # Errors
    ///
    /// [`CatalogError::AuthRequired`] without an identity, or the store error.
    pub async fn delete_anime(&self, id: AnimeId) -> Result<(), CatalogError> {
        let owner = self.require_owner()?;

        self.store
            .delete_anime(id, owner)
            .await
            .inspect_err(|e| error!(anime_id = %id, error = %e, "Error deleting anime"))?;

        info!(anime_id = %id, "Deleted anime");
        self.refetch().await;
        Ok(())
    }

    /// Adds links (and their subtitles) to an existing episode.
    ///
    /// # Errors
    ///
    /// [`CatalogError::EpisodeNotFound`] when the anime has no episode with
    /// that number. Individual link failures are reported, not raised.
    pub async fn add_links_to_anime(
        &self,
        anime_id: AnimeId,
        episode_number: u32,
        links: &[LinkDraft],
    ) -> Result<Vec<RowReport>, CatalogError> {
        self.require_owner()?;

        let number = i32::try_from(episode_number).map_err(|_| CatalogError::EpisodeNotFound {
            anime_id,
            episode_number,
        })?;
        let episode = self
            .store
            .find_episode(anime_id, number)
            .await?
            .ok_or(CatalogError::EpisodeNotFound {
                anime_id,
                episode_number,
            })?;

        let rows = self
            .submission
            .insert_links(episode.id, episode_number, links)
            .await;
        info!(
            anime_id = %anime_id,
            episode_number,
            links = links.len(),
            "Added links to episode"
        );

        self.refetch().await;
        Ok(rows)
    }
}
