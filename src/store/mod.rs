//! Typed row operations against the catalog tables.
//!
//! Services depend on [`CatalogStore`] rather than on the HTTP client so the
//! write pipeline and the read model can run against an in-memory store.

pub mod rest;

use crate::clients::BackendError;
use crate::domain::{AnimeId, UserId};
use crate::models::{
    AnimeRecord, AnimeUpdate, AnimeWithDetails, EpisodeRecord, LinkRecord, NewAnime, NewEpisode,
    NewLink, NewSubtitle, Profile, SubtitleRecord,
};
use thiserror::Error;

pub use rest::RestCatalogStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message}")]
    Backend { status: Option<u16>, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to decode backend data: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            status: None,
            message: message.into(),
        }
    }
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(message) => Self::Decode(message),
            BackendError::Api { status, message } => Self::Backend {
                status: Some(status),
                message,
            },
            BackendError::Http(e) => Self::Backend {
                status: None,
                message: e.to_string(),
            },
        }
    }
}

#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_anime(&self, row: &NewAnime) -> Result<AnimeRecord, StoreError>;

    async fn insert_episode(&self, row: &NewEpisode) -> Result<EpisodeRecord, StoreError>;

    async fn insert_link(&self, row: &NewLink) -> Result<LinkRecord, StoreError>;

    async fn insert_subtitle(&self, row: &NewSubtitle) -> Result<SubtitleRecord, StoreError>;

    /// Non-archived anime owned by `owner` with their nested episodes, links
    /// and subtitles, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend rejects the query or the tree
    /// cannot be decoded.
    async fn fetch_catalog(&self, owner: UserId) -> Result<Vec<AnimeWithDetails>, StoreError>;

    /// Applies `patch` to one anime owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no owned row matched.
    async fn update_anime(
        &self,
        id: AnimeId,
        owner: UserId,
        patch: &AnimeUpdate,
    ) -> Result<AnimeRecord, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no owned row matched.
    async fn delete_anime(&self, id: AnimeId, owner: UserId) -> Result<(), StoreError>;

    async fn find_episode(
        &self,
        anime_id: AnimeId,
        episode_number: i32,
    ) -> Result<Option<EpisodeRecord>, StoreError>;

    async fn fetch_profile(&self, id: UserId) -> Result<Profile, StoreError>;
}
