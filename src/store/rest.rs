use super::{CatalogStore, StoreError};
use crate::clients::BackendError;
use crate::clients::postgrest::{PostgrestClient, Query};
use crate::constants::{CATALOG_SELECT, tables};
use crate::domain::{AnimeId, SortOrder, UserId};
use crate::models::{
    AnimeRecord, AnimeUpdate, AnimeWithDetails, EpisodeRecord, LinkRecord, NewAnime, NewEpisode,
    NewLink, NewSubtitle, Profile, SubtitleRecord,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// [`CatalogStore`] over the backend's table API.
#[derive(Debug, Clone)]
pub struct RestCatalogStore {
    client: PostgrestClient,
}

impl RestCatalogStore {
    #[must_use]
    pub const fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    fn owned_anime(id: AnimeId, owner: UserId) -> Query {
        Query::table(tables::ANIME)
            .eq("id", id)
            .eq("added_by", owner)
    }
}

#[async_trait]
impl CatalogStore for RestCatalogStore {
    async fn insert_anime(&self, row: &NewAnime) -> Result<AnimeRecord, StoreError> {
        Ok(self.client.insert_one(tables::ANIME, row).await?)
    }

    async fn insert_episode(&self, row: &NewEpisode) -> Result<EpisodeRecord, StoreError> {
        Ok(self.client.insert_one(tables::EPISODES, row).await?)
    }

    async fn insert_link(&self, row: &NewLink) -> Result<LinkRecord, StoreError> {
        Ok(self.client.insert_one(tables::EPISODE_LINKS, row).await?)
    }

    async fn insert_subtitle(&self, row: &NewSubtitle) -> Result<SubtitleRecord, StoreError> {
        Ok(self.client.insert_one(tables::SUBTITLES, row).await?)
    }

    async fn fetch_catalog(&self, owner: UserId) -> Result<Vec<AnimeWithDetails>, StoreError> {
        let query = Query::table(tables::ANIME)
            .select(CATALOG_SELECT)
            .eq("added_by", owner)
            .eq("is_archived", false)
            .order("created_at", SortOrder::Descending);

        let mut catalog: Vec<AnimeWithDetails> = self.client.select(&query).await?;
        for anime in &mut catalog {
            anime.sort_episodes();
        }

        debug!(owner = %owner, count = catalog.len(), "Fetched catalog");
        Ok(catalog)
    }

    async fn update_anime(
        &self,
        id: AnimeId,
        owner: UserId,
        patch: &AnimeUpdate,
    ) -> Result<AnimeRecord, StoreError> {
        let rows: Vec<AnimeRecord> = self
            .client
            .update(&Self::owned_anime(id, owner), patch)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Anime {id}")))
    }

    async fn delete_anime(&self, id: AnimeId, owner: UserId) -> Result<(), StoreError> {
        let deleted = self.client.delete(&Self::owned_anime(id, owner)).await?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("Anime {id}")));
        }
        Ok(())
    }

    async fn find_episode(
        &self,
        anime_id: AnimeId,
        episode_number: i32,
    ) -> Result<Option<EpisodeRecord>, StoreError> {
        let query = Query::table(tables::EPISODES)
            .select("*")
            .eq("anime_id", anime_id)
            .eq("episode_number", episode_number);
        let rows: Vec<EpisodeRecord> = self.client.select(&query).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_profile(&self, id: UserId) -> Result<Profile, StoreError> {
        let query = Query::table(tables::PROFILES).select("*").eq("id", id);
        match self.client.single(&query).await {
            Ok(profile) => Ok(profile),
            Err(BackendError::Api { status, .. }) if status == StatusCode::NOT_ACCEPTABLE.as_u16() => {
                Err(StoreError::NotFound(format!("Profile {id}")))
            }
            Err(e) => Err(e.into()),
        }
    }
}
