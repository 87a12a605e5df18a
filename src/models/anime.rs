//! Persisted catalog rows, the nested read-model tree and insert/update payloads.

use crate::domain::{AnimeId, AnimeStatus, EpisodeId, LinkId, SubtitleId, UserId};
use crate::models::draft::{AnimeDraft, EpisodeDraft, LinkDraft, SubtitleDraft};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: AnimeId,
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub synopsis: String,
    pub release_year: i32,
    pub episode_count: i32,
    #[serde(default)]
    pub studio_id: Option<String>,
    #[serde(default)]
    pub studio_name: Option<String>,
    pub rating: f32,
    pub status: AnimeStatus,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub added_by: UserId,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: EpisodeId,
    pub anime_id: AnimeId,
    pub episode_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: LinkId,
    pub episode_id: EpisodeId,
    pub platform: String,
    pub url: String,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleRecord {
    pub id: SubtitleId,
    pub link_id: LinkId,
    pub language: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One anime with its full episode/link/subtitle tree, as the read model sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimeWithDetails {
    #[serde(flatten)]
    pub anime: AnimeRecord,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub episodes: Vec<EpisodeWithLinks>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeWithLinks {
    #[serde(flatten)]
    pub episode: EpisodeRecord,
    /// Embedded as `episode_links` by the table API.
    #[serde(default, alias = "episode_links", deserialize_with = "vec_or_null")]
    pub links: Vec<LinkWithSubtitles>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkWithSubtitles {
    #[serde(flatten)]
    pub link: LinkRecord,
    #[serde(default, deserialize_with = "vec_or_null")]
    pub subtitles: Vec<SubtitleRecord>,
}

impl AnimeWithDetails {
    /// Orders embedded episodes by number; the backend returns them unordered.
    pub fn sort_episodes(&mut self) {
        self.episodes
            .sort_by_key(|episode| episode.episode.episode_number);
    }

    #[must_use]
    pub fn episode(&self, episode_number: i32) -> Option<&EpisodeWithLinks> {
        self.episodes
            .iter()
            .find(|e| e.episode.episode_number == episode_number)
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.episodes.iter().map(|e| e.links.len()).sum()
    }
}

fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Nullable text columns read as empty strings.
pub(crate) fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnime {
    pub title: String,
    pub description: String,
    pub synopsis: String,
    pub release_year: i32,
    pub episode_count: i32,
    pub studio_name: Option<String>,
    pub rating: f32,
    pub status: AnimeStatus,
    pub thumbnail_url: Option<String>,
    pub added_by: UserId,
    pub genres: Vec<String>,
}

impl NewAnime {
    /// Builds the anime row for `owner`. The synopsis falls back to the
    /// description and the episode count is always the draft's list length.
    #[must_use]
    pub fn from_draft(draft: &AnimeDraft, owner: UserId) -> Self {
        let description = draft.description.trim().to_string();
        let synopsis = non_empty(&draft.synopsis).unwrap_or_else(|| description.clone());

        Self {
            title: draft.title.trim().to_string(),
            description,
            synopsis,
            release_year: draft.release_year,
            episode_count: i32::try_from(draft.episodes.len()).unwrap_or(i32::MAX),
            studio_name: non_empty(&draft.studio_name),
            rating: draft.rating,
            status: draft.status,
            thumbnail_url: non_empty(&draft.thumbnail_url),
            added_by: owner,
            genres: draft.genres.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEpisode {
    pub anime_id: AnimeId,
    pub episode_number: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl NewEpisode {
    #[must_use]
    pub fn from_draft(draft: &EpisodeDraft, anime_id: AnimeId) -> Self {
        Self {
            anime_id,
            episode_number: i32::try_from(draft.episode_number).unwrap_or(i32::MAX),
            title: non_empty(&draft.title),
            description: non_empty(&draft.description),
            duration: non_empty(&draft.duration),
            thumbnail_url: non_empty(&draft.thumbnail_url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLink {
    pub episode_id: EpisodeId,
    pub platform: String,
    pub url: String,
    pub quality: Option<String>,
    pub file_size: Option<String>,
}

impl NewLink {
    #[must_use]
    pub fn from_draft(draft: &LinkDraft, episode_id: EpisodeId) -> Self {
        Self {
            episode_id,
            platform: draft.platform.trim().to_string(),
            url: draft.url.trim().to_string(),
            quality: non_empty(&draft.quality),
            file_size: non_empty(&draft.file_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubtitle {
    pub link_id: LinkId,
    pub language: String,
    pub url: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
}

impl NewSubtitle {
    #[must_use]
    pub fn from_draft(draft: &SubtitleDraft, link_id: LinkId) -> Self {
        Self {
            link_id,
            language: draft.language.trim().to_string(),
            url: non_empty(&draft.url),
            file_path: non_empty(&draft.file_path),
            file_name: non_empty(&draft.file_name),
        }
    }
}

/// Partial update of an anime row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studio_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AnimeStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AnimeUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Self {
            updated_at: None,
            ..self.clone()
        } == Self::default()
    }

    /// Returns a copy stamped with the modification time.
    #[must_use]
    pub fn stamped(mut self, now: DateTime<Utc>) -> Self {
        self.updated_at = Some(now);
        self
    }
}
