//! Unpersisted form state for one anime and its nested episodes, links and
//! subtitles.
//!
//! Draft strings follow form semantics: an empty string means "not set".
//! Conversion to insert payloads turns empty strings into `null`.

use crate::domain::AnimeStatus;
use chrono::Datelike;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimeDraft {
    pub title: String,
    pub description: String,
    pub synopsis: String,
    pub thumbnail_url: String,
    pub studio_name: String,
    pub rating: f32,
    pub release_year: i32,
    pub status: AnimeStatus,
    pub genres: Vec<String>,
    pub episode_count: usize,
    pub episodes: Vec<EpisodeDraft>,
}

impl Default for AnimeDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            synopsis: String::new(),
            thumbnail_url: String::new(),
            studio_name: String::new(),
            rating: 5.0,
            release_year: chrono::Utc::now().year(),
            status: AnimeStatus::Upcoming,
            genres: Vec::new(),
            episode_count: 1,
            episodes: vec![EpisodeDraft::numbered(1)],
        }
    }
}

impl AnimeDraft {
    /// Re-derives `episode_number` (1-based) and `episode_count` from the list.
    pub fn renumber(&mut self) {
        for (index, episode) in self.episodes.iter_mut().enumerate() {
            episode.episode_number = episode_number_for(index);
        }
        self.episode_count = self.episodes.len();
    }

    #[must_use]
    pub fn stats(&self) -> DraftStats {
        DraftStats {
            episodes: self.episodes.len(),
            total_links: self.episodes.iter().map(|e| e.links.len()).sum(),
            episodes_with_links: self.episodes.iter().filter(|e| !e.links.is_empty()).count(),
            total_subtitles: self
                .episodes
                .iter()
                .flat_map(|e| &e.links)
                .map(|l| l.subtitles.len())
                .sum(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeDraft {
    pub episode_number: u32,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub thumbnail_url: String,
    pub links: Vec<LinkDraft>,
}

impl EpisodeDraft {
    #[must_use]
    pub fn numbered(episode_number: u32) -> Self {
        Self {
            episode_number,
            ..Self::default()
        }
    }

    /// True when at least one link has both a platform and a url.
    #[must_use]
    pub fn has_valid_link(&self) -> bool {
        self.links.iter().any(LinkDraft::is_valid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkDraft {
    pub platform: String,
    pub url: String,
    pub quality: String,
    pub file_size: String,
    pub subtitles: Vec<SubtitleDraft>,
}

impl LinkDraft {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.platform.trim().is_empty() && !self.url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleDraft {
    pub language: String,
    pub url: String,
    pub file_path: String,
    pub file_name: String,
}

impl SubtitleDraft {
    /// A subtitle is worth persisting once it has a language and a source.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        !self.language.trim().is_empty()
            && (!self.url.trim().is_empty() || !self.file_path.trim().is_empty())
    }
}

/// Scalar anime field assignment for [`crate::form::FormController::set_field`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnimeField {
    Title(String),
    Description(String),
    Synopsis(String),
    ThumbnailUrl(String),
    StudioName(String),
    Rating(f32),
    ReleaseYear(i32),
    Status(AnimeStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeField {
    Title(String),
    Description(String),
    Duration(String),
    ThumbnailUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkField {
    Platform(String),
    Url(String),
    Quality(String),
    FileSize(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubtitleField {
    Language(String),
    Url(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DraftStats {
    pub episodes: usize,
    pub total_links: usize,
    pub episodes_with_links: usize,
    pub total_subtitles: usize,
}

/// Episode numbers are 1-based positions in the list.
#[must_use]
pub(crate) fn episode_number_for(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
