#![allow(dead_code)]

pub mod fake_backend;

use animedash::domain::{AnimeId, EpisodeId, LinkId, SubtitleId, UserId};
use animedash::models::{
    AnimeDraft, AnimeRecord, AnimeUpdate, AnimeWithDetails, EpisodeDraft, EpisodeRecord,
    EpisodeWithLinks, LinkDraft, LinkRecord, LinkWithSubtitles, NewAnime, NewEpisode, NewLink,
    NewSubtitle, Profile, SubtitleDraft, SubtitleRecord,
};
use animedash::store::{CatalogStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Tables {
    anime: Vec<AnimeRecord>,
    episodes: Vec<EpisodeRecord>,
    links: Vec<LinkRecord>,
    subtitles: Vec<SubtitleRecord>,
    profiles: Vec<Profile>,
    clock: i64,
}

impl Tables {
    /// Every write advances the clock so `created_at` ordering is deterministic.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.clock)
    }
}

/// In-memory catalog with injectable failures.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing_episodes: Mutex<HashSet<i32>>,
    failing_platforms: Mutex<HashSet<String>>,
    fail_anime: AtomicBool,
    fail_fetch: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_episode(&self, episode_number: i32) {
        self.failing_episodes.lock().unwrap().insert(episode_number);
    }

    pub fn fail_platform(&self, platform: &str) {
        self.failing_platforms
            .lock()
            .unwrap()
            .insert(platform.to_string());
    }

    pub fn fail_anime_inserts(&self, fail: bool) {
        self.fail_anime.store(fail, Ordering::SeqCst);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn add_profile(&self, id: UserId, email: &str, name: &str) {
        let mut tables = self.tables.lock().unwrap();
        let created_at = tables.tick();
        tables.profiles.push(Profile {
            id,
            email: email.to_string(),
            name: name.to_string(),
            created_at,
            updated_at: None,
        });
    }

    pub fn anime_count(&self) -> usize {
        self.tables.lock().unwrap().anime.len()
    }

    pub fn episode_count(&self) -> usize {
        self.tables.lock().unwrap().episodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.tables.lock().unwrap().links.len()
    }

    pub fn subtitle_count(&self) -> usize {
        self.tables.lock().unwrap().subtitles.len()
    }

    pub fn episode_numbers(&self) -> Vec<i32> {
        self.tables
            .lock()
            .unwrap()
            .episodes
            .iter()
            .map(|e| e.episode_number)
            .collect()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn insert_anime(&self, row: &NewAnime) -> Result<AnimeRecord, StoreError> {
        if self.fail_anime.load(Ordering::SeqCst) {
            return Err(StoreError::backend("new row violates row-level security policy"));
        }
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let record = AnimeRecord {
            id: AnimeId::random(),
            title: row.title.clone(),
            description: row.description.clone(),
            synopsis: row.synopsis.clone(),
            release_year: row.release_year,
            episode_count: row.episode_count,
            studio_id: None,
            studio_name: row.studio_name.clone(),
            rating: row.rating,
            status: row.status,
            thumbnail_url: row.thumbnail_url.clone(),
            created_at: now,
            updated_at: now,
            added_by: row.added_by,
            is_archived: false,
            genres: row.genres.clone(),
        };
        tables.anime.push(record.clone());
        Ok(record)
    }

    async fn insert_episode(&self, row: &NewEpisode) -> Result<EpisodeRecord, StoreError> {
        if self
            .failing_episodes
            .lock()
            .unwrap()
            .contains(&row.episode_number)
        {
            return Err(StoreError::backend("duplicate key value"));
        }
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let record = EpisodeRecord {
            id: EpisodeId::random(),
            anime_id: row.anime_id,
            episode_number: row.episode_number,
            title: row.title.clone(),
            description: row.description.clone(),
            duration: row.duration.clone(),
            thumbnail_url: row.thumbnail_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.episodes.push(record.clone());
        Ok(record)
    }

    async fn insert_link(&self, row: &NewLink) -> Result<LinkRecord, StoreError> {
        if self.failing_platforms.lock().unwrap().contains(&row.platform) {
            return Err(StoreError::backend("link rejected"));
        }
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let record = LinkRecord {
            id: LinkId::random(),
            episode_id: row.episode_id,
            platform: row.platform.clone(),
            url: row.url.clone(),
            quality: row.quality.clone(),
            file_size: row.file_size.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.links.push(record.clone());
        Ok(record)
    }

    async fn insert_subtitle(&self, row: &NewSubtitle) -> Result<SubtitleRecord, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let now = tables.tick();
        let record = SubtitleRecord {
            id: SubtitleId::random(),
            link_id: row.link_id,
            language: row.language.clone(),
            url: row.url.clone(),
            file_path: row.file_path.clone(),
            file_name: row.file_name.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.subtitles.push(record.clone());
        Ok(record)
    }

    async fn fetch_catalog(&self, owner: UserId) -> Result<Vec<AnimeWithDetails>, StoreError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::backend("connection reset"));
        }
        let tables = self.tables.lock().unwrap();

        let mut anime: Vec<&AnimeRecord> = tables
            .anime
            .iter()
            .filter(|a| a.added_by == owner && !a.is_archived)
            .collect();
        anime.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(anime
            .into_iter()
            .map(|record| {
                let mut details = AnimeWithDetails {
                    anime: record.clone(),
                    episodes: tables
                        .episodes
                        .iter()
                        .filter(|e| e.anime_id == record.id)
                        .map(|episode| EpisodeWithLinks {
                            episode: episode.clone(),
                            links: tables
                                .links
                                .iter()
                                .filter(|l| l.episode_id == episode.id)
                                .map(|link| LinkWithSubtitles {
                                    link: link.clone(),
                                    subtitles: tables
                                        .subtitles
                                        .iter()
                                        .filter(|s| s.link_id == link.id)
                                        .cloned()
                                        .collect(),
                                })
                                .collect(),
                        })
                        .collect(),
                };
                details.sort_episodes();
                details
            })
            .collect())
    }

    async fn update_anime(
        &self,
        id: AnimeId,
        owner: UserId,
        patch: &AnimeUpdate,
    ) -> Result<AnimeRecord, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .anime
            .iter_mut()
            .find(|a| a.id == id && a.added_by == owner)
            .ok_or_else(|| StoreError::NotFound(format!("Anime {id}")))?;

        if let Some(title) = &patch.title {
            record.title.clone_from(title);
        }
        if let Some(rating) = patch.rating {
            record.rating = rating;
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(archived) = patch.is_archived {
            record.is_archived = archived;
        }
        if let Some(genres) = &patch.genres {
            record.genres.clone_from(genres);
        }
        if let Some(updated_at) = patch.updated_at {
            record.updated_at = updated_at;
        }
        Ok(record.clone())
    }

    async fn delete_anime(&self, id: AnimeId, owner: UserId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.anime.len();
        tables.anime.retain(|a| !(a.id == id && a.added_by == owner));
        if tables.anime.len() == before {
            return Err(StoreError::NotFound(format!("Anime {id}")));
        }

        let episode_ids: HashSet<EpisodeId> = tables
            .episodes
            .iter()
            .filter(|e| e.anime_id == id)
            .map(|e| e.id)
            .collect();
        tables.episodes.retain(|e| e.anime_id != id);
        let link_ids: HashSet<LinkId> = tables
            .links
            .iter()
            .filter(|l| episode_ids.contains(&l.episode_id))
            .map(|l| l.id)
            .collect();
        tables.links.retain(|l| !episode_ids.contains(&l.episode_id));
        tables.subtitles.retain(|s| !link_ids.contains(&s.link_id));
        Ok(())
    }

    async fn find_episode(
        &self,
        anime_id: AnimeId,
        episode_number: i32,
    ) -> Result<Option<EpisodeRecord>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .episodes
            .iter()
            .find(|e| e.anime_id == anime_id && e.episode_number == episode_number)
            .cloned())
    }

    async fn fetch_profile(&self, id: UserId) -> Result<Profile, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile {id}")))
    }
}

pub fn link(platform: &str, url: &str) -> LinkDraft {
    LinkDraft {
        platform: platform.to_string(),
        url: url.to_string(),
        ..LinkDraft::default()
    }
}

pub fn subtitle(language: &str, url: &str) -> SubtitleDraft {
    SubtitleDraft {
        language: language.to_string(),
        url: url.to_string(),
        ..SubtitleDraft::default()
    }
}

/// A draft that passes submit validation: `episodes` episodes with one link each.
pub fn valid_draft(title: &str, episodes: u32) -> AnimeDraft {
    let mut draft = AnimeDraft {
        title: title.to_string(),
        genres: vec!["Fantasy".to_string()],
        episodes: (1..=episodes)
            .map(|n| EpisodeDraft {
                links: vec![link("WatchDT", &format!("https://watch.example/{n}"))],
                ..EpisodeDraft::numbered(n)
            })
            .collect(),
        ..AnimeDraft::default()
    };
    draft.renumber();
    draft
}
