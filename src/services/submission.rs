//! Nested write pipeline for a validated draft.
//!
//! The anime row is written first and is the only write whose failure aborts
//! the submission. Episodes, links and subtitles are best-effort: each row is
//! attempted once, its outcome recorded, and a failed parent skips its
//! children.

use crate::constants::tables;
use crate::domain::{EpisodeId, LinkId, UserId};
use crate::form::{ValidationError, validate_for_submit};
use crate::models::{
    AnimeDraft, AnimeRecord, EpisodeDraft, LinkDraft, NewAnime, NewEpisode, NewLink, NewSubtitle,
};
use crate::store::{CatalogStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("User not authenticated")]
    AuthRequired,

    #[error("Failed to add anime: {0}")]
    Backend(#[from] StoreError),
}

impl SubmitError {
    /// Text to show the person submitting.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::AuthRequired => {
                "Authentication issue. Please sign out and sign in again.".to_string()
            }
            Self::Backend(err) => format!("Failed to add anime: {err}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The owning episode or link was not inserted.
    ParentFailed,
    /// Missing the fields a persisted row requires.
    Incomplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RowOutcome {
    Inserted,
    Failed(String),
    Skipped(SkipReason),
}

impl RowOutcome {
    const fn label(&self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Failed(_) => "failed",
            Self::Skipped(_) => "skipped",
        }
    }
}

/// Outcome of one nested row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowReport {
    pub table: &'static str,
    pub episode_number: u32,
    pub link_index: Option<usize>,
    pub subtitle_index: Option<usize>,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub anime: AnimeRecord,
    pub rows: Vec<RowReport>,
}

impl SubmissionReport {
    /// True when every nested row was inserted or intentionally skipped as
    /// incomplete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|row| {
            matches!(
                row.outcome,
                RowOutcome::Inserted | RowOutcome::Skipped(SkipReason::Incomplete)
            )
        })
    }

    #[must_use]
    pub fn inserted(&self, table: &str) -> usize {
        count_inserted(&self.rows, table)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowReport> {
        self.rows
            .iter()
            .filter(|row| matches!(row.outcome, RowOutcome::Failed(_)))
    }
}

#[must_use]
pub fn count_inserted(rows: &[RowReport], table: &str) -> usize {
    rows.iter()
        .filter(|row| row.table == table && row.outcome == RowOutcome::Inserted)
        .count()
}

pub struct SubmissionAdapter {
    store: Arc<dyn CatalogStore>,
}

impl SubmissionAdapter {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Validates `draft` and writes it for `owner`.
    ///
    /// # Errors
    ///
    /// Validation failures, a missing identity and a rejected anime row abort
    /// before or at the first write. Nested failures never fail the call;
    /// they are recorded in the returned report.
    pub async fn submit(
        &self,
        draft: &AnimeDraft,
        owner: Option<UserId>,
    ) -> Result<SubmissionReport, SubmitError> {
        validate_for_submit(draft)?;
        let owner = owner.ok_or(SubmitError::AuthRequired)?;

        let anime = self
            .store
            .insert_anime(&NewAnime::from_draft(draft, owner))
            .await
            .inspect_err(|e| error!(error = %e, title = %draft.title, "Failed to insert anime"))?;

        info!(anime_id = %anime.id, title = %anime.title, "Inserted anime");

        let mut episodes: Vec<&EpisodeDraft> = draft.episodes.iter().collect();
        episodes.sort_by_key(|episode| episode.episode_number);

        let mut rows = Vec::new();
        for episode in episodes {
            match self
                .store
                .insert_episode(&NewEpisode::from_draft(episode, anime.id))
                .await
            {
                Ok(record) => {
                    record_row(
                        &mut rows,
                        tables::EPISODES,
                        episode.episode_number,
                        None,
                        None,
                        RowOutcome::Inserted,
                    );
                    rows.extend(
                        self.insert_links(record.id, episode.episode_number, &episode.links)
                            .await,
                    );
                }
                Err(e) => {
                    warn!(
                        anime_id = %anime.id,
                        episode_number = episode.episode_number,
                        error = %e,
                        "Failed to insert episode"
                    );
                    record_row(
                        &mut rows,
                        tables::EPISODES,
                        episode.episode_number,
                        None,
                        None,
                        RowOutcome::Failed(e.to_string()),
                    );
                    for (link_index, link) in episode.links.iter().enumerate() {
                        record_row(
                            &mut rows,
                            tables::EPISODE_LINKS,
                            episode.episode_number,
                            Some(link_index),
                            None,
                            RowOutcome::Skipped(SkipReason::ParentFailed),
                        );
                        for (subtitle_index, _) in link.subtitles.iter().enumerate() {
                            record_row(
                                &mut rows,
                                tables::SUBTITLES,
                                episode.episode_number,
                                Some(link_index),
                                Some(subtitle_index),
                                RowOutcome::Skipped(SkipReason::ParentFailed),
                            );
                        }
                    }
                }
            }
        }

        let report = SubmissionReport { anime, rows };
        let failed = report.failures().count();
        if failed > 0 {
            warn!(anime_id = %report.anime.id, failed, "Submission finished with failed rows");
        }
        Ok(report)
    }

    /// Writes links and their subtitles under an existing episode.
    ///
    /// Returns one report per link and subtitle visited.
    pub async fn insert_links(
        &self,
        episode_id: EpisodeId,
        episode_number: u32,
        links: &[LinkDraft],
    ) -> Vec<RowReport> {
        let mut rows = Vec::new();

        for (link_index, link) in links.iter().enumerate() {
            if !link.is_valid() {
                record_row(
                    &mut rows,
                    tables::EPISODE_LINKS,
                    episode_number,
                    Some(link_index),
                    None,
                    RowOutcome::Skipped(SkipReason::Incomplete),
                );
                continue;
            }

            match self
                .store
                .insert_link(&NewLink::from_draft(link, episode_id))
                .await
            {
                Ok(record) => {
                    record_row(
                        &mut rows,
                        tables::EPISODE_LINKS,
                        episode_number,
                        Some(link_index),
                        None,
                        RowOutcome::Inserted,
                    );
                    self.write_subtitles(&mut rows, record.id, episode_number, link_index, link)
                        .await;
                }
                Err(e) => {
                    warn!(
                        episode_id = %episode_id,
                        episode_number,
                        platform = %link.platform,
                        error = %e,
                        "Failed to insert episode link"
                    );
                    record_row(
                        &mut rows,
                        tables::EPISODE_LINKS,
                        episode_number,
                        Some(link_index),
                        None,
                        RowOutcome::Failed(e.to_string()),
                    );
                    for (subtitle_index, _) in link.subtitles.iter().enumerate() {
                        record_row(
                            &mut rows,
                            tables::SUBTITLES,
                            episode_number,
                            Some(link_index),
                            Some(subtitle_index),
                            RowOutcome::Skipped(SkipReason::ParentFailed),
                        );
                    }
                }
            }
        }

        rows
    }

    async fn write_subtitles(
        &self,
        rows: &mut Vec<RowReport>,
        link_id: LinkId,
        episode_number: u32,
        link_index: usize,
        link: &LinkDraft,
    ) {
        for (subtitle_index, subtitle) in link.subtitles.iter().enumerate() {
            let outcome = if subtitle.is_persistable() {
                match self
                    .store
                    .insert_subtitle(&NewSubtitle::from_draft(subtitle, link_id))
                    .await
                {
                    Ok(_) => RowOutcome::Inserted,
                    Err(e) => {
                        warn!(
                            link_id = %link_id,
                            episode_number,
                            language = %subtitle.language,
                            error = %e,
                            "Failed to insert subtitle"
                        );
                        RowOutcome::Failed(e.to_string())
                    }
                }
            } else {
                RowOutcome::Skipped(SkipReason::Incomplete)
            };

            record_row(
                rows,
                tables::SUBTITLES,
                episode_number,
                Some(link_index),
                Some(subtitle_index),
                outcome,
            );
        }
    }
}

fn record_row(
    rows: &mut Vec<RowReport>,
    table: &'static str,
    episode_number: u32,
    link_index: Option<usize>,
    subtitle_index: Option<usize>,
    outcome: RowOutcome,
) {
    let labels = [("table", table), ("outcome", outcome.label())];
    metrics::counter!("submission_rows_total", &labels).increment(1);

    rows.push(RowReport {
        table,
        episode_number,
        link_index,
        subtitle_index,
        outcome,
    });
}
