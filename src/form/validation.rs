//! Pre-submit rules and the advisory checks run while a field is edited.

use crate::constants::SUBTITLE_EXTENSIONS;
use crate::models::AnimeDraft;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}:\d{2}$").expect("Invalid regex"))
}

/// First rule a draft breaks, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("At least one genre must be selected")]
    GenreRequired,

    #[error("At least one episode is required")]
    EpisodeRequired,

    #[error("Episodes {} need at least one valid link", join_numbers(.0))]
    EpisodesMissingLinks(Vec<u32>),
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks title, genres, episodes and links, stopping at the first failure.
///
/// # Errors
///
/// Returns the first [`ValidationError`] the draft violates.
pub fn validate_for_submit(draft: &AnimeDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::TitleRequired);
    }

    if draft.genres.is_empty() {
        return Err(ValidationError::GenreRequired);
    }

    if draft.episodes.is_empty() {
        return Err(ValidationError::EpisodeRequired);
    }

    let missing: Vec<u32> = draft
        .episodes
        .iter()
        .filter(|episode| !episode.has_valid_link())
        .map(|episode| episode.episode_number)
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::EpisodesMissingLinks(missing));
    }

    Ok(())
}

/// Advisory check for a url typed into a link or thumbnail field.
///
/// Short values are still being typed, so only values longer than ten
/// characters that neither parse nor start with `http` produce a warning.
#[must_use]
pub fn url_shape_warning(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.is_empty() || url::Url::parse(value).is_ok() {
        return None;
    }
    if value.len() > 10 && !value.starts_with("http") {
        return Some("URL should start with http:// or https://");
    }
    None
}

/// `MM:SS` or `HH:MM`.
#[must_use]
pub fn is_valid_duration(value: &str) -> bool {
    duration_regex().is_match(value)
}

#[must_use]
pub fn has_subtitle_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUBTITLE_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}
