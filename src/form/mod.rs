//! In-memory editing of an anime draft before it is submitted.
//!
//! [`FormController`] owns the draft and is the only way to mutate it. Every
//! operation either applies fully or leaves the draft untouched and returns a
//! [`FormError`]. Rejections and advisory warnings are also broadcast as
//! [`NotificationEvent`](crate::domain::events::NotificationEvent)s.

pub mod bulk;
pub mod controller;
pub mod validation;

pub use bulk::Confirmation;
pub use controller::FormController;
pub use validation::{ValidationError, validate_for_submit};

use crate::constants::{SUPPORTED_PLATFORMS, limits};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Episode count must be at least {}", limits::MIN_EPISODES)]
    EpisodeCountTooLow,

    #[error("Episode count cannot exceed {}", limits::MAX_EPISODES)]
    EpisodeCountTooHigh,

    #[error("Maximum {} episodes allowed", limits::MAX_EPISODES)]
    EpisodeLimit,

    #[error("Maximum {} links allowed per episode", limits::MAX_LINKS_PER_EPISODE)]
    LinkLimit,

    #[error("Maximum {} subtitles allowed per link", limits::MAX_SUBTITLES_PER_LINK)]
    SubtitleLimit,

    #[error("No {what} at index {index}")]
    IndexOutOfRange { what: &'static str, index: usize },

    #[error("Please enter a valid number")]
    InvalidBulkCount,

    #[error("Cannot add more than {} episodes at once", limits::MAX_EPISODES_PER_BULK_ADD)]
    BulkCountTooLarge,

    #[error("Total episodes cannot exceed {}", limits::MAX_EPISODES)]
    TotalEpisodesExceeded,

    #[error("Cannot remove the last episode")]
    LastEpisode,

    #[error("Duration must be in format MM:SS or HH:MM")]
    InvalidDuration,

    #[error("Platform must be one of: {}", SUPPORTED_PLATFORMS.join(", "))]
    UnsupportedPlatform(String),

    #[error("A value for {0} is required")]
    EmptyValue(&'static str),
}

impl FormError {
    /// Index errors come from stale UI positions and are not worth a toast.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        !matches!(self, Self::IndexOutOfRange { .. } | Self::EmptyValue(_))
    }
}
