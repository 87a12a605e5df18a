//! Domain events for the application.
//!
//! These are the transient notifications raised by the form controller and the
//! catalog service. Front-ends subscribe to them and render toasts.

use serde::Serialize;

/// Severity used when rendering a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    LinkAdded {
        episode_number: u32,
    },
    LinkRemoved {
        episode_number: u32,
    },
    SubtitleAdded {
        episode_number: u32,
    },
    EpisodesAdded {
        count: usize,
    },
    EpisodeRemoved {
        episode_number: u32,
    },
    EpisodeDuplicated {
        source: u32,
        episode_number: u32,
    },
    FieldApplied {
        field: String,
        value: String,
    },
    LinksCleared,

    SubmissionFinished {
        title: String,
        episodes: usize,
        failed_rows: usize,
    },
    CatalogRefreshed {
        count: usize,
    },

    /// Advisory only; the edit that raised it was applied.
    Warning {
        message: String,
    },
    /// The operation was rejected and nothing changed.
    Error {
        message: String,
    },
}

impl NotificationEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::Warning { .. } => NoticeLevel::Warning,
            Self::Error { .. } => NoticeLevel::Error,
            _ => NoticeLevel::Success,
        }
    }

    /// Human readable text for a toast.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::LinkAdded { .. } => "Link added to episode".to_string(),
            Self::LinkRemoved { .. } => "Link removed".to_string(),
            Self::SubtitleAdded { .. } => "Subtitle option added".to_string(),
            Self::EpisodesAdded { count: 1 } => "Episode added".to_string(),
            Self::EpisodesAdded { count } => format!("Added {count} episodes"),
            Self::EpisodeRemoved { .. } => "Removed last episode".to_string(),
            Self::EpisodeDuplicated {
                source,
                episode_number,
            } => format!("Duplicated episode {source} as episode {episode_number}"),
            Self::FieldApplied { field, value } => {
                format!("Set {field} \"{value}\" for all episodes")
            }
            Self::LinksCleared => "Cleared all episode links".to_string(),
            Self::SubmissionFinished {
                title, episodes, ..
            } => format!(
                "Successfully added \"{title}\" with {episodes} episode{}!",
                if *episodes == 1 { "" } else { "s" }
            ),
            Self::CatalogRefreshed { count } => format!("Loaded {count} anime"),
            Self::Warning { message } | Self::Error { message } => message.clone(),
        }
    }
}
