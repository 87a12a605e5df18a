use super::FormError;
use super::validation::{self, ValidationError};
use crate::constants::{UPLOAD_PREFIX, limits};
use crate::domain::events::NotificationEvent;
use crate::models::draft::episode_number_for;
use crate::models::{
    AnimeDraft, AnimeField, DraftStats, EpisodeDraft, EpisodeField, LinkDraft, LinkField,
    SubtitleDraft, SubtitleField,
};
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_BUFFER: usize = 64;

/// Single owner of an [`AnimeDraft`].
///
/// Mutations take `&mut self`, so a draft has exactly one writer. Each applied
/// mutation bumps [`FormController::version`].
pub struct FormController {
    pub(super) draft: AnimeDraft,
    pub(super) version: u64,
    pub(super) events: broadcast::Sender<NotificationEvent>,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new()
    }
}

impl FormController {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self::with_event_bus(events)
    }

    /// Creates a controller that publishes to an existing notification bus.
    #[must_use]
    pub fn with_event_bus(events: broadcast::Sender<NotificationEvent>) -> Self {
        Self {
            draft: AnimeDraft::default(),
            version: 0,
            events,
        }
    }

    /// Adopts a draft built elsewhere (for example loaded from a file).
    ///
    /// Episodes are renumbered and duplicate genres dropped. Bounds that the
    /// mutation API enforces are checked here as well.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] when the draft exceeds the episode, link or
    /// subtitle caps.
    pub fn from_draft(mut draft: AnimeDraft) -> Result<Self, FormError> {
        if draft.episodes.len() > limits::MAX_EPISODES {
            return Err(FormError::EpisodeCountTooHigh);
        }
        for episode in &draft.episodes {
            if episode.links.len() > limits::MAX_LINKS_PER_EPISODE {
                return Err(FormError::LinkLimit);
            }
            if episode
                .links
                .iter()
                .any(|link| link.subtitles.len() > limits::MAX_SUBTITLES_PER_LINK)
            {
                return Err(FormError::SubtitleLimit);
            }
        }

        let mut seen = Vec::with_capacity(draft.genres.len());
        draft.genres.retain(|genre| {
            if seen.contains(genre) {
                false
            } else {
                seen.push(genre.clone());
                true
            }
        });
        draft.renumber();

        let mut controller = Self::new();
        controller.draft = draft;
        Ok(controller)
    }

    #[must_use]
    pub const fn draft(&self) -> &AnimeDraft {
        &self.draft
    }

    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn stats(&self) -> DraftStats {
        self.draft.stats()
    }

    /// Discards the draft and starts over with a fresh one.
    pub fn reset(&mut self) {
        self.draft = AnimeDraft::default();
        self.touch();
    }

    /// Checks the draft against the submit rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found; a notification is emitted
    /// with the same message.
    pub fn validate_for_submit(&self) -> Result<(), ValidationError> {
        validation::validate_for_submit(&self.draft).inspect_err(|err| {
            self.notify(NotificationEvent::error(err.to_string()));
        })
    }

    pub fn set_field(&mut self, field: AnimeField) {
        match field {
            AnimeField::Title(value) => self.draft.title = value,
            AnimeField::Description(value) => self.draft.description = value,
            AnimeField::Synopsis(value) => self.draft.synopsis = value,
            AnimeField::ThumbnailUrl(value) => {
                self.advise_url(&value);
                self.draft.thumbnail_url = value;
            }
            AnimeField::StudioName(value) => self.draft.studio_name = value,
            AnimeField::Rating(value) => {
                let clamped = if value.is_nan() {
                    limits::MIN_RATING
                } else {
                    value.clamp(limits::MIN_RATING, limits::MAX_RATING)
                };
                if (clamped - value).abs() > f32::EPSILON || value.is_nan() {
                    self.notify(NotificationEvent::warning(format!(
                        "Rating must be between {} and {}; using {clamped}",
                        limits::MIN_RATING,
                        limits::MAX_RATING
                    )));
                }
                self.draft.rating = clamped;
            }
            AnimeField::ReleaseYear(value) => self.draft.release_year = value,
            AnimeField::Status(value) => self.draft.status = value,
        }
        self.touch();
    }

    /// Adds the genre if absent, removes it otherwise.
    pub fn toggle_genre(&mut self, name: &str) {
        if let Some(position) = self.draft.genres.iter().position(|g| g == name) {
            self.draft.genres.remove(position);
        } else {
            self.draft.genres.push(name.to_string());
        }
        self.touch();
    }

    /// Grows or truncates the episode list to exactly `count` entries.
    ///
    /// # Errors
    ///
    /// `count` outside `1..=1000` is rejected and the draft is left unchanged.
    pub fn set_episode_count(&mut self, count: usize) -> Result<(), FormError> {
        if count < limits::MIN_EPISODES {
            return Err(self.reject(FormError::EpisodeCountTooLow));
        }
        if count > limits::MAX_EPISODES {
            return Err(self.reject(FormError::EpisodeCountTooHigh));
        }

        let current = self.draft.episodes.len();
        if count > current {
            self.draft
                .episodes
                .extend((current..count).map(|index| EpisodeDraft::numbered(episode_number_for(index))));
        } else {
            self.draft.episodes.truncate(count);
        }
        self.draft.episode_count = count;
        debug!(from = current, to = count, "Episode count changed");
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] when `index` does not name an episode.
    pub fn update_episode(&mut self, index: usize, field: EpisodeField) -> Result<(), FormError> {
        self.episode_ref(index)?;
        if let EpisodeField::Duration(value) = &field
            && !value.is_empty()
            && !validation::is_valid_duration(value)
        {
            self.notify(NotificationEvent::warning(
                FormError::InvalidDuration.to_string(),
            ));
        }

        let episode = self.episode_mut(index)?;
        match field {
            EpisodeField::Title(value) => episode.title = value,
            EpisodeField::Description(value) => episode.description = value,
            EpisodeField::Duration(value) => episode.duration = value,
            EpisodeField::ThumbnailUrl(value) => episode.thumbnail_url = value,
        }
        self.touch();
        Ok(())
    }

    /// Appends an empty link to an episode.
    ///
    /// # Errors
    ///
    /// [`FormError::LinkLimit`] once the episode holds ten links.
    pub fn add_link(&mut self, episode_index: usize) -> Result<(), FormError> {
        let episode = self.episode_ref(episode_index)?;
        if episode.links.len() >= limits::MAX_LINKS_PER_EPISODE {
            return Err(self.reject(FormError::LinkLimit));
        }
        let episode_number = episode.episode_number;

        self.episode_mut(episode_index)?
            .links
            .push(LinkDraft::default());
        self.notify(NotificationEvent::LinkAdded { episode_number });
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for an unknown episode or link.
    pub fn remove_link(&mut self, episode_index: usize, link_index: usize) -> Result<(), FormError> {
        self.link_mut(episode_index, link_index)?;
        let episode = self.episode_mut(episode_index)?;
        episode.links.remove(link_index);
        let episode_number = episode.episode_number;

        self.notify(NotificationEvent::LinkRemoved { episode_number });
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for an unknown episode or link.
    pub fn update_link(
        &mut self,
        episode_index: usize,
        link_index: usize,
        field: LinkField,
    ) -> Result<(), FormError> {
        self.link_mut(episode_index, link_index)?;
        if let LinkField::Url(value) = &field {
            self.advise_url(value);
        }

        let link = self.link_mut(episode_index, link_index)?;
        match field {
            LinkField::Platform(value) => link.platform = value,
            LinkField::Url(value) => link.url = value,
            LinkField::Quality(value) => link.quality = value,
            LinkField::FileSize(value) => link.file_size = value,
        }
        self.touch();
        Ok(())
    }

    /// Appends an empty subtitle entry to a link.
    ///
    /// # Errors
    ///
    /// [`FormError::SubtitleLimit`] once the link holds five subtitles.
    pub fn add_subtitle(&mut self, episode_index: usize, link_index: usize) -> Result<(), FormError> {
        let full = self.link_mut(episode_index, link_index)?.subtitles.len()
            >= limits::MAX_SUBTITLES_PER_LINK;
        if full {
            return Err(self.reject(FormError::SubtitleLimit));
        }

        self.link_mut(episode_index, link_index)?
            .subtitles
            .push(SubtitleDraft::default());
        let episode_number = self.episode_ref(episode_index)?.episode_number;
        self.notify(NotificationEvent::SubtitleAdded { episode_number });
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for an unknown episode, link or subtitle.
    pub fn update_subtitle(
        &mut self,
        episode_index: usize,
        link_index: usize,
        subtitle_index: usize,
        field: SubtitleField,
    ) -> Result<(), FormError> {
        self.subtitle_mut(episode_index, link_index, subtitle_index)?;
        if let SubtitleField::Url(value) = &field {
            self.advise_url(value);
        }

        let subtitle = self.subtitle_mut(episode_index, link_index, subtitle_index)?;
        match field {
            SubtitleField::Language(value) => subtitle.language = value,
            SubtitleField::Url(value) => subtitle.url = value,
        }
        self.touch();
        Ok(())
    }

    /// Records a locally attached subtitle file, or clears it with `None`.
    ///
    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for an unknown episode, link or subtitle.
    pub fn attach_subtitle_file(
        &mut self,
        episode_index: usize,
        link_index: usize,
        subtitle_index: usize,
        file_name: Option<&str>,
    ) -> Result<(), FormError> {
        self.subtitle_mut(episode_index, link_index, subtitle_index)?;
        if let Some(name) = file_name
            && !validation::has_subtitle_extension(name)
        {
            self.notify(NotificationEvent::warning(format!(
                "'{name}' is not a recognized subtitle file (.srt, .vtt, .ass, .ssa, .sub)"
            )));
        }

        let subtitle = self.subtitle_mut(episode_index, link_index, subtitle_index)?;
        match file_name {
            Some(name) => {
                subtitle.file_path = format!("{UPLOAD_PREFIX}{name}");
                subtitle.file_name = name.to_string();
            }
            None => {
                subtitle.file_path.clear();
                subtitle.file_name.clear();
            }
        }
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for an unknown episode, link or subtitle.
    pub fn remove_subtitle(
        &mut self,
        episode_index: usize,
        link_index: usize,
        subtitle_index: usize,
    ) -> Result<(), FormError> {
        self.subtitle_mut(episode_index, link_index, subtitle_index)?;
        self.link_mut(episode_index, link_index)?
            .subtitles
            .remove(subtitle_index);
        self.touch();
        Ok(())
    }

    pub(super) fn touch(&mut self) {
        self.version += 1;
    }

    pub(super) fn notify(&self, event: NotificationEvent) {
        let _ = self.events.send(event);
    }

    /// Broadcasts the rejection when it is worth showing and hands it back.
    pub(super) fn reject(&self, err: FormError) -> FormError {
        if err.is_user_visible() {
            self.notify(NotificationEvent::error(err.to_string()));
        }
        err
    }

    fn advise_url(&self, value: &str) {
        if let Some(message) = validation::url_shape_warning(value) {
            self.notify(NotificationEvent::warning(message));
        }
    }

    pub(super) fn episode_ref(&self, index: usize) -> Result<&EpisodeDraft, FormError> {
        self.draft
            .episodes
            .get(index)
            .ok_or(FormError::IndexOutOfRange {
                what: "episode",
                index,
            })
    }

    fn episode_mut(&mut self, index: usize) -> Result<&mut EpisodeDraft, FormError> {
        self.draft
            .episodes
            .get_mut(index)
            .ok_or(FormError::IndexOutOfRange {
                what: "episode",
                index,
            })
    }

    fn link_mut(&mut self, episode_index: usize, link_index: usize) -> Result<&mut LinkDraft, FormError> {
        self.episode_mut(episode_index)?
            .links
            .get_mut(link_index)
            .ok_or(FormError::IndexOutOfRange {
                what: "link",
                index: link_index,
            })
    }

    fn subtitle_mut(
        &mut self,
        episode_index: usize,
        link_index: usize,
        subtitle_index: usize,
    ) -> Result<&mut SubtitleDraft, FormError> {
        self.link_mut(episode_index, link_index)?
            .subtitles
            .get_mut(subtitle_index)
            .ok_or(FormError::IndexOutOfRange {
                what: "subtitle",
                index: subtitle_index,
            })
    }
}
