//! Whole-draft episode operations: appending, templated setup, duplication and
//! applying one value to every episode.

use super::controller::FormController;
use super::{FormError, validation};
use crate::constants::{self, limits, quick_setup};
use crate::domain::events::NotificationEvent;
use crate::models::draft::episode_number_for;
use crate::models::{EpisodeDraft, LinkDraft};
use tracing::debug;

/// Explicit acknowledgement for destructive bulk operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl FormController {
    /// # Errors
    ///
    /// [`FormError::EpisodeLimit`] once the draft holds 1000 episodes.
    pub fn append_episode(&mut self) -> Result<(), FormError> {
        if self.draft.episodes.len() >= limits::MAX_EPISODES {
            return Err(self.reject(FormError::EpisodeLimit));
        }

        let number = episode_number_for(self.draft.episodes.len());
        self.draft.episodes.push(EpisodeDraft::numbered(number));
        self.finish_append(1);
        Ok(())
    }

    /// Appends `count` empty episodes.
    ///
    /// # Errors
    ///
    /// Rejects a zero count, more than 50 at once, or a total above 1000.
    pub fn append_episodes(&mut self, count: usize) -> Result<(), FormError> {
        self.check_bulk_count(count)?;
        self.push_episodes(count, EpisodeDraft::numbered);
        self.finish_append(count);
        Ok(())
    }

    /// Appends `count` episodes prefilled with the quick-setup template.
    ///
    /// # Errors
    ///
    /// Same bounds as [`FormController::append_episodes`].
    pub fn quick_setup(&mut self, count: usize) -> Result<(), FormError> {
        self.check_bulk_count(count)?;
        self.push_episodes(count, |number| EpisodeDraft {
            title: format!("Episode {number}"),
            duration: quick_setup::DURATION.to_string(),
            links: vec![LinkDraft {
                platform: quick_setup::PLATFORM.to_string(),
                quality: quick_setup::QUALITY.to_string(),
                ..LinkDraft::default()
            }],
            ..EpisodeDraft::numbered(number)
        });
        self.finish_append(count);
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::LastEpisode`] when only one episode is left.
    pub fn remove_last_episode(&mut self) -> Result<(), FormError> {
        if self.draft.episodes.len() <= limits::MIN_EPISODES {
            return Err(self.reject(FormError::LastEpisode));
        }

        if let Some(removed) = self.draft.episodes.pop() {
            self.draft.episode_count = self.draft.episodes.len();
            self.notify(NotificationEvent::EpisodeRemoved {
                episode_number: removed.episode_number,
            });
            self.touch();
        }
        Ok(())
    }

    /// Copies an episode to the end of the list with every link url cleared.
    ///
    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for an unknown source and
    /// [`FormError::EpisodeLimit`] when the draft is full.
    pub fn duplicate_episode(&mut self, source_index: usize) -> Result<(), FormError> {
        let source = self.episode_ref(source_index)?.clone();
        if self.draft.episodes.len() >= limits::MAX_EPISODES {
            return Err(self.reject(FormError::EpisodeLimit));
        }

        let number = episode_number_for(self.draft.episodes.len());
        let title = if source.title.is_empty() {
            String::new()
        } else {
            format!("{} (Copy)", source.title)
        };
        let links = source
            .links
            .into_iter()
            .map(|link| LinkDraft {
                url: String::new(),
                ..link
            })
            .collect();

        self.draft.episodes.push(EpisodeDraft {
            episode_number: number,
            title,
            links,
            ..source
        });
        self.draft.episode_count = self.draft.episodes.len();
        self.notify(NotificationEvent::EpisodeDuplicated {
            source: source.episode_number,
            episode_number: number,
        });
        self.touch();
        Ok(())
    }

    /// # Errors
    ///
    /// [`FormError::InvalidDuration`] unless `duration` is `MM:SS` or `HH:MM`.
    pub fn set_all_durations(&mut self, duration: &str) -> Result<(), FormError> {
        let duration = duration.trim();
        if !validation::is_valid_duration(duration) {
            return Err(self.reject(FormError::InvalidDuration));
        }

        for episode in &mut self.draft.episodes {
            episode.duration = duration.to_string();
        }
        self.finish_apply("duration", duration);
        Ok(())
    }

    /// Sets the quality of every link. Episodes without links get one.
    ///
    /// # Errors
    ///
    /// [`FormError::EmptyValue`] for a blank quality.
    pub fn set_all_quality(&mut self, quality: &str) -> Result<(), FormError> {
        let quality = quality.trim();
        if quality.is_empty() {
            return Err(self.reject(FormError::EmptyValue("quality")));
        }

        self.apply_to_links(|link| link.quality = quality.to_string());
        self.finish_apply("quality", quality);
        Ok(())
    }

    /// Sets the platform of every link. Episodes without links get one.
    ///
    /// # Errors
    ///
    /// [`FormError::UnsupportedPlatform`] when `platform` is not in the
    /// supported list; nothing is changed.
    pub fn set_all_platform(&mut self, platform: &str) -> Result<(), FormError> {
        let platform = platform.trim();
        if platform.is_empty() {
            return Err(self.reject(FormError::EmptyValue("platform")));
        }
        if !constants::is_supported_platform(platform) {
            return Err(self.reject(FormError::UnsupportedPlatform(platform.to_string())));
        }

        self.apply_to_links(|link| link.platform = platform.to_string());
        self.finish_apply("platform", platform);
        Ok(())
    }

    /// Removes every link from every episode. Returns whether anything ran.
    pub fn clear_all_links(&mut self, confirmation: Confirmation) -> bool {
        if confirmation == Confirmation::Declined {
            return false;
        }

        for episode in &mut self.draft.episodes {
            episode.links.clear();
        }
        self.notify(NotificationEvent::LinksCleared);
        self.touch();
        true
    }

    fn check_bulk_count(&self, count: usize) -> Result<(), FormError> {
        if count == 0 {
            return Err(self.reject(FormError::InvalidBulkCount));
        }
        if count > limits::MAX_EPISODES_PER_BULK_ADD {
            return Err(self.reject(FormError::BulkCountTooLarge));
        }
        if self.draft.episodes.len() + count > limits::MAX_EPISODES {
            return Err(self.reject(FormError::TotalEpisodesExceeded));
        }
        Ok(())
    }

    fn push_episodes(&mut self, count: usize, make: impl Fn(u32) -> EpisodeDraft) {
        let start = self.draft.episodes.len();
        self.draft
            .episodes
            .extend((start..start + count).map(|index| make(episode_number_for(index))));
    }

    fn finish_append(&mut self, count: usize) {
        self.draft.episode_count = self.draft.episodes.len();
        debug!(added = count, total = self.draft.episode_count, "Episodes appended");
        self.notify(NotificationEvent::EpisodesAdded { count });
        self.touch();
    }

    fn apply_to_links(&mut self, apply: impl Fn(&mut LinkDraft)) {
        for episode in &mut self.draft.episodes {
            if episode.links.is_empty() {
                episode.links.push(LinkDraft::default());
            }
            episode.links.iter_mut().for_each(&apply);
        }
    }

    fn finish_apply(&mut self, field: &str, value: &str) {
        self.notify(NotificationEvent::FieldApplied {
            field: field.to_string(),
            value: value.to_string(),
        });
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkField;

    fn numbers(form: &FormController) -> Vec<u32> {
        form.draft().episodes.iter().map(|e| e.episode_number).collect()
    }

    fn assert_sequential(form: &FormController) {
        let expected: Vec<u32> = (1..=u32::try_from(form.draft().episodes.len()).unwrap()).collect();
        assert_eq!(numbers(form), expected);
        assert_eq!(form.draft().episode_count, form.draft().episodes.len());
    }

    #[test]
    fn append_episodes_continues_numbering() {
        let mut form = FormController::new();
        form.set_episode_count(3).unwrap();
        form.append_episodes(5).unwrap();
        assert_eq!(numbers(&form), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_sequential(&form);
    }

    #[test]
    fn append_episodes_bounds() {
        let mut form = FormController::new();
        assert_eq!(form.append_episodes(0), Err(FormError::InvalidBulkCount));
        assert_eq!(form.append_episodes(51), Err(FormError::BulkCountTooLarge));

        form.set_episode_count(990).unwrap();
        assert_eq!(
            form.append_episodes(11),
            Err(FormError::TotalEpisodesExceeded)
        );
        assert_eq!(form.draft().episodes.len(), 990);

        form.append_episodes(10).unwrap();
        assert_eq!(form.append_episode(), Err(FormError::EpisodeLimit));
        assert_eq!(form.draft().episodes.len(), 1000);
    }

    #[test]
    fn quick_setup_uses_template() {
        let mut form = FormController::new();
        form.quick_setup(2).unwrap();
        let third = &form.draft().episodes[2];
        assert_eq!(third.episode_number, 3);
        assert_eq!(third.title, "Episode 3");
        assert_eq!(third.duration, "24:00");
        assert_eq!(third.links.len(), 1);
        assert_eq!(third.links[0].platform, "WatchDT");
        assert_eq!(third.links[0].quality, "1080p");
        assert!(third.links[0].url.is_empty());
        assert!(form.draft().episodes[0].title.is_empty());
        assert_sequential(&form);
    }

    #[test]
    fn remove_last_keeps_one_episode() {
        let mut form = FormController::new();
        form.append_episode().unwrap();
        form.remove_last_episode().unwrap();
        assert_eq!(form.draft().episodes.len(), 1);
        assert_eq!(form.remove_last_episode(), Err(FormError::LastEpisode));
        assert_sequential(&form);
    }

    #[test]
    fn duplicate_copies_links_without_urls() {
        let mut form = FormController::new();
        form.update_episode(0, crate::models::EpisodeField::Title("Pilot".into()))
            .unwrap();
        form.add_link(0).unwrap();
        form.update_link(0, 0, LinkField::Platform("Mega".into()))
            .unwrap();
        form.update_link(0, 0, LinkField::Quality("720p".into()))
            .unwrap();
        form.update_link(0, 0, LinkField::Url("https://mega.example/1".into()))
            .unwrap();

        form.duplicate_episode(0).unwrap();
        let copy = &form.draft().episodes[1];
        assert_eq!(copy.episode_number, 2);
        assert_eq!(copy.title, "Pilot (Copy)");
        assert_eq!(copy.links[0].platform, "Mega");
        assert_eq!(copy.links[0].quality, "720p");
        assert!(copy.links[0].url.is_empty());
        assert_eq!(
            form.draft().episodes[0].links[0].url,
            "https://mega.example/1"
        );
        assert_sequential(&form);
    }

    #[test]
    fn duplicate_untitled_episode_stays_untitled() {
        let mut form = FormController::new();
        form.duplicate_episode(0).unwrap();
        assert!(form.draft().episodes[1].title.is_empty());
        assert!(form.duplicate_episode(5).is_err());
    }

    #[test]
    fn set_all_durations_rejects_bad_format() {
        let mut form = FormController::new();
        form.append_episodes(2).unwrap();
        let version = form.version();
        assert_eq!(form.set_all_durations("24m"), Err(FormError::InvalidDuration));
        assert_eq!(form.version(), version);

        form.set_all_durations("23:40").unwrap();
        assert!(form.draft().episodes.iter().all(|e| e.duration == "23:40"));
    }

    #[test]
    fn set_all_quality_synthesizes_missing_links() {
        let mut form = FormController::new();
        form.append_episode().unwrap();
        form.add_link(0).unwrap();
        form.add_link(0).unwrap();

        form.set_all_quality("720p").unwrap();
        let draft = form.draft();
        assert_eq!(draft.episodes[0].links.len(), 2);
        assert_eq!(draft.episodes[1].links.len(), 1);
        assert!(
            draft
                .episodes
                .iter()
                .flat_map(|e| &e.links)
                .all(|l| l.quality == "720p")
        );
    }

    #[test]
    fn unsupported_platform_is_rejected_without_mutation() {
        let mut form = FormController::new();
        let before = form.draft().clone();
        let mut rx = form.subscribe();

        assert_eq!(
            form.set_all_platform("Napster"),
            Err(FormError::UnsupportedPlatform("Napster".into()))
        );
        assert_eq!(form.draft(), &before);
        assert!(rx.try_recv().is_ok());

        form.set_all_platform("Crunchyroll").unwrap();
        assert_eq!(form.draft().episodes[0].links[0].platform, "Crunchyroll");
    }

    #[test]
    fn clear_all_links_needs_confirmation() {
        let mut form = FormController::new();
        form.quick_setup(3).unwrap();

        assert!(!form.clear_all_links(Confirmation::Declined));
        assert_eq!(form.stats().total_links, 3);

        assert!(form.clear_all_links(Confirmation::Confirmed));
        assert_eq!(form.stats().total_links, 0);
        assert_eq!(form.draft().episodes.len(), 4);
    }

    #[test]
    fn bulk_operations_notify() {
        let mut form = FormController::new();
        let mut rx = form.subscribe();
        form.append_episodes(3).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            NotificationEvent::EpisodesAdded { count: 3 }
        );
    }
}
