pub mod anime;
pub mod draft;
pub mod user;

pub use anime::{
    AnimeRecord, AnimeUpdate, AnimeWithDetails, EpisodeRecord, EpisodeWithLinks, LinkRecord,
    LinkWithSubtitles, NewAnime, NewEpisode, NewLink, NewSubtitle, SubtitleRecord,
};
pub use draft::{
    AnimeDraft, AnimeField, DraftStats, EpisodeDraft, EpisodeField, LinkDraft, LinkField,
    SubtitleDraft, SubtitleField,
};
pub use user::{AuthUser, Profile};
