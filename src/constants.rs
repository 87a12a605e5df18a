pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "vtt", "ass", "ssa", "sub"];

pub const SUPPORTED_PLATFORMS: &[&str] = &[
    "WatchDT",
    "YouTube",
    "Crunchyroll",
    "Funimation",
    "Netflix",
    "Hulu",
    "Amazon Prime Video",
    "Disney+",
    "HIDIVE",
    "Bilibili",
    "Google Drive",
    "Mega",
    "MediaFire",
    "Direct Link",
    "Other",
];

pub const ANIME_GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Ecchi",
    "Fantasy",
    "Historical",
    "Horror",
    "Isekai",
    "Mecha",
    "Music",
    "Mystery",
    "Psychological",
    "Romance",
    "Sci-Fi",
    "Seinen",
    "Shoujo",
    "Shounen",
    "Slice of Life",
    "Sports",
    "Supernatural",
    "Thriller",
];

pub const SUBTITLE_LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "Portuguese",
    "French",
    "German",
    "Italian",
    "Russian",
    "Arabic",
    "Indonesian",
    "Thai",
    "Vietnamese",
    "Chinese (Simplified)",
    "Chinese (Traditional)",
    "Korean",
    "Japanese",
];

pub mod limits {

    pub const MIN_EPISODES: usize = 1;

    pub const MAX_EPISODES: usize = 1000;

    pub const MAX_LINKS_PER_EPISODE: usize = 10;

    pub const MAX_SUBTITLES_PER_LINK: usize = 5;

    pub const MAX_EPISODES_PER_BULK_ADD: usize = 50;

    pub const MIN_RATING: f32 = 0.0;

    pub const MAX_RATING: f32 = 10.0;
}

pub mod quick_setup {

    pub const PLATFORM: &str = "WatchDT";

    pub const QUALITY: &str = "1080p";

    pub const DURATION: &str = "24:00";
}

pub mod tables {

    pub const ANIME: &str = "anime";

    pub const EPISODES: &str = "episodes";

    pub const EPISODE_LINKS: &str = "episode_links";

    pub const SUBTITLES: &str = "subtitles";

    pub const PROFILES: &str = "profiles";
}

/// Nested selection used by the catalog read model.
pub const CATALOG_SELECT: &str = "*,episodes(*,episode_links(*,subtitles(*)))";

/// Prefix the dashboard used for locally attached subtitle files.
pub const UPLOAD_PREFIX: &str = "uploads/";

#[must_use]
pub fn is_supported_platform(name: &str) -> bool {
    SUPPORTED_PLATFORMS.contains(&name)
}
