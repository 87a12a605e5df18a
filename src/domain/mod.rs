//! Domain types for the catalog with strong typing.
//!
//! Row identifiers issued by the backend are UUIDs. Each table gets its own
//! newtype so an `EpisodeId` can never be passed where a `LinkId` is expected.

pub mod events;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub const fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generates a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn value(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a row in the `anime` table.
    AnimeId
);
uuid_id!(
    /// Identifier of a row in the `episodes` table.
    EpisodeId
);
uuid_id!(
    /// Identifier of a row in the `episode_links` table.
    LinkId
);
uuid_id!(
    /// Identifier of a row in the `subtitles` table.
    SubtitleId
);
uuid_id!(
    /// Identifier of an authenticated user; doubles as the `profiles` key.
    UserId
);

/// Airing status of an anime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimeStatus {
    Ongoing,
    Completed,
    #[default]
    Upcoming,
}

impl AnimeStatus {
    pub const ALL: &[AnimeStatus] = &[Self::Ongoing, Self::Completed, Self::Upcoming];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for AnimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "upcoming" => Ok(Self::Upcoming),
            other => Err(format!(
                "unknown status '{other}', expected one of: ongoing, completed, upcoming"
            )),
        }
    }
}

/// Sort order enumeration to replace boolean blindness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub const fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    /// Suffix used by the table API's `order=` parameter.
    #[must_use]
    pub const fn as_query_suffix(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_and_display_round_trip() {
        let raw = "6f1c2a4e-3a0b-4c57-9d0e-2b6c1f6a9e10";
        let id: AnimeId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert!("not-a-uuid".parse::<EpisodeId>().is_err());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = LinkId::random();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Ongoing".parse::<AnimeStatus>(), Ok(AnimeStatus::Ongoing));
        assert_eq!(" completed ".parse::<AnimeStatus>(), Ok(AnimeStatus::Completed));
        assert!("airing".parse::<AnimeStatus>().is_err());
        assert_eq!(AnimeStatus::default(), AnimeStatus::Upcoming);
    }

    #[test]
    fn status_uses_lowercase_wire_format() {
        let json = serde_json::to_string(&AnimeStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn sort_order_suffix() {
        assert_eq!(SortOrder::Descending.as_query_suffix(), "desc");
        assert!(SortOrder::default().is_ascending());
    }
}
