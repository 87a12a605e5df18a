use crate::domain::UserId;
use crate::models::anime::string_or_null;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default, deserialize_with = "string_or_null")]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The acting identity exposed to the rest of the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Profile> for AuthUser {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            created_at: profile.created_at,
        }
    }
}

/// Default display name for a new account: the local part of the email.
#[must_use]
pub fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_email_local_part() {
        assert_eq!(default_display_name("mai@example.com"), "mai");
        assert_eq!(default_display_name("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn profile_with_null_name_decodes() {
        let profile: Profile = serde_json::from_str(
            r#"{
                "id": "3f1f6a0e-8c1b-4c7a-9a51-6d0f2f9b7c11",
                "email": "mai@example.com",
                "name": null,
                "created_at": "2024-05-01T12:00:00+00:00",
                "updated_at": null
            }"#,
        )
        .unwrap();

        assert_eq!(profile.name, "");
        assert_eq!(profile.updated_at, None);
    }
}
