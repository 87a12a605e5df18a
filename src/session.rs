//! On-disk persistence of the signed-in session between CLI invocations.

use crate::clients::gotrue::Session;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when no session has been saved.
    pub async fn load(&self) -> std::io::Result<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))
    }

    pub async fn save(&self, session: &Session) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, content).await?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    pub async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::gotrue::AuthAccount;

    fn temp_file() -> SessionFile {
        SessionFile::new(
            std::env::temp_dir()
                .join(format!("animedash-session-{}", uuid::Uuid::new_v4()))
                .join("session.json"),
        )
    }

    fn session() -> Session {
        Session {
            access_token: "jwt".into(),
            refresh_token: "refresh".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: Some(1_700_000_000),
            user: AuthAccount {
                id: crate::domain::UserId::random(),
                email: Some("mai@example.com".into()),
                created_at: None,
                user_metadata: serde_json::Value::Null,
            },
        }
    }

    #[tokio::test]
    async fn missing_file_is_no_session() {
        assert!(temp_file().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_load_clear() {
        let file = temp_file();
        let saved = session();
        file.save(&saved).await.unwrap();
        assert_eq!(file.load().await.unwrap(), Some(saved));

        file.clear().await.unwrap();
        assert!(file.load().await.unwrap().is_none());
        file.clear().await.unwrap();

        if let Some(dir) = file.path().parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
