use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR: &str = "animedash";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub backend: BackendConfig,

    pub session: SessionConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    pub log_format: LogFormat,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            worker_threads: 2,
        }
    }
}

/// Connection settings for the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project url, e.g. `https://xyzcompany.supabase.co`
    pub url: String,

    /// Public anonymous key sent as `apikey` on every request.
    pub anon_key: String,

    pub request_timeout_seconds: u64,

    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_seconds: 30,
            user_agent: format!("animedash/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the signed-in session is persisted. Empty means the default
    /// location under the user's data directory.
    pub path: String,
}

impl SessionConfig {
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        if !self.path.is_empty() {
            return PathBuf::from(&self.path);
        }
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("session.json")
    }
}

impl Config {
    /// Loads the first config file found, then applies `.env` and process
    /// environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment values win over the file. The app-specific names are
    /// checked before the conventional `SUPABASE_*` ones.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(key))
                .filter(|value| !value.trim().is_empty())
        };

        if let Some(url) = first(&["ANIMEDASH_BACKEND_URL", "SUPABASE_URL"]) {
            self.backend.url = url;
        }
        if let Some(key) = first(&["ANIMEDASH_BACKEND_ANON_KEY", "SUPABASE_ANON_KEY"]) {
            self.backend.anon_key = key;
        }
        if let Some(level) = first(&["ANIMEDASH_LOG_LEVEL"]) {
            self.general.log_level = level;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(APP_DIR).join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_DIR}")).join("config.toml"));
        }

        paths
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            anyhow::bail!(
                "Backend URL is not set (backend.url, ANIMEDASH_BACKEND_URL or SUPABASE_URL)"
            );
        }

        url::Url::parse(&self.backend.url)
            .with_context(|| format!("Invalid backend URL: {}", self.backend.url))?;

        if self.backend.anon_key.trim().is_empty() {
            anyhow::bail!(
                "Backend anon key is not set (backend.anon_key, ANIMEDASH_BACKEND_ANON_KEY or SUPABASE_ANON_KEY)"
            );
        }

        if self.backend.request_timeout_seconds == 0 {
            anyhow::bail!("backend.request_timeout_seconds must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn configured() -> Config {
        let mut config = Config::default();
        config.backend.url = "https://demo.supabase.co".to_string();
        config.backend.anon_key = "anon".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, LogFormat::Pretty);
        assert_eq!(config.general.worker_threads, 2);
        assert_eq!(config.backend.request_timeout_seconds, 30);
        assert!(config.backend.url.is_empty());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[session]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"
            log_format = "json"

            [backend]
            url = "https://demo.supabase.co"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, LogFormat::Json);
        assert_eq!(config.backend.url, "https://demo.supabase.co");

        assert_eq!(config.backend.request_timeout_seconds, 30);
    }

    #[test]
    fn env_overrides_prefer_app_names() {
        let env: HashMap<&str, &str> = [
            ("ANIMEDASH_BACKEND_URL", "https://app.example"),
            ("SUPABASE_URL", "https://fallback.example"),
            ("SUPABASE_ANON_KEY", "from-supabase"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        assert_eq!(config.backend.url, "https://app.example");
        assert_eq!(config.backend.anon_key, "from-supabase");
    }

    #[test]
    fn validate_requires_url_and_key() {
        assert!(configured().validate().is_ok());

        let mut missing_url = configured();
        missing_url.backend.url.clear();
        assert!(missing_url.validate().is_err());

        let mut missing_key = configured();
        missing_key.backend.anon_key = "  ".to_string();
        assert!(missing_key.validate().is_err());

        let mut bad_url = configured();
        bad_url.backend.url = "not a url".to_string();
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("animedash-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        configured().save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.backend.anon_key, "anon");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn explicit_session_path_wins() {
        let config = SessionConfig {
            path: "/tmp/animedash-session.json".to_string(),
        };
        assert_eq!(
            config.resolved_path(),
            PathBuf::from("/tmp/animedash-session.json")
        );
        assert!(
            SessionConfig::default()
                .resolved_path()
                .ends_with("animedash/session.json")
        );
    }
}
