//! Configuration file parser for ~/.config/category-banner/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`,
//! which has no forum URL and no programs. Unknown keys are accepted but
//! logged as warnings.
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::program::SubscriptionProgramConfig;

/// Environment variable that overrides `discourse.api_key`.
pub const API_KEY_ENV: &str = "DISCOURSE_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period after a navigation before the banner is evaluated.
    pub evaluation_delay_ms: u64,

    /// How long a confirmation or failure message stays up.
    pub dismiss_after_secs: u64,

    pub discourse: DiscourseSettings,

    /// The four category lists, under `[programs]`.
    pub programs: SubscriptionProgramConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            evaluation_delay_ms: 250,
            dismiss_after_secs: 5,
            discourse: DiscourseSettings::default(),
            programs: SubscriptionProgramConfig::default(),
        }
    }
}

/// Where the forum lives and who to act as.
///
/// Debug masks `api_key` so it never reaches logs.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiscourseSettings {
    pub base_url: Option<String>,
    pub api_username: Option<String>,
    /// Alternative to the DISCOURSE_API_KEY env var, which takes precedence.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for DiscourseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscourseSettings")
            .field("base_url", &self.base_url)
            .field("api_username", &self.api_username)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: &'static [&'static str] = &[
        "evaluation_delay_ms",
        "dismiss_after_secs",
        "discourse",
        "programs",
    ];
    const KNOWN_DISCOURSE_KEYS: &'static [&'static str] = &["base_url", "api_username", "api_key"];
    const KNOWN_PROGRAM_KEYS: &'static [&'static str] = &[
        "subscribe_categories",
        "watching_categories",
        "subscribe_category_name_only_exceptions",
        "watching_category_name_only_exceptions",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing, empty or whitespace-only file → `Ok(Config::default())`
    /// - Invalid TOML or wrong value types → `Err(ConfigError::Parse)`
    /// - Files over 1 MB → `Err(ConfigError::TooLarge)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            base_url = config.discourse.base_url.as_deref().unwrap_or("<unset>"),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            warn_unknown_keys(&raw, Self::KNOWN_KEYS, "");
            if let Some(toml::Value::Table(section)) = raw.get("discourse") {
                warn_unknown_keys(section, Self::KNOWN_DISCOURSE_KEYS, "discourse.");
            }
            if let Some(toml::Value::Table(section)) = raw.get("programs") {
                warn_unknown_keys(section, Self::KNOWN_PROGRAM_KEYS, "programs.");
            }
        }

        Ok(toml::from_str(content)?)
    }

    pub fn evaluation_delay(&self) -> Duration {
        Duration::from_millis(self.evaluation_delay_ms)
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_secs(self.dismiss_after_secs)
    }

    /// Shared, read-only program configuration for the banner controller.
    pub fn program_config(&self) -> Arc<SubscriptionProgramConfig> {
        Arc::new(self.programs.clone())
    }

    /// The API key from DISCOURSE_API_KEY, falling back to the config file.
    pub fn api_key(&self) -> Option<SecretString> {
        let from_env = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty());
        from_env
            .or_else(|| self.discourse.api_key.clone())
            .map(SecretString::from)
    }
}

fn warn_unknown_keys(table: &toml::Table, known: &[&str], prefix: &str) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            tracing::warn!(key = %format!("{}{}", prefix, key), "Unknown key in config file, ignoring");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("category_banner_config_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.evaluation_delay(), Duration::from_millis(250));
        assert_eq!(config.dismiss_after(), Duration::from_secs(5));
        assert!(config.discourse.base_url.is_none());
        assert!(config.programs.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/category_banner_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.dismiss_after_secs, 5);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.evaluation_delay_ms, 250);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
evaluation_delay_ms = 100
dismiss_after_secs = 3

[discourse]
base_url = "https://forum.example.com"
api_username = "system"
api_key = "test-key-123"

[programs]
subscribe_categories = "161|5"
watching_categories = [5, "7"]
subscribe_category_name_only_exceptions = "161"
"#;
        let path = write_config("full", content);
        let config = Config::load(&path).unwrap();

        assert_eq!(config.evaluation_delay(), Duration::from_millis(100));
        assert_eq!(config.dismiss_after(), Duration::from_secs(3));
        assert_eq!(
            config.discourse.base_url.as_deref(),
            Some("https://forum.example.com")
        );
        assert_eq!(config.discourse.api_username.as_deref(), Some("system"));
        assert!(config.programs.offers_subscribe(161));
        assert!(config.programs.offers_subscribe(5));
        assert!(config.programs.offers_watching(7));
        assert!(config.programs.is_subscribe_name_only(161));
        assert!(!config.programs.is_watching_name_only(161));
        assert!(!config.programs.is_subscribe_name_only(5));
        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("dismiss_after_secs = \"soon\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
dismiss_after_secs = 2
totally_fake_key = "should not fail"

[programs]
subscribe_categroies = "1"
"#;
        let config = Config::parse(content).unwrap();
        assert_eq!(config.dismiss_after_secs, 2);
        assert!(config.programs.is_empty());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        cleanup(&path);
    }

    #[test]
    fn test_debug_masks_api_key() {
        let mut config = Config::default();
        config.discourse.api_key = Some("super-secret-key-12345".to_string());

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-key-12345"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_program_config_is_shared_copy() {
        let config = Config::parse("[programs]\nwatching_categories = \"9\"\n").unwrap();
        let programs = config.program_config();
        assert!(programs.offers_watching(9));
        assert_eq!(*programs, config.programs);
    }
}
