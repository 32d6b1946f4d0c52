//! Optional TOML configuration for the upstream source and published feed URLs.
//!
//! The config file is optional — a missing file yields `Config::default()`,
//! which points at the State Department feed and the public feed mirror.
//! Unknown keys are accepted but logged, since they are most likely typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::jsonfeed::FeedSettings;

pub const DEFAULT_SOURCE_URL: &str = "https://travel.state.gov/_res/rss/TAsTWs.xml";
pub const DEFAULT_FEED_URL_TEMPLATE: &str =
    "https://josh.github.io/us-state-travel-advisories-feeds/{slug}.json";
pub const DEFAULT_HOME_PAGE_URL: &str =
    "https://travel.state.gov/content/travel/en/traveladvisories/traveladvisories.html/";
pub const DEFAULT_ICON_URL: &str =
    "https://travel.state.gov/content/dam/tsg-global/tsg_link_img_display.jpg";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid URL for '{key}': {source}")]
    InvalidUrl {
        key: &'static str,
        source: url::ParseError,
    },

    #[error("feed_url_template must contain a {{slug}} placeholder: {0}")]
    MissingSlugPlaceholder(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// RSS document listing every current advisory.
    pub source_url: String,

    /// Public location of each generated feed; `{slug}` is substituted.
    pub feed_url_template: String,

    /// Landing page used as `home_page_url` of the combined feed.
    pub home_page_url: String,

    pub icon_url: String,

    /// Upper bound on the upstream request, in seconds.
    pub fetch_timeout_secs: u64,

    /// Upper bound on the upstream document size, in bytes.
    pub max_document_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            feed_url_template: DEFAULT_FEED_URL_TEMPLATE.to_string(),
            home_page_url: DEFAULT_HOME_PAGE_URL.to_string(),
            icon_url: DEFAULT_ICON_URL.to_string(),
            fetch_timeout_secs: 30,
            max_document_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "source_url",
        "feed_url_template",
        "home_page_url",
        "icon_url",
        "fetch_timeout_secs",
        "max_document_bytes",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Malformed URLs or a template without `{slug}` → validation error
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

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        config.validate()?;
        tracing::info!(source = %config.source_url, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("source_url", &self.source_url),
            ("home_page_url", &self.home_page_url),
            ("icon_url", &self.icon_url),
            ("feed_url_template", &self.feed_url_template),
        ] {
            url::Url::parse(value).map_err(|source| ConfigError::InvalidUrl { key, source })?;
        }
        if !self.feed_url_template.contains("{slug}") {
            return Err(ConfigError::MissingSlugPlaceholder(
                self.feed_url_template.clone(),
            ));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            feed_url_template: self.feed_url_template.clone(),
            home_page_url: self.home_page_url.clone(),
            icon_url: self.icon_url.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source_url, "https://travel.state.gov/_res/rss/TAsTWs.xml");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_document_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_feed_settings() {
        let settings = Config::default().feed_settings();
        assert_eq!(
            settings.feed_url("france"),
            "https://josh.github.io/us-state-travel-advisories-feeds/france.json"
        );
        assert_eq!(settings.home_page_url, DEFAULT_HOME_PAGE_URL);
        assert_eq!(settings.icon_url, DEFAULT_ICON_URL);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/travel_advisories_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = std::env::temp_dir().join("travel_advisories_config_test_whitespace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("travel_advisories_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "feed_url_template = \"https://mirror.example.com/feeds/{slug}.json\"\nfetch_timeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.feed_url_template,
            "https://mirror.example.com/feeds/{slug}.json"
        );
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::from_toml("icon_url = \"https://example.com/i.png\"\ntheme = \"dark\"\n")
            .unwrap();
        assert_eq!(config.icon_url, "https://example.com/i.png");
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let err = Config::from_toml("feed_url_template = \"https://example.com/feed.json\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingSlugPlaceholder(_)));
    }

    #[test]
    fn test_malformed_url_rejected() {
        let err = Config::from_toml("source_url = \"not a url\"\n").unwrap_err();
        match err {
            ConfigError::InvalidUrl { key, .. } => assert_eq!(key, "source_url"),
            e => panic!("Expected InvalidUrl, got {:?}", e),
        }
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("travel_advisories_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
