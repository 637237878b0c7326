//! Application configuration
//!
//! Settings are an explicit value handed to the lookup service. Loading and
//! saving is left to the caller (the CLI keeps them in a JSON file).

use crate::extractor::providers::{cobalt, ProviderOptions};
use crate::extractor::traits::ProviderKind;
use crate::utils::error::TubeloaderError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Accepted per-attempt timeout range, in seconds
pub const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=120;

/// One upstream instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub kind: ProviderKind,
    pub base_url: String,
}

impl EndpointConfig {
    pub fn new(kind: ProviderKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Upstream endpoints, tried in order
    pub endpoints: Vec<EndpointConfig>,

    /// Per-endpoint attempt timeout
    pub attempt_timeout_secs: u64,

    /// Quality requested from Cobalt endpoints
    pub cobalt_quality: u32,

    /// URL template for yt-dlp style endpoints
    pub ytdlp_template: Option<String>,

    /// User agent sent to upstream services
    pub user_agent: String,

    /// External page opened when every endpoint fails, `{id}` is replaced
    /// with the video id. Disabled when unset.
    pub redirect_fallback: Option<String>,

    /// Preferred maximum resolution when picking a format
    pub preferred_quality: Option<u32>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            endpoints: vec![
                EndpointConfig::new(ProviderKind::Invidious, "https://inv.nadeko.net"),
                EndpointConfig::new(ProviderKind::Invidious, "https://yewtu.be"),
                EndpointConfig::new(ProviderKind::Piped, "https://pipedapi.kavin.rocks"),
                EndpointConfig::new(ProviderKind::Piped, "https://pipedapi.adminforge.de"),
            ],
            attempt_timeout_secs: 15,
            cobalt_quality: 1080,
            ytdlp_template: None,
            user_agent: concat!("tubeloader/", env!("CARGO_PKG_VERSION")).to_string(),
            redirect_fallback: None,
            preferred_quality: None,
        }
    }
}

impl AppSettings {
    /// Default settings file: `<config dir>/tubeloader/settings.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubeloader")
            .join("settings.json")
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, TubeloaderError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), TubeloaderError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject settings the lookup service cannot work with
    pub fn validate(&self) -> Result<(), TubeloaderError> {
        if self.endpoints.is_empty() {
            return Err(TubeloaderError::Config("no endpoints configured".to_string()));
        }
        for endpoint in &self.endpoints {
            let url = reqwest::Url::parse(endpoint.base_url.trim()).map_err(|e| {
                TubeloaderError::Config(format!("invalid endpoint URL '{}': {}", endpoint.base_url, e))
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(TubeloaderError::Config(format!(
                    "endpoint URL '{}' must use http or https",
                    endpoint.base_url
                )));
            }
        }
        if !TIMEOUT_RANGE_SECS.contains(&self.attempt_timeout_secs) {
            return Err(TubeloaderError::Config(format!(
                "attempt timeout must be between {} and {} seconds",
                TIMEOUT_RANGE_SECS.start(),
                TIMEOUT_RANGE_SECS.end()
            )));
        }
        if !cobalt::SUPPORTED_QUALITIES.contains(&self.cobalt_quality) {
            return Err(TubeloaderError::Config(format!(
                "cobalt quality {} is not one of {:?}",
                self.cobalt_quality,
                cobalt::SUPPORTED_QUALITIES
            )));
        }
        if let Some(template) = &self.redirect_fallback {
            if !template.contains("{id}") {
                return Err(TubeloaderError::Config(
                    "redirect fallback must contain an {id} placeholder".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    pub fn provider_options(&self) -> ProviderOptions {
        let defaults = ProviderOptions::default();
        ProviderOptions {
            cobalt_quality: self.cobalt_quality,
            ytdlp_template: self
                .ytdlp_template
                .clone()
                .unwrap_or(defaults.ytdlp_template),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppSettings::default();
        assert!(!config.endpoints.is_empty());
        assert!(config.redirect_fallback.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config.attempt_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppSettings::default();
        config.endpoints.clear();
        assert!(matches!(config.validate(), Err(TubeloaderError::Config(_))));

        let mut config = AppSettings::default();
        config.endpoints = vec![EndpointConfig::new(ProviderKind::Piped, "ftp://example.org")];
        assert!(config.validate().is_err());

        let mut config = AppSettings::default();
        config.endpoints = vec![EndpointConfig::new(ProviderKind::Piped, "not a url")];
        assert!(config.validate().is_err());

        let mut config = AppSettings::default();
        config.attempt_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppSettings::default();
        config.redirect_fallback = Some("https://redirect.example/watch".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cobalt_quality_must_be_supported() {
        let mut config = AppSettings::default();
        for quality in [0, 1000, 1081, 4000] {
            config.cobalt_quality = quality;
            assert!(
                matches!(config.validate(), Err(TubeloaderError::Config(ref msg)) if msg.contains("cobalt quality")),
                "{} accepted",
                quality
            );
        }
        for quality in [144, 720, 1080, 2160, 4320] {
            config.cobalt_quality = quality;
            assert!(config.validate().is_ok(), "{} rejected", quality);
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.json");

        let mut config = AppSettings::default();
        config.endpoints = vec![EndpointConfig::new(ProviderKind::Cobalt, "https://cobalt.example")];
        config.redirect_fallback = Some("https://redirect.example/{id}".to_string());
        config.save(&path).unwrap();

        assert_eq!(AppSettings::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().expect("temp dir");
        let loaded = AppSettings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, AppSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"attempt_timeout_secs": 8}"#).unwrap();

        let loaded = AppSettings::load(&path).unwrap();
        assert_eq!(loaded.attempt_timeout_secs, 8);
        assert_eq!(loaded.endpoints, AppSettings::default().endpoints);
    }

    #[test]
    fn test_provider_options_use_default_template() {
        let options = AppSettings::default().provider_options();
        assert_eq!(options.ytdlp_template, ProviderOptions::default().ytdlp_template);
        assert_eq!(options.cobalt_quality, 1080);
    }
}
