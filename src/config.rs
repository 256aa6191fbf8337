//! Configuration management for plexsubsync
//!
//! Settings are layered, later layers winning:
//! 1. built-in defaults
//! 2. optional TOML file (~/.config/plexsubsync/config.toml or `--config`)
//! 3. environment variables (PLEX_URL, PLEX_TOKEN, PLEX_LIBRARY, AUDIO_LANG,
//!    SUB_LANG, MAX_WORKERS)
//! 4. command-line flags
//!
//! The merged [`Config`] is checked once by [`Config::resolve`] and turned
//! into [`Settings`], which is what the rest of the program uses.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cli::Cli;
use crate::processor::StreamPreferences;
use crate::selection::DEFAULT_FORCED_MARKERS;

pub const ENV_URL: &str = "PLEX_URL";
pub const ENV_TOKEN: &str = "PLEX_TOKEN";
pub const ENV_LIBRARY: &str = "PLEX_LIBRARY";
pub const ENV_AUDIO_LANG: &str = "AUDIO_LANG";
pub const ENV_SUB_LANG: &str = "SUB_LANG";
pub const ENV_MAX_WORKERS: &str = "MAX_WORKERS";

const DEFAULT_LIBRARY: &str = "Animes";
const DEFAULT_AUDIO_LANG: &str = "Japanese";
const DEFAULT_SUB_LANG: &str = "French";
const DEFAULT_MAX_WORKERS: usize = 5;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("PLEX_URL environment variable must be set!")]
    MissingUrl,

    #[error("PLEX_TOKEN environment variable must be set!")]
    MissingToken,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("At least one forced subtitle marker is required")]
    NoForcedMarkers,

    #[error("Could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Merged configuration, before validation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plex server URL, e.g. http://127.0.0.1:32400
    pub plex_url: Option<String>,
    /// Plex authentication token
    pub plex_token: Option<String>,
    /// Library section to scan
    pub library: String,
    /// Preferred audio language (Plex display name, e.g. "Japanese")
    pub audio_language: String,
    /// Preferred subtitle language
    pub subtitle_language: String,
    /// Number of shows processed concurrently
    pub max_workers: usize,
    /// Subtitle title substrings that mark forced tracks
    pub forced_markers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plex_url: None,
            plex_token: None,
            library: DEFAULT_LIBRARY.to_string(),
            audio_language: DEFAULT_AUDIO_LANG.to_string(),
            subtitle_language: DEFAULT_SUB_LANG.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
            forced_markers: DEFAULT_FORCED_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Validated settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub plex_url: String,
    pub plex_token: String,
    pub library: String,
    pub max_workers: usize,
    pub preferences: StreamPreferences,
}

impl Config {
    /// Get default config file path (~/.config/plexsubsync/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("plexsubsync").join("config.toml"))
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit config file if given, otherwise the default one if it
    /// exists, otherwise defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Override settings from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Override settings from an environment lookup function
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_URL) {
            self.plex_url = Some(url);
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.plex_token = Some(token);
        }
        if let Some(library) = lookup(ENV_LIBRARY) {
            self.library = library;
        }
        if let Some(lang) = lookup(ENV_AUDIO_LANG) {
            self.audio_language = lang;
        }
        if let Some(lang) = lookup(ENV_SUB_LANG) {
            self.subtitle_language = lang;
        }
        if let Some(workers) = lookup(ENV_MAX_WORKERS) {
            self.max_workers = parse_workers(ENV_MAX_WORKERS, &workers)?;
        }
        Ok(())
    }

    /// Override settings from command-line flags
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref url) = cli.url {
            self.plex_url = Some(url.clone());
        }
        if let Some(ref token) = cli.token {
            self.plex_token = Some(token.clone());
        }
        if let Some(ref library) = cli.library {
            self.library = library.clone();
        }
        if let Some(ref lang) = cli.audio_lang {
            self.audio_language = lang.clone();
        }
        if let Some(ref lang) = cli.sub_lang {
            self.subtitle_language = lang.clone();
        }
        if let Some(workers) = cli.max_workers {
            self.max_workers = workers;
        }
        if !cli.forced_markers.is_empty() {
            self.forced_markers = cli.forced_markers.clone();
        }
    }

    /// Check required values and produce the run settings
    pub fn resolve(self) -> Result<Settings, ConfigError> {
        let plex_url = self
            .plex_url
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;
        let plex_token = self
            .plex_token
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        if self.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_MAX_WORKERS.to_string(),
                value: "0".to_string(),
            });
        }
        if self.forced_markers.is_empty() {
            return Err(ConfigError::NoForcedMarkers);
        }

        Ok(Settings {
            plex_url,
            plex_token,
            library: self.library,
            max_workers: self.max_workers,
            preferences: StreamPreferences {
                audio_language: self.audio_language,
                subtitle_language: self.subtitle_language,
                forced_markers: self.forced_markers,
            },
        })
    }
}

fn parse_workers(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.plex_url.is_none());
        assert!(config.plex_token.is_none());
        assert_eq!(config.library, "Animes");
        assert_eq!(config.audio_language, "Japanese");
        assert_eq!(config.subtitle_language, "French");
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.forced_markers, vec!["forced", "forcé"]);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[
                ("PLEX_URL", "http://10.0.0.2:32400"),
                ("PLEX_TOKEN", "abc"),
                ("PLEX_LIBRARY", "TV"),
                ("AUDIO_LANG", "English"),
                ("SUB_LANG", "Spanish"),
                ("MAX_WORKERS", "12"),
            ]))
            .unwrap();

        let settings = config.resolve().unwrap();
        assert_eq!(settings.plex_url, "http://10.0.0.2:32400");
        assert_eq!(settings.plex_token, "abc");
        assert_eq!(settings.library, "TV");
        assert_eq!(settings.max_workers, 12);
        assert_eq!(settings.preferences.audio_language, "English");
        assert_eq!(settings.preferences.subtitle_language, "Spanish");
    }

    #[test]
    fn test_missing_url_is_fatal() {
        let mut config = Config::default();
        config.apply_env_from(env(&[("PLEX_TOKEN", "abc")])).unwrap();
        let err = config.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingUrl));
        assert_eq!(err.to_string(), "PLEX_URL environment variable must be set!");
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let mut config = Config::default();
        config
            .apply_env_from(env(&[("PLEX_URL", "http://x"), ("PLEX_TOKEN", "")]))
            .unwrap();
        assert!(matches!(config.resolve(), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_bad_max_workers() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(env(&[("MAX_WORKERS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let mut config = Config {
            plex_url: Some("http://x".to_string()),
            plex_token: Some("t".to_string()),
            ..Config::default()
        };
        config.apply_env_from(env(&[("MAX_WORKERS", "0")])).unwrap();
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            plex_url = "http://nas:32400"
            subtitle_language = "English"
            "#,
        )
        .unwrap();
        assert_eq!(config.plex_url.as_deref(), Some("http://nas:32400"));
        assert_eq!(config.subtitle_language, "English");
        assert_eq!(config.library, "Animes");
        assert_eq!(config.max_workers, 5);
    }
}
