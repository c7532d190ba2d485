/// Host configuration
use crate::error::{ConfigError, Result};
use nowplaying_client::LoaderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when no `--config` is given, if present
pub const DEFAULT_CONFIG_FILE: &str = "nowplaying.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Backend address; resolved from the environment or page origin when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Origin of the page embedding the player, used for address resolution
    #[serde(default)]
    pub page_origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub shuffle: bool,

    /// Length of every simulated track
    #[serde(default = "default_simulated_track_secs")]
    pub simulated_track_secs: u64,

    /// Interval between simulated position updates
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise [`DEFAULT_CONFIG_FILE`] is read
    /// if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, Self::environment())
    }

    /// Environment source (`NOWPLAYING_PLAYBACK__SHUFFLE=true`, ...)
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("NOWPLAYING")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Load configuration from file and the given environment source
    pub fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables
        settings = settings.add_source(environment);

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Apply command-line overrides
    pub fn apply_overrides(&mut self, base_url: Option<String>, shuffle: bool) {
        if let Some(base_url) = base_url {
            self.backend.base_url = Some(base_url);
        }
        if shuffle {
            self.playback.shuffle = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.backend.base_url {
            if !is_http_url(base_url) {
                return Err(ConfigError::Invalid(format!(
                    "backend.base_url must start with http:// or https:// (got {:?})",
                    base_url
                )));
            }
        }

        if let Some(origin) = &self.backend.page_origin {
            if !is_http_url(origin) {
                return Err(ConfigError::Invalid(format!(
                    "backend.page_origin must start with http:// or https:// (got {:?})",
                    origin
                )));
            }
        }

        if self.playback.simulated_track_secs == 0 {
            return Err(ConfigError::Invalid(
                "playback.simulated_track_secs must be greater than zero".to_string(),
            ));
        }

        if self.playback.tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "playback.tick_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Loader configuration, falling back to the loader's own environment
    /// variables when no backend address is configured here
    pub fn loader_config(&self) -> LoaderConfig {
        let base_url = self
            .backend
            .base_url
            .clone()
            .or_else(|| LoaderConfig::from_env().base_url);

        LoaderConfig {
            base_url,
            page_location: self.backend.page_origin.clone(),
        }
    }

    pub fn simulated_track_length(&self) -> Duration {
        Duration::from_secs(self.playback.simulated_track_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.playback.tick_ms)
    }
}

fn is_http_url(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// Default values
fn default_simulated_track_secs() -> u64 {
    30
}

fn default_tick_ms() -> u64 {
    250
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            simulated_track_secs: default_simulated_track_secs(),
            tick_ms: default_tick_ms(),
        }
    }
}
