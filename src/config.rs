//! Home Intent Configuration
//!
//! Handles parsing of `home_intent.toml` settings files and resolution of
//! per-component configuration tables.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name searched for by [`Settings::find_and_load`].
pub const SETTINGS_FILE: &str = "home_intent.toml";

/// Environment variable overriding `rhasspy.url`.
pub const RHASSPY_URL_ENV: &str = "HOME_INTENT_RHASSPY_URL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration for component '{component}': {message}")]
    Component { component: String, message: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching home_intent.toml.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Engine-wide switches
    #[serde(default)]
    pub home_intent: HomeIntentSettings,

    /// Recognition service connection
    #[serde(default)]
    pub rhasspy: RhasspySettings,

    /// Audio device selection
    #[serde(default)]
    pub audio: AudioSettings,

    /// Filesystem locations
    #[serde(default)]
    pub paths: PathSettings,

    /// Raw per-component tables, keyed by component name
    #[serde(default)]
    pub components: toml::Table,
}

impl Settings {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings = toml::from_str(&content)?;
        settings.apply_env();
        Ok(settings)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(SETTINGS_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                let mut settings = Self::default();
                settings.apply_env();
                return Ok(settings);
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(RHASSPY_URL_ENV) {
            if !url.is_empty() {
                self.rhasspy.url = url;
            }
        }
    }

    /// Resolve the `[components.<name>]` table into a component's own
    /// configuration type. A missing table yields `T::default()`.
    pub fn component_config<T>(&self, component: &str) -> ConfigResult<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.components.get(component) {
            None => Ok(T::default()),
            Some(raw) => raw.clone().try_into().map_err(|e: toml::de::Error| {
                ConfigError::Component {
                    component: component.to_string(),
                    message: e.to_string(),
                }
            }),
        }
    }

    /// Directory holding per-declaration customization overlays.
    pub fn customizations_dir(&self) -> PathBuf {
        self.paths.config_dir.join("customizations")
    }
}

/// Engine-wide enablement switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeIntentSettings {
    /// Activate every sentence regardless of beta/disabled metadata
    #[serde(default)]
    pub enable_all: bool,

    /// Activate sentences marked beta
    #[serde(default)]
    pub enable_beta: bool,

    /// Language code handed to components
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for HomeIntentSettings {
    fn default() -> Self {
        Self {
            enable_all: false,
            enable_beta: false,
            language: default_language(),
        }
    }
}

/// Recognition service connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RhasspySettings {
    /// Base URL of the Rhasspy HTTP API
    #[serde(default = "default_rhasspy_url")]
    pub url: String,

    /// Bounded wait for the training request
    #[serde(default = "default_train_timeout")]
    pub train_timeout_secs: u64,
}

fn default_rhasspy_url() -> String {
    "http://rhasspy:12101".to_string()
}

fn default_train_timeout() -> u64 {
    60
}

impl RhasspySettings {
    pub fn train_timeout(&self) -> Duration {
        Duration::from_secs(self.train_timeout_secs)
    }
}

impl Default for RhasspySettings {
    fn default() -> Self {
        Self {
            url: default_rhasspy_url(),
            train_timeout_secs: default_train_timeout(),
        }
    }
}

/// Audio device selection. Device names match against the id or the
/// description reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Microphone to record from
    #[serde(default)]
    pub microphone_device: Option<String>,

    /// Output device for sounds
    #[serde(default)]
    pub sounds_device: Option<String>,

    /// Hermes site id used for published audio and speech
    #[serde(default = "default_site_id")]
    pub site_id: String,
}

fn default_site_id() -> String {
    "default".to_string()
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            microphone_device: None,
            sounds_device: None,
            site_id: default_site_id(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root of the user's configuration volume
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Optional override for the packaged profile templates
    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    /// Directory searched for audio files before `config_dir`
    #[serde(default)]
    pub sounds_dir: Option<PathBuf>,
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("/config")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            profile_dir: None,
            sounds_dir: None,
        }
    }
}
