//! Customization overlays.
//!
//! A deployment can drop `<config_dir>/customizations/<stem>.toml` next to
//! its settings to change how a component's sentences are activated:
//!
//! ```toml
//! [sentences.info_date]
//! disabled = false
//! ```
//!
//! The overlay is applied once, before the declaration is validated.

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::{Disabled, Intents};

/// Customization file errors
#[derive(Debug, Error)]
pub enum CustomizationError {
    #[error("Failed to read customization file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse customization file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Per-sentence overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SentenceCustomization {
    #[serde(default)]
    pub disabled: Option<bool>,
}

/// Parsed customization document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Customization {
    #[serde(default)]
    pub sentences: IndexMap<String, SentenceCustomization>,
}

impl Customization {
    pub fn parse(path: &Path, content: &str) -> Result<Self, CustomizationError> {
        toml::from_str(content).map_err(|source| CustomizationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, CustomizationError> {
        let content = std::fs::read_to_string(path).map_err(|source| CustomizationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Path of the overlay for `intents` under `dir`, whether or not it exists
    pub fn path_for(dir: &Path, intents: &Intents) -> Option<PathBuf> {
        intents
            .customization_stem()
            .map(|stem| dir.join(format!("{stem}.toml")))
    }

    /// Load the overlay for `intents` if one exists under `dir`
    pub fn find(dir: &Path, intents: &Intents) -> Result<Option<Self>, CustomizationError> {
        match Self::path_for(dir, intents) {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "loading customization");
                Self::load(&path).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Apply overrides to the matching sentences of `intents`
    pub fn apply(&self, intents: &mut Intents) {
        let declaration = intents.name().to_string();
        for (name, custom) in &self.sentences {
            let Some(sentence) = intents.sentence_mut(name) else {
                warn!(declaration = %declaration, sentence = %name, "customization names an unknown sentence");
                continue;
            };
            if let Some(disabled) = custom.disabled {
                sentence.set_disabled(Disabled::from_flag(disabled));
            }
        }
    }
}
