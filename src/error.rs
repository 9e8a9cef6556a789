//! Engine error type.

use std::path::PathBuf;
use thiserror::Error;

use crate::bus::BusError;
use crate::config::ConfigError;
use crate::intents::customization::CustomizationError;
use crate::rhasspy::RhasspyError;

/// Errors raised while registering components or synchronizing Rhasspy.
///
/// Every variant is fatal for startup. The training timeout is the one
/// recoverable condition and never surfaces here.
#[derive(Debug, Error)]
pub enum HomeIntentError {
    #[error(
        "The sentence '{sentence}' has a slot ({slot}) that is not defined. \
         Ensure there is a slot named '{slot}' in {declaration}"
    )]
    UndefinedSlotReference {
        sentence: String,
        slot: String,
        declaration: String,
    },

    #[error(
        "The slot {slot} in {declaration} is already in Home Intent. \
         Please rename the slot to avoid conflict."
    )]
    DuplicateSlotName { slot: String, declaration: String },

    #[error("The sentence '{sentence}' is declared more than once in {declaration}")]
    DuplicateSentenceName {
        sentence: String,
        declaration: String,
    },

    #[error("The intent {intent} is already registered by another declaration")]
    DuplicateIntentName { intent: String },

    #[error("{declaration} is already registered")]
    DuplicateDeclaration { declaration: String },

    #[error("play_audio_file only supports .wav files, got {}", path.display())]
    UnsupportedAudioPayload { path: PathBuf },

    #[error("Audio file not found: {0}")]
    AudioFileNotFound(String),

    #[error("Rhasspy still rejects audio device queries after installing the profile: {source}")]
    Bootstrap {
        #[source]
        source: RhasspyError,
    },

    #[error("Home Intent only runs on x86_64 and armv7/aarch64 architectures, not {0}")]
    UnsupportedArchitecture(String),

    #[error("Invalid profile template {origin}: {source}")]
    Profile {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Customization(#[from] CustomizationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rhasspy(#[from] RhasspyError),

    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, HomeIntentError>;
