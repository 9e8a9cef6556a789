//! Rhasspy Recognition Service
//!
//! The engine treats Rhasspy as an opaque service reached over HTTP. All
//! calls go through the [`RecognitionService`] trait so the synchronization
//! logic can run against the real client ([`RhasspyApi`]) or a stand-in.
//!
//! # Endpoints
//!
//! | Method | Path | Used for |
//! |--------|------|----------|
//! | GET  | `/api/profile?layers=profile` | installed profile |
//! | POST | `/api/profile` | install profile |
//! | POST | `/api/restart` | restart after install |
//! | GET  | `/api/profiles` | download status |
//! | POST | `/api/download-profile` | fetch language assets |
//! | GET  | `/api/microphones`, `/api/speakers` | audio devices |
//! | POST | `/api/slots?overwriteAll=true` | replace all slots |
//! | POST | `/api/sentences` | replace `sentences.ini` |
//! | POST | `/api/train` | retrain (bounded wait) |

pub mod audio;
pub mod client;
pub mod profile;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::engine::slots::GlobalSlotTable;

pub use audio::{apply_audio_devices, select_device};
pub use client::RhasspyApi;
pub use profile::{load_template, Arch, PROFILE_FILE};

pub const PROFILE_PATH: &str = "/api/profile";
pub const INSTALLED_PROFILE_PATH: &str = "/api/profile?layers=profile";
pub const RESTART_PATH: &str = "/api/restart";
pub const PROFILES_PATH: &str = "/api/profiles";
pub const DOWNLOAD_PROFILE_PATH: &str = "/api/download-profile";
pub const MICROPHONES_PATH: &str = "/api/microphones";
pub const SPEAKERS_PATH: &str = "/api/speakers";
pub const SLOTS_PATH: &str = "/api/slots?overwriteAll=true";
pub const SENTENCES_PATH: &str = "/api/sentences";
pub const TRAIN_PATH: &str = "/api/train";

/// Errors from talking to Rhasspy
#[derive(Error, Debug)]
pub enum RhasspyError {
    #[error("Rhasspy rejected {path} with status {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Timed out waiting for Rhasspy on {path}")]
    Timeout { path: String },

    #[error("Could not reach Rhasspy at {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid JSON from Rhasspy on {path}: {message}")]
    Json { path: String, message: String },
}

impl RhasspyError {
    /// The service answered, but refused the request.
    pub fn is_rejection(&self) -> bool {
        matches!(self, RhasspyError::Status { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RhasspyError::Timeout { .. })
    }
}

/// Audio devices reported by the service (id -> description).
pub type DeviceList = IndexMap<String, String>;

/// Subset of `/api/profiles` the engine cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileMeta {
    /// Whether the language/model assets are present
    #[serde(default)]
    pub downloaded: bool,
}

/// Operations the engine needs from the recognition service.
///
/// Every call blocks; only [`RecognitionService::train`] takes a bound.
pub trait RecognitionService {
    /// Profile currently installed (profile layer only)
    fn installed_profile(&self) -> Result<Value, RhasspyError>;

    /// Replace the installed profile
    fn install_profile(&self, profile: &Value) -> Result<(), RhasspyError>;

    /// Restart the service so a new profile takes effect
    fn restart(&self) -> Result<(), RhasspyError>;

    /// Profile metadata (download status)
    fn profile_meta(&self) -> Result<ProfileMeta, RhasspyError>;

    /// Download language/model assets for the installed profile
    fn download_profile(&self) -> Result<(), RhasspyError>;

    /// Microphones the service can record from
    fn microphones(&self) -> Result<DeviceList, RhasspyError>;

    /// Output devices the service can play sounds on
    fn speakers(&self) -> Result<DeviceList, RhasspyError>;

    /// Overwrite every slot with the given table
    fn replace_slots(&self, slots: &GlobalSlotTable) -> Result<(), RhasspyError>;

    /// Overwrite `sentences.ini` with the given grammar document
    fn replace_sentences(&self, sentences_ini: &str) -> Result<(), RhasspyError>;

    /// Retrain, waiting at most `timeout`
    fn train(&self, timeout: Duration) -> Result<(), RhasspyError>;
}

impl<T: RecognitionService + ?Sized> RecognitionService for &T {
    fn installed_profile(&self) -> Result<Value, RhasspyError> {
        (**self).installed_profile()
    }

    fn install_profile(&self, profile: &Value) -> Result<(), RhasspyError> {
        (**self).install_profile(profile)
    }

    fn restart(&self) -> Result<(), RhasspyError> {
        (**self).restart()
    }

    fn profile_meta(&self) -> Result<ProfileMeta, RhasspyError> {
        (**self).profile_meta()
    }

    fn download_profile(&self) -> Result<(), RhasspyError> {
        (**self).download_profile()
    }

    fn microphones(&self) -> Result<DeviceList, RhasspyError> {
        (**self).microphones()
    }

    fn speakers(&self) -> Result<DeviceList, RhasspyError> {
        (**self).speakers()
    }

    fn replace_slots(&self, slots: &GlobalSlotTable) -> Result<(), RhasspyError> {
        (**self).replace_slots(slots)
    }

    fn replace_sentences(&self, sentences_ini: &str) -> Result<(), RhasspyError> {
        (**self).replace_sentences(sentences_ini)
    }

    fn train(&self, timeout: Duration) -> Result<(), RhasspyError> {
        (**self).train(timeout)
    }
}
