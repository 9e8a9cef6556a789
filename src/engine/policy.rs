//! Sentence enablement.

use crate::config::HomeIntentSettings;
use crate::intents::{Disabled, Sentence};

/// Fleet-wide switches deciding which sentences are taught to Rhasspy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnablementPolicy {
    pub enable_all: bool,
    pub enable_beta: bool,
}

impl EnablementPolicy {
    pub fn from_settings(settings: &HomeIntentSettings) -> Self {
        Self {
            enable_all: settings.enable_all,
            enable_beta: settings.enable_beta,
        }
    }

    /// Whether `sentence` is active.
    ///
    /// Order matters: `enable_all`, then beta under `enable_beta`, then an
    /// explicit `Disabled::No`. An unset override is inactive.
    pub fn is_active(&self, sentence: &Sentence) -> bool {
        if self.enable_all {
            return true;
        }
        if self.enable_beta && sentence.is_beta() {
            return true;
        }
        sentence.disabled_state() == Disabled::No
    }
}
