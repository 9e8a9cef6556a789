//! Profile convergence.
//!
//! Brings Rhasspy's installed profile in line with the desired one:
//!
//! ```text
//!  Unconfigured ──(install template, restart, retry once)──┐
//!       │                                                   │
//!       └──(audio devices merged)──> compare installed ─────┤
//!                                        │ differs          │
//!                                        ▼                  │
//!                                   Configuring ──> assets downloaded? ──> Configured
//! ```
//!
//! The first-boot path is taken at most once. If the service still rejects
//! the device query after installing and restarting, startup fails.

use serde_json::Value;
use tracing::{debug, info};

use crate::config::AudioSettings;
use crate::error::{HomeIntentError, Result};
use crate::rhasspy::{apply_audio_devices, RecognitionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileState {
    Unconfigured,
    Configuring,
    Configured,
}

/// What convergence had to do
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceReport {
    /// Profile the service now runs
    pub profile: Value,
    /// The first-boot install/restart/retry path ran
    pub bootstrapped: bool,
    /// The installed profile differed and was replaced
    pub reinstalled: bool,
    /// Asset download was requested
    pub download_requested: bool,
}

pub struct ProfileConvergence<'a, S: RecognitionService + ?Sized> {
    service: &'a S,
    audio: &'a AudioSettings,
    state: ProfileState,
}

impl<'a, S: RecognitionService + ?Sized> ProfileConvergence<'a, S> {
    pub fn new(service: &'a S, audio: &'a AudioSettings) -> Self {
        Self {
            service,
            audio,
            state: ProfileState::Unconfigured,
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state
    }

    /// Run the loop against `template`
    pub fn converge(&mut self, template: &Value) -> Result<ConvergenceReport> {
        info!("checking profile");
        let (profile, bootstrapped) = self.desired_profile(template)?;

        let installed = self.service.installed_profile()?;
        let reinstalled = installed != profile;
        if reinstalled {
            self.state = ProfileState::Configuring;
            info!("installing profile");
            self.service.install_profile(&profile)?;
            info!("restarting Rhasspy...");
            self.service.restart()?;
        } else {
            info!("Rhasspy profile matches Home Intent profile, moving on!");
        }

        let meta = self.service.profile_meta()?;
        let download_requested = !meta.downloaded;
        if download_requested {
            info!("downloading profile (can take 30s+ first time)...");
            self.service.download_profile()?;
        } else {
            info!("profile is up to date, nothing to download");
        }

        self.state = ProfileState::Configured;
        Ok(ConvergenceReport {
            profile,
            bootstrapped,
            reinstalled,
            download_requested,
        })
    }

    /// Template merged with live audio devices. Returns whether the
    /// first-boot path was needed.
    fn desired_profile(&mut self, template: &Value) -> Result<(Value, bool)> {
        let mut profile = template.clone();
        match apply_audio_devices(self.service, self.audio, &mut profile) {
            Ok(()) => {
                debug!(profile = %profile, "desired profile");
                return Ok((profile, false));
            }
            Err(e) if e.is_rejection() => {
                info!(error = %e, "installing profile for first boot");
            }
            Err(e) => return Err(e.into()),
        }

        self.state = ProfileState::Configuring;
        self.service.install_profile(template)?;
        info!("restarting Rhasspy...");
        self.service.restart()?;

        let mut profile = template.clone();
        apply_audio_devices(self.service, self.audio, &mut profile)
            .map_err(|source| HomeIntentError::Bootstrap { source })?;
        debug!(profile = %profile, "desired profile");
        Ok((profile, true))
    }
}
