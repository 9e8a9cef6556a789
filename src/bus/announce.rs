//! Speech and audio announcements published on behalf of components.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::hermes::TtsSay;
use super::{topics, BusMessage, MessageBus};
use crate::config::Settings;
use crate::error::{HomeIntentError, Result};

/// Cheap to clone; components keep one and call it from their handlers.
#[derive(Clone)]
pub struct Announcer {
    bus: Arc<dyn MessageBus>,
    site_id: String,
    search_dirs: Vec<PathBuf>,
}

impl Announcer {
    /// Audio files are looked up in `paths.sounds_dir`, then
    /// `paths.config_dir`.
    pub fn new(bus: Arc<dyn MessageBus>, settings: &Settings) -> Self {
        let search_dirs = settings
            .paths
            .sounds_dir
            .iter()
            .cloned()
            .chain(std::iter::once(settings.paths.config_dir.clone()))
            .collect();
        Self {
            bus,
            site_id: settings.audio.site_id.clone(),
            search_dirs,
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Speak `text` on the configured site
    pub fn say(&self, text: &str) -> Result<()> {
        self.say_to(text, &self.site_id)
    }

    pub fn say_to(&self, text: &str, site_id: &str) -> Result<()> {
        let say = TtsSay {
            text: text.to_string(),
            site_id: site_id.to_string(),
        };
        let message = BusMessage::json(topics::TTS_SAY, &say)?;
        self.bus.publish(&message.topic, message.payload)?;
        Ok(())
    }

    /// Publish a `.wav` file's bytes for playback on the configured site
    pub fn play_audio_file(&self, file: impl AsRef<Path>) -> Result<()> {
        self.play_audio_file_to(file, &self.site_id)
    }

    pub fn play_audio_file_to(&self, file: impl AsRef<Path>, site_id: &str) -> Result<()> {
        let file = file.as_ref();
        if file.extension().and_then(|e| e.to_str()) != Some("wav") {
            return Err(HomeIntentError::UnsupportedAudioPayload {
                path: file.to_path_buf(),
            });
        }

        let path = self.resolve(file)?;
        let bytes = std::fs::read(&path).map_err(|source| HomeIntentError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), site_id, "playing audio");
        self.bus.publish(&topics::play_bytes(site_id), bytes)?;
        Ok(())
    }

    fn resolve(&self, file: &Path) -> Result<PathBuf> {
        if file.is_absolute() {
            return if file.is_file() {
                Ok(file.to_path_buf())
            } else {
                Err(HomeIntentError::AudioFileNotFound(file.display().to_string()))
            };
        }
        self.search_dirs
            .iter()
            .map(|dir| dir.join(file))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| HomeIntentError::AudioFileNotFound(file.display().to_string()))
    }
}

impl std::fmt::Debug for Announcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Announcer")
            .field("site_id", &self.site_id)
            .field("search_dirs", &self.search_dirs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ChannelBus;
    use crossbeam_channel::Receiver;
    use serde_json::json;

    fn announcer(sounds: &Path) -> (Announcer, Receiver<BusMessage>) {
        let mut settings = Settings::default();
        settings.paths.sounds_dir = Some(sounds.to_path_buf());
        settings.audio.site_id = "kitchen".to_string();
        let (bus, rx) = ChannelBus::new();
        (Announcer::new(Arc::new(bus), &settings), rx)
    }

    #[test]
    fn test_say() {
        let dir = tempfile::tempdir().unwrap();
        let (announcer, rx) = announcer(dir.path());
        announcer.say("Timer done").unwrap();

        let message = rx.try_recv().unwrap();
        assert_eq!(message.topic, "hermes/tts/say");
        assert_eq!(
            message.payload_json().unwrap(),
            json!({"text": "Timer done", "siteId": "kitchen"})
        );
    }

    #[test]
    fn test_play_wav_from_sounds_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ding.wav"), b"RIFFdata").unwrap();
        let (announcer, rx) = announcer(dir.path());

        announcer.play_audio_file("ding.wav").unwrap();
        let message = rx.try_recv().unwrap();
        assert_eq!(message.topic, "hermes/audioServer/kitchen/playBytes/homeintent_audio");
        assert_eq!(message.payload, b"RIFFdata");
    }

    #[test]
    fn test_only_wav_supported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ding.mp3"), b"ID3").unwrap();
        let (announcer, rx) = announcer(dir.path());

        let err = announcer.play_audio_file("ding.mp3").unwrap_err();
        assert!(matches!(err, HomeIntentError::UnsupportedAudioPayload { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (announcer, _rx) = announcer(dir.path());
        let err = announcer.play_audio_file("missing.wav").unwrap_err();
        assert!(matches!(err, HomeIntentError::AudioFileNotFound(_)));
    }
}
