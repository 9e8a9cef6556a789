//! Audio device merge.
//!
//! Fills the microphone and sound output devices of a profile from the
//! devices Rhasspy reports. Both lists are queried before the profile is
//! touched, so a rejected query leaves the profile unchanged.

use serde_json::Value;
use tracing::{info, warn};

use super::{DeviceList, RecognitionService, RhasspyError};
use crate::config::AudioSettings;

/// Query the service's audio devices and write the configured ones into
/// `profile`. Errors from the device queries are returned untouched so the
/// caller can tell an unconfigured service from an unreachable one.
pub fn apply_audio_devices<S>(
    service: &S,
    settings: &AudioSettings,
    profile: &mut Value,
) -> Result<(), RhasspyError>
where
    S: RecognitionService + ?Sized,
{
    let microphones = service.microphones()?;
    let speakers = service.speakers()?;

    if let Some(wanted) = settings.microphone_device.as_deref() {
        set_device(profile, "microphone", &microphones, wanted);
    }
    if let Some(wanted) = settings.sounds_device.as_deref() {
        set_device(profile, "sounds", &speakers, wanted);
    }

    Ok(())
}

/// First device whose id or description contains `wanted` (case-insensitive)
pub fn select_device<'a>(devices: &'a DeviceList, wanted: &str) -> Option<&'a str> {
    let wanted = wanted.to_lowercase();
    devices
        .iter()
        .find(|(id, description)| {
            id.to_lowercase().contains(&wanted) || description.to_lowercase().contains(&wanted)
        })
        .map(|(id, _)| id.as_str())
}

fn set_device(profile: &mut Value, section: &str, devices: &DeviceList, wanted: &str) {
    let Some(device) = select_device(devices, wanted) else {
        warn!(section, wanted, "configured audio device not reported by Rhasspy, keeping template value");
        return;
    };

    let Some(system) = profile[section]["system"].as_str().map(str::to_string) else {
        warn!(section, "profile template has no audio system, cannot set device");
        return;
    };

    let Some(target) = profile
        .get_mut(section)
        .and_then(|s| s.get_mut(system.as_str()))
        .and_then(Value::as_object_mut)
    else {
        warn!(section, system = %system, "profile template has no settings table for the audio system, keeping template value");
        return;
    };

    info!(section, system = %system, device, "using audio device");
    target.insert("device".to_string(), Value::String(device.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn devices(pairs: &[(&str, &str)]) -> DeviceList {
        pairs
            .iter()
            .map(|(id, desc)| (id.to_string(), desc.to_string()))
            .collect()
    }

    #[test]
    fn test_select_device() {
        let list = devices(&[
            ("default", "Default Audio Device"),
            ("sysdefault:CARD=Device", "USB PnP Sound Device"),
        ]);
        assert_eq!(select_device(&list, "usb"), Some("sysdefault:CARD=Device"));
        assert_eq!(select_device(&list, "CARD=Device"), Some("sysdefault:CARD=Device"));
        assert_eq!(select_device(&list, "default"), Some("default"));
        assert_eq!(select_device(&list, "hdmi"), None);
    }

    #[test]
    fn test_set_device_uses_profile_system() {
        let mut profile = json!({
            "microphone": {"system": "arecord", "arecord": {"device": ""}},
        });
        let list = devices(&[("plughw:1,0", "USB Mic")]);
        set_device(&mut profile, "microphone", &list, "usb");
        assert_eq!(profile["microphone"]["arecord"]["device"], "plughw:1,0");
    }

    #[test]
    fn test_unknown_device_keeps_template() {
        let mut profile = json!({
            "sounds": {"system": "aplay", "aplay": {"device": "default"}},
        });
        let before = profile.clone();
        set_device(&mut profile, "sounds", &devices(&[("hw:0", "HDMI")]), "usb");
        assert_eq!(profile, before);
    }

    #[test]
    fn test_malformed_system_table_keeps_template() {
        let list = devices(&[("plughw:1,0", "USB Mic")]);

        let mut profile = json!({"microphone": {"system": "arecord", "arecord": "hw:0"}});
        let before = profile.clone();
        set_device(&mut profile, "microphone", &list, "usb");
        assert_eq!(profile, before);

        let mut profile = json!({"microphone": {"system": "arecord"}});
        let before = profile.clone();
        set_device(&mut profile, "microphone", &list, "usb");
        assert_eq!(profile, before);
    }
}
