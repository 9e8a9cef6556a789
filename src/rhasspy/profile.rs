//! Profile templates.
//!
//! The desired Rhasspy profile starts from a template packaged per CPU
//! architecture. A deployment can override it by placing
//! `<profile_dir>/<arch>/rhasspy_profile.json` on disk.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{HomeIntentError, Result};

pub const PROFILE_FILE: &str = "rhasspy_profile.json";

const X86_64_TEMPLATE: &str = include_str!("../../assets/x86_64/rhasspy_profile.json");
const ARM_TEMPLATE: &str = include_str!("../../assets/arm/rhasspy_profile.json");

/// Architectures the packaged templates cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    /// armv7 and aarch64 share one template
    Arm,
}

impl Arch {
    /// Detect the architecture this binary was built for
    pub fn detect() -> Result<Self> {
        Self::from_machine(std::env::consts::ARCH)
    }

    /// Map a machine name (`uname -m` or `std::env::consts::ARCH`)
    pub fn from_machine(machine: &str) -> Result<Self> {
        match machine {
            "x86_64" => Ok(Arch::X86_64),
            "aarch64" => Ok(Arch::Arm),
            m if m.starts_with("arm") => Ok(Arch::Arm),
            other => Err(HomeIntentError::UnsupportedArchitecture(other.to_string())),
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Arm => "arm",
        }
    }

    fn packaged_template(&self) -> &'static str {
        match self {
            Arch::X86_64 => X86_64_TEMPLATE,
            Arch::Arm => ARM_TEMPLATE,
        }
    }
}

/// Load the profile template for `arch`, preferring an on-disk override.
pub fn load_template(arch: Arch, profile_dir: Option<&Path>) -> Result<Value> {
    if let Some(path) = override_path(arch, profile_dir) {
        let content = std::fs::read_to_string(&path).map_err(|source| HomeIntentError::Io {
            path: path.clone(),
            source,
        })?;
        return serde_json::from_str(&content).map_err(|source| HomeIntentError::Profile {
            origin: path.display().to_string(),
            source,
        });
    }

    serde_json::from_str(arch.packaged_template()).map_err(|source| HomeIntentError::Profile {
        origin: format!("packaged {}/{}", arch.dir_name(), PROFILE_FILE),
        source,
    })
}

fn override_path(arch: Arch, profile_dir: Option<&Path>) -> Option<PathBuf> {
    let path = profile_dir?.join(arch.dir_name()).join(PROFILE_FILE);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_from_machine() {
        assert_eq!(Arch::from_machine("x86_64").unwrap(), Arch::X86_64);
        assert_eq!(Arch::from_machine("aarch64").unwrap(), Arch::Arm);
        assert_eq!(Arch::from_machine("armv7l").unwrap(), Arch::Arm);
        assert_eq!(Arch::from_machine("arm").unwrap(), Arch::Arm);

        let err = Arch::from_machine("riscv64").unwrap_err();
        assert!(matches!(err, HomeIntentError::UnsupportedArchitecture(ref m) if m == "riscv64"));
    }

    #[test]
    fn test_packaged_templates_parse() {
        for arch in [Arch::X86_64, Arch::Arm] {
            let profile = load_template(arch, None).unwrap();
            assert!(profile["microphone"]["system"].is_string());
            assert!(profile["sounds"]["system"].is_string());
        }
    }

    #[test]
    fn test_override_template() {
        let dir = tempfile::tempdir().unwrap();
        let arch_dir = dir.path().join("arm");
        std::fs::create_dir_all(&arch_dir).unwrap();
        std::fs::write(arch_dir.join(PROFILE_FILE), r#"{"custom": true}"#).unwrap();

        let profile = load_template(Arch::Arm, Some(dir.path())).unwrap();
        assert_eq!(profile["custom"], Value::Bool(true));

        // No override for x86_64 in this directory, packaged template wins.
        let profile = load_template(Arch::X86_64, Some(dir.path())).unwrap();
        assert!(profile.get("custom").is_none());
    }

    #[test]
    fn test_bad_override_template() {
        let dir = tempfile::tempdir().unwrap();
        let arch_dir = dir.path().join("x86_64");
        std::fs::create_dir_all(&arch_dir).unwrap();
        std::fs::write(arch_dir.join(PROFILE_FILE), "not json").unwrap();

        let err = load_template(Arch::X86_64, Some(dir.path())).unwrap_err();
        assert!(matches!(err, HomeIntentError::Profile { .. }));
    }
}
