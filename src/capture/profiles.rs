//! Constraint profiles - the ordered fallback table used by camera acquisition.
//!
//! Plain data: the order can be inspected without a device.
//! Every list handed to acquisition ends with [`ConstraintProfile::any`].

use serde::{Deserialize, Serialize};

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    User,
    Environment,
}

/// Requested dimension: preferred value with an optional hard cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ideal {
    pub ideal: u32,
    #[serde(default)]
    pub max: Option<u32>,
}

impl Ideal {
    pub fn new(ideal: u32) -> Self {
        Self { ideal, max: None }
    }

    pub fn capped(ideal: u32, max: u32) -> Self {
        Self {
            ideal,
            max: Some(max),
        }
    }

    /// Value to use given what the hardware can do.
    pub fn resolve(&self, available: u32) -> u32 {
        let wanted = match self.max {
            Some(max) => self.ideal.min(max),
            None => self.ideal,
        };
        wanted.min(available)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintProfile {
    pub label: String,
    #[serde(default)]
    pub width: Option<Ideal>,
    #[serde(default)]
    pub height: Option<Ideal>,
    #[serde(default)]
    pub facing: Option<Facing>,
}

impl ConstraintProfile {
    pub fn sized(label: &str, width: Ideal, height: Ideal, facing: Option<Facing>) -> Self {
        Self {
            label: label.to_string(),
            width: Some(width),
            height: Some(height),
            facing,
        }
    }

    pub fn facing(label: &str, facing: Facing) -> Self {
        Self {
            label: label.to_string(),
            width: None,
            height: None,
            facing: Some(facing),
        }
    }

    /// "Any camera" - no constraints at all.
    pub fn any() -> Self {
        Self {
            label: "any".to_string(),
            width: None,
            height: None,
            facing: None,
        }
    }

    pub fn is_permissive(&self) -> bool {
        self.width.is_none() && self.height.is_none() && self.facing.is_none()
    }
}

/// Device class; only decides which profiles are prepended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    #[default]
    Desktop,
    Mobile,
}

/// Profiles in priority order for the given tier.
pub fn default_profiles(tier: DeviceTier) -> Vec<ConstraintProfile> {
    let mut profiles = Vec::new();
    if tier == DeviceTier::Mobile {
        profiles.push(ConstraintProfile::sized(
            "mobile-720-square",
            Ideal::capped(720, 1280),
            Ideal::capped(720, 1280),
            Some(Facing::User),
        ));
        profiles.push(ConstraintProfile::sized(
            "mobile-640x480",
            Ideal::capped(640, 1024),
            Ideal::capped(480, 768),
            Some(Facing::User),
        ));
    }
    profiles.push(ConstraintProfile::sized(
        "hd-1280x720",
        Ideal::new(1280),
        Ideal::new(720),
        Some(Facing::User),
    ));
    profiles.push(ConstraintProfile::sized(
        "vga-640x480",
        Ideal::new(640),
        Ideal::new(480),
        Some(Facing::User),
    ));
    profiles.push(ConstraintProfile::facing("user-facing", Facing::User));
    profiles.push(ConstraintProfile::any());
    profiles
}

/// Append the permissive profile unless the list already ends with one.
pub fn ensure_permissive(mut profiles: Vec<ConstraintProfile>) -> Vec<ConstraintProfile> {
    if !profiles.last().is_some_and(|p| p.is_permissive()) {
        profiles.push(ConstraintProfile::any());
    }
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_table() {
        let labels: Vec<_> = default_profiles(DeviceTier::Desktop)
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels, vec!["hd-1280x720", "vga-640x480", "user-facing", "any"]);
    }

    #[test]
    fn test_mobile_prepends_only() {
        let desktop = default_profiles(DeviceTier::Desktop);
        let mobile = default_profiles(DeviceTier::Mobile);
        assert_eq!(mobile.len(), desktop.len() + 2);
        assert_eq!(&mobile[2..], &desktop[..]);
        assert_eq!(mobile[0].width, Some(Ideal::capped(720, 1280)));
    }

    #[test]
    fn test_tables_end_permissive() {
        for tier in [DeviceTier::Desktop, DeviceTier::Mobile] {
            assert!(default_profiles(tier).last().unwrap().is_permissive());
        }
    }

    #[test]
    fn test_ensure_permissive() {
        let only_hd = vec![default_profiles(DeviceTier::Desktop).remove(0)];
        let fixed = ensure_permissive(only_hd);
        assert_eq!(fixed.len(), 2);
        assert!(fixed[1].is_permissive());

        assert_eq!(ensure_permissive(Vec::new()), vec![ConstraintProfile::any()]);
        assert_eq!(ensure_permissive(vec![ConstraintProfile::any()]).len(), 1);
    }

    #[test]
    fn test_ideal_resolve() {
        assert_eq!(Ideal::new(1280).resolve(1920), 1280);
        assert_eq!(Ideal::new(1280).resolve(800), 800);
        assert_eq!(Ideal::capped(2000, 1024).resolve(4000), 1024);
    }
}
