//! Application paths and persisted booth settings.
//!
//! Config dir priority:
//! 1. CLI `--config-dir`
//! 2. `PHOTOBOOTH_CONFIG_DIR` environment variable
//! 3. Current folder IF it already holds photobooth.json or photobooth.log
//! 4. Platform config dir from dirs-next (~/.config/photobooth on Linux)

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::DeviceTier;
use crate::entities::{Layout, OverlayCatalog};

pub const SETTINGS_FILE: &str = "photobooth.json";
pub const LOG_FILE: &str = "photobooth.log";

/// Take counts the booth offers
pub const TAKE_CHOICES: std::ops::RangeInclusive<usize> = 1..=4;

/// Overrides for default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI args → ENV var (PHOTOBOOTH_CONFIG_DIR) → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir =
            cli_dir.or_else(|| std::env::var("PHOTOBOOTH_CONFIG_DIR").ok().map(PathBuf::from));
        Self { config_dir }
    }
}

pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config_dir(config).join(name)
}

/// Path of a data file (the log). Same priority as the config dir, but falls
/// back to the platform data dir (~/.local/share/photobooth on Linux).
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    data_dir(config).join(name)
}

pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = config_dir(config);
    let data_dir = data_dir(config);

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
    }
    if data_dir != config_dir && !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(())
}

fn has_local_config_files(dir: &Path) -> bool {
    [SETTINGS_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

pub fn config_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_config_files(&current_dir) {
            return current_dir;
        }
    }
    dirs_next::config_dir()
        .map(|d| d.join("photobooth"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn data_dir(config: &PathConfig) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(current_dir) = std::env::current_dir() {
        if has_local_config_files(&current_dir) {
            return current_dir;
        }
    }
    dirs_next::data_dir()
        .map(|d| d.join("photobooth"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Booth settings persisted as photobooth.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothSettings {
    pub overlays: OverlayCatalog,
    /// Name of the overlay selected at start ("None" for unframed)
    pub overlay: String,
    pub takes: usize,
    pub countdown_secs: u32,
    pub layout: Layout,
    pub device_tier: DeviceTier,
    pub ready_timeout_secs: u64,
    pub output_dir: PathBuf,
    pub reset_after_download: bool,
}

impl Default for BoothSettings {
    fn default() -> Self {
        Self {
            overlays: OverlayCatalog::default(),
            overlay: "None".to_string(),
            takes: 3,
            countdown_secs: 3,
            layout: Layout::Vertical,
            device_tier: DeviceTier::Desktop,
            ready_timeout_secs: 10,
            output_dir: PathBuf::from("."),
            reset_after_download: true,
        }
    }
}

impl BoothSettings {
    /// Load settings; a missing file yields defaults, a broken one is logged and ignored.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(settings) => {
                    debug!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Ignoring malformed {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Check values a run can't work with.
    pub fn validate(&self) -> Result<(), String> {
        if !TAKE_CHOICES.contains(&self.takes) {
            return Err(format!(
                "takes must be {}..={}, got {}",
                TAKE_CHOICES.start(),
                TAKE_CHOICES.end(),
                self.takes
            ));
        }
        if self.overlays.find(&self.overlay).is_none() {
            return Err(format!("unknown overlay '{}'", self.overlay));
        }
        Ok(())
    }
}
