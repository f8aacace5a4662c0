//! Decorative frame overlays: the catalog offered to the user and how overlay
//! images are loaded at composite time.

use image::RgbaImage;
use log::trace;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CompositionError;

/// One selectable overlay. An empty `file` means "no overlay".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayEntry {
    pub name: String,
    #[serde(default)]
    pub file: String,
}

impl OverlayEntry {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.file.is_empty()
    }
}

/// Ordered overlay list. First entry is the "None" choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayCatalog(Vec<OverlayEntry>);

impl Default for OverlayCatalog {
    fn default() -> Self {
        Self(vec![
            OverlayEntry::new("None", ""),
            OverlayEntry::new("Frame 1", "presmark.png"),
            OverlayEntry::new("Frame 2", "Testing.png"),
            OverlayEntry::new("Frame 3", "on.png"),
            OverlayEntry::new("Frame 4", "frame.png"),
        ])
    }
}

impl OverlayCatalog {
    pub fn new(entries: Vec<OverlayEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[OverlayEntry] {
        &self.0
    }

    /// Find by display name (case-insensitive) or by file name.
    pub fn find(&self, key: &str) -> Option<&OverlayEntry> {
        self.0
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(key) || (!e.file.is_empty() && e.file == key))
    }
}

/// Source of decoded overlay images.
///
/// Called once per slot per composite, never cached: a flaky asset only
/// degrades the slots whose load failed.
pub trait OverlayLoader {
    fn load(&self, overlay: &str) -> Result<RgbaImage, CompositionError>;
}

/// Loads overlays from disk, resolving relative paths against `base_dir`.
#[derive(Debug, Clone)]
pub struct FileOverlayLoader {
    base_dir: PathBuf,
}

impl FileOverlayLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn resolve(&self, overlay: &str) -> PathBuf {
        let path = Path::new(overlay);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl OverlayLoader for FileOverlayLoader {
    fn load(&self, overlay: &str) -> Result<RgbaImage, CompositionError> {
        let path = self.resolve(overlay);
        trace!("Loading overlay {}", path.display());
        image::open(&path)
            .map(|img| img.to_rgba8())
            .map_err(|e| CompositionError::OverlayLoad {
                overlay: overlay.to_string(),
                reason: e.to_string(),
            })
    }
}
