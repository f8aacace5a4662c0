//! Snapshots, layouts and composed strips.

use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::error::CompositionError;

/// One still captured from the frame source at its native resolution.
#[derive(Debug, Clone)]
pub struct Snapshot {
    take: usize,
    image: RgbaImage,
}

impl Snapshot {
    pub fn new(take: usize, image: RgbaImage) -> Self {
        Self { take, image }
    }

    /// 1-based take number within its capture run
    pub fn take(&self) -> usize {
        self.take
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Strip arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
}

impl Layout {
    pub const ALL: [Layout; 2] = [Layout::Vertical, Layout::Horizontal];

    /// Download name. Downstream scripts match on these, keep them stable.
    pub fn file_name(self) -> &'static str {
        match self {
            Layout::Vertical => "photobooth_strip_vertical.png",
            Layout::Horizontal => "photobooth_strip_horizontal.png",
        }
    }

    /// Canvas size for `count` slots of `slot` size.
    pub fn canvas_size(self, slot: (u32, u32), count: u32) -> (u32, u32) {
        match self {
            Layout::Vertical => (slot.0, slot.1 * count),
            Layout::Horizontal => (slot.0 * count, slot.1),
        }
    }

    /// Top-left corner of slot `index`.
    pub fn slot_origin(self, slot: (u32, u32), index: u32) -> (u32, u32) {
        match self {
            Layout::Vertical => (0, slot.1 * index),
            Layout::Horizontal => (slot.0 * index, 0),
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Vertical => write!(f, "vertical"),
            Layout::Horizontal => write!(f, "horizontal"),
        }
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vertical" | "v" => Ok(Layout::Vertical),
            "horizontal" | "h" => Ok(Layout::Horizontal),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

/// A fully composed strip in one layout.
#[derive(Debug, Clone)]
pub struct StripImage {
    layout: Layout,
    slots: usize,
    image: RgbaImage,
}

impl StripImage {
    pub(crate) fn new(layout: Layout, slots: usize, image: RgbaImage) -> Self {
        Self {
            layout,
            slots,
            image,
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn file_name(&self) -> &'static str {
        self.layout.file_name()
    }

    /// PNG bytes of the strip (the downloadable artifact).
    pub fn encode_png(&self) -> Result<Vec<u8>, CompositionError> {
        let mut bytes = Cursor::new(Vec::new());
        self.image
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|e| CompositionError::Encode(e.to_string()))?;
        Ok(bytes.into_inner())
    }
}

/// Both layouts built from one snapshot run.
///
/// Constructed only by the compositor, after every slot of both strips is drawn,
/// so a pair is never partially built.
#[derive(Debug, Clone)]
pub struct CompositePair {
    vertical: StripImage,
    horizontal: StripImage,
}

impl CompositePair {
    pub(crate) fn new(vertical: StripImage, horizontal: StripImage) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    pub fn get(&self, layout: Layout) -> &StripImage {
        match layout {
            Layout::Vertical => &self.vertical,
            Layout::Horizontal => &self.horizontal,
        }
    }

    pub fn vertical(&self) -> &StripImage {
        &self.vertical
    }

    pub fn horizontal(&self) -> &StripImage {
        &self.horizontal
    }

    pub fn slots(&self) -> usize {
        self.vertical.slots()
    }
}
