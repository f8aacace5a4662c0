//! Events published by the capture pipeline and the session.

use std::path::PathBuf;

use crate::entities::Layout;
use crate::error::CameraCause;

// === Camera ===

#[derive(Clone, Debug)]
pub struct CameraStarted {
    pub profile: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct CameraFailed {
    pub cause: CameraCause,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct CameraStopped;

// === Capture ===

/// Countdown display update; `remaining` runs d, d-1, ..., 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownTick {
    pub take: usize,
    pub remaining: u32,
}

/// Countdown display blanked right before the shutter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownCleared {
    pub take: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotTaken {
    pub take: usize,
    pub width: u32,
    pub height: u32,
}

// === Results ===

#[derive(Clone, Debug)]
pub struct CompositeReady {
    pub takes: usize,
    pub vertical: (u32, u32),
    pub horizontal: (u32, u32),
}

#[derive(Clone, Debug)]
pub struct LayoutChanged(pub Layout);

#[derive(Clone, Debug)]
pub struct Downloaded {
    pub layout: Layout,
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct SessionReset;
