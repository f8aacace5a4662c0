//! Camera device seams.
//!
//! A [`CameraDevice`] negotiates a stream for one constraint profile; the stream
//! it returns is the live [`FrameSource`]. Nothing above this module knows which
//! backend is behind them.

use image::RgbaImage;

use super::profiles::ConstraintProfile;
use crate::error::DeviceError;

/// Live camera stream.
pub trait FrameSource {
    /// Native (width, height). Zero until the stream has its metadata.
    fn dimensions(&self) -> (u32, u32);

    /// Non-blocking readiness check: `Ok(true)` once the stream has its metadata.
    ///
    /// Acquisition polls this on its clock and owns the deadline.
    fn poll_ready(&mut self) -> Result<bool, DeviceError>;

    /// Copy the current picture at native resolution.
    fn snapshot(&mut self) -> Result<RgbaImage, DeviceError>;

    fn is_active(&self) -> bool;

    /// Stop all tracks. Must be idempotent.
    fn stop(&mut self);
}

pub trait CameraDevice {
    /// Try to open a stream satisfying `profile`.
    fn open(&mut self, profile: &ConstraintProfile) -> Result<Box<dyn FrameSource>, DeviceError>;

    /// Human-readable name for logs.
    fn name(&self) -> String {
        "camera".to_string()
    }
}
