//! Synthetic camera producing a moving colour test pattern.
//!
//! Resolution is negotiated from the profile's ideal/max, clamped to the sensor.
//! A device built with [`PatternDevice::facing`] rejects profiles asking for the
//! other side with `Overconstrained`, which makes it handy for exercising the
//! fallback chain without hardware.

use image::{Rgba, RgbaImage};
use log::trace;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::device::{CameraDevice, FrameSource};
use super::profiles::{ConstraintProfile, Facing};
use crate::error::{DeviceError, DeviceErrorKind};

#[derive(Debug, Clone)]
pub struct PatternDevice {
    sensor: (u32, u32),
    facing: Facing,
    open_streams: Arc<AtomicUsize>,
}

impl PatternDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            sensor: (width, height),
            facing: Facing::User,
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Streams opened and not yet stopped
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }
}

impl Default for PatternDevice {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

impl CameraDevice for PatternDevice {
    fn open(&mut self, profile: &ConstraintProfile) -> Result<Box<dyn FrameSource>, DeviceError> {
        if let Some(wanted) = profile.facing {
            if wanted != self.facing {
                return Err(DeviceError::new(
                    DeviceErrorKind::Overconstrained,
                    format!("no {:?}-facing camera", wanted),
                ));
            }
        }

        let width = profile
            .width
            .map(|w| w.resolve(self.sensor.0))
            .unwrap_or(self.sensor.0);
        let height = profile
            .height
            .map(|h| h.resolve(self.sensor.1))
            .unwrap_or(self.sensor.1);

        self.open_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(PatternStream {
            width,
            height,
            frame: 0,
            active: true,
            open_streams: Arc::clone(&self.open_streams),
        }))
    }

    fn name(&self) -> String {
        format!("pattern {}x{}", self.sensor.0, self.sensor.1)
    }
}

struct PatternStream {
    width: u32,
    height: u32,
    frame: u32,
    active: bool,
    open_streams: Arc<AtomicUsize>,
}

impl FrameSource for PatternStream {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn poll_ready(&mut self) -> Result<bool, DeviceError> {
        Ok(self.active)
    }

    fn snapshot(&mut self) -> Result<RgbaImage, DeviceError> {
        if !self.active {
            return Err(DeviceError::new(DeviceErrorKind::Other, "stream stopped"));
        }
        self.frame += 1;
        trace!("Pattern frame {}", self.frame);

        // Diagonal gradient that shifts a little every frame
        let shift = self.frame.wrapping_mul(37);
        let (w, h) = (self.width.max(1), self.height.max(1));
        Ok(RgbaImage::from_fn(self.width, self.height, |x, y| {
            let r = (x * 255 / w) as u8;
            let g = (y * 255 / h) as u8;
            let b = ((x + y + shift) % 256) as u8;
            Rgba([r, g, b, 255])
        }))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.open_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for PatternStream {
    fn drop(&mut self) {
        self.stop();
    }
}
