//! Camera acquisition - first-success-wins negotiation over constraint profiles.
//!
//! [`Camera`] owns the single live [`FrameSource`]. Any previously held stream is
//! stopped before a new negotiation starts, and a stream that opens but never
//! becomes ready is stopped before moving on, so at most one device handle is
//! ever open.
//!
//! The readiness deadline is enforced here, not by the backends: a freshly opened
//! stream is polled on the injected [`Clock`] until it reports non-zero dimensions
//! or the deadline passes.

use log::{debug, info, warn};
use std::time::Duration;

use super::clock::Clock;
use super::device::{CameraDevice, FrameSource};
use super::profiles::{ConstraintProfile, ensure_permissive};
use crate::error::{CameraCause, DeviceError, DeviceErrorKind, PhotoboothError};

/// Default wait for stream metadata
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(10);

/// Gap between readiness polls
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stream negotiated for one profile.
pub struct Negotiated {
    pub stream: Box<dyn FrameSource>,
    pub profile: ConstraintProfile,
}

/// Poll `stream` until it is ready with non-zero dimensions.
///
/// The last poll happens exactly at `timeout`; a stream still not ready then
/// fails with [`DeviceErrorKind::Timeout`].
fn await_ready(
    stream: &mut dyn FrameSource,
    timeout: Duration,
    clock: &dyn Clock,
) -> Result<(), DeviceError> {
    let mut waited = Duration::ZERO;
    loop {
        if stream.poll_ready()? {
            let (w, h) = stream.dimensions();
            if w > 0 && h > 0 {
                debug!("Stream ready at {}x{} after {:?}", w, h, waited);
                return Ok(());
            }
        }
        if waited >= timeout {
            return Err(DeviceError::timeout("stream metadata"));
        }
        let step = READY_POLL_INTERVAL.min(timeout - waited);
        clock.sleep(step);
        waited += step;
    }
}

/// Try `profiles` in order against `device`; first stream that becomes ready wins.
///
/// Fails with the classification of the last profile's error.
pub fn negotiate(
    device: &mut dyn CameraDevice,
    profiles: &[ConstraintProfile],
    ready_timeout: Duration,
    clock: &dyn Clock,
) -> Result<Negotiated, PhotoboothError> {
    let mut last_error: Option<DeviceError> = None;

    for profile in profiles {
        debug!("Trying camera profile '{}' on {}", profile.label, device.name());

        let mut stream = match device.open(profile) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Camera profile '{}' failed: {}", profile.label, e);
                last_error = Some(e);
                continue;
            }
        };

        if let Err(e) = await_ready(stream.as_mut(), ready_timeout, clock) {
            warn!("Camera profile '{}' never became ready: {}", profile.label, e);
            stream.stop();
            last_error = Some(e);
            continue;
        }

        return Ok(Negotiated {
            stream,
            profile: profile.clone(),
        });
    }

    let err = last_error.unwrap_or_else(|| {
        DeviceError::new(DeviceErrorKind::Other, "all camera constraints failed")
    });
    Err(PhotoboothError::CameraUnavailable(
        CameraCause::from(err.kind),
        err.message,
    ))
}

/// Holder of the one active camera stream.
pub struct Camera {
    stream: Option<Box<dyn FrameSource>>,
    profile: Option<ConstraintProfile>,
    ready_timeout: Duration,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_READY_TIMEOUT)
    }
}

impl Camera {
    pub fn new(ready_timeout: Duration) -> Self {
        Self {
            stream: None,
            profile: None,
            ready_timeout,
        }
    }

    /// Stop whatever is held, then negotiate a fresh stream.
    ///
    /// An empty or non-permissive list gets the "any camera" profile appended.
    pub fn acquire(
        &mut self,
        device: &mut dyn CameraDevice,
        profiles: &[ConstraintProfile],
        clock: &dyn Clock,
    ) -> Result<&mut dyn FrameSource, PhotoboothError> {
        self.release();

        let profiles = ensure_permissive(profiles.to_vec());
        let negotiated = negotiate(device, &profiles, self.ready_timeout, clock)?;
        let (w, h) = negotiated.stream.dimensions();
        info!(
            "Camera started with profile '{}' at {}x{}",
            negotiated.profile.label, w, h
        );

        self.profile = Some(negotiated.profile);
        let stream = self.stream.insert(negotiated.stream);
        Ok(stream.as_mut())
    }

    /// Re-acquire only if no healthy stream is held (visibility restore).
    ///
    /// Returns `true` if a new stream was negotiated.
    pub fn ensure_active(
        &mut self,
        device: &mut dyn CameraDevice,
        profiles: &[ConstraintProfile],
        clock: &dyn Clock,
    ) -> Result<bool, PhotoboothError> {
        if self.is_active() {
            debug!("Camera already active, nothing to restore");
            return Ok(false);
        }
        self.acquire(device, profiles, clock)?;
        Ok(true)
    }

    /// Stop the held stream, if any.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            debug!("Stopping camera stream");
            stream.stop();
        }
        self.profile = None;
    }

    pub fn is_active(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    pub fn source(&mut self) -> Option<&mut dyn FrameSource> {
        match self.stream.as_mut() {
            Some(stream) => Some(stream.as_mut()),
            None => None,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().map(|s| s.dimensions())
    }

    /// Profile the current stream was negotiated with
    pub fn profile(&self) -> Option<&ConstraintProfile> {
        self.profile.as_ref()
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.release();
    }
}
