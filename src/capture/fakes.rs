//! Scripted camera for unit tests.

use image::{Rgba, RgbaImage};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::device::{CameraDevice, FrameSource};
use super::profiles::ConstraintProfile;
use crate::error::{DeviceError, DeviceErrorKind};

#[derive(Default)]
struct Shared {
    opened: Vec<String>,
    live: usize,
    max_live: usize,
    generation: usize,
}

/// Device whose failures are scripted per profile label.
pub(crate) struct FakeDevice {
    size: (u32, u32),
    open_failures: HashMap<String, DeviceErrorKind>,
    ready_failures: HashMap<String, DeviceErrorKind>,
    ready_delays: HashMap<String, usize>,
    snapshot_failure: Option<usize>,
    shared: Rc<RefCell<Shared>>,
}

impl FakeDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            open_failures: HashMap::new(),
            ready_failures: HashMap::new(),
            ready_delays: HashMap::new(),
            snapshot_failure: None,
            shared: Rc::new(RefCell::new(Shared::default())),
        }
    }

    pub fn fail_open(mut self, label: &str, kind: DeviceErrorKind) -> Self {
        self.open_failures.insert(label.to_string(), kind);
        self
    }

    pub fn fail_ready(mut self, label: &str, kind: DeviceErrorKind) -> Self {
        self.ready_failures.insert(label.to_string(), kind);
        self
    }

    /// Streams for `label` report (0, 0) and not-ready for the first `polls` polls
    pub fn ready_after(mut self, label: &str, polls: usize) -> Self {
        self.ready_delays.insert(label.to_string(), polls);
        self
    }

    /// Streams for `label` never get their metadata
    pub fn never_ready(self, label: &str) -> Self {
        self.ready_after(label, usize::MAX)
    }

    /// Fail the n-th snapshot (1-based) of every stream
    pub fn fail_snapshot(mut self, n: usize) -> Self {
        self.snapshot_failure = Some(n);
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.shared.borrow().opened.clone()
    }

    pub fn live(&self) -> usize {
        self.shared.borrow().live
    }

    pub fn max_live(&self) -> usize {
        self.shared.borrow().max_live
    }

    /// Simulate the OS ending every current stream (tab hidden, device unplugged)
    pub fn kill_streams(&self) {
        self.shared.borrow_mut().generation += 1;
    }
}

impl CameraDevice for FakeDevice {
    fn open(&mut self, profile: &ConstraintProfile) -> Result<Box<dyn FrameSource>, DeviceError> {
        let mut shared = self.shared.borrow_mut();
        shared.opened.push(profile.label.clone());
        if let Some(kind) = self.open_failures.get(&profile.label) {
            return Err(DeviceError::new(*kind, format!("scripted {}", profile.label)));
        }
        shared.live += 1;
        shared.max_live = shared.max_live.max(shared.live);

        Ok(Box::new(FakeStream {
            size: self.size,
            ready_failure: self.ready_failures.get(&profile.label).copied(),
            pending_polls: self.ready_delays.get(&profile.label).copied().unwrap_or(0),
            snapshot_failure: self.snapshot_failure,
            snapshots: 0,
            stopped: false,
            generation: shared.generation,
            shared: Rc::clone(&self.shared),
        }))
    }

    fn name(&self) -> String {
        "fake".to_string()
    }
}

struct FakeStream {
    size: (u32, u32),
    ready_failure: Option<DeviceErrorKind>,
    pending_polls: usize,
    snapshot_failure: Option<usize>,
    snapshots: usize,
    stopped: bool,
    generation: usize,
    shared: Rc<RefCell<Shared>>,
}

impl FrameSource for FakeStream {
    fn dimensions(&self) -> (u32, u32) {
        if self.pending_polls > 0 {
            (0, 0)
        } else {
            self.size
        }
    }

    fn poll_ready(&mut self) -> Result<bool, DeviceError> {
        if let Some(kind) = self.ready_failure {
            return Err(DeviceError::new(kind, "scripted readiness failure"));
        }
        if self.pending_polls > 0 {
            self.pending_polls -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    /// Each snapshot is filled with its 1-based index in the red channel
    fn snapshot(&mut self) -> Result<RgbaImage, DeviceError> {
        self.snapshots += 1;
        if self.snapshot_failure == Some(self.snapshots) {
            return Err(DeviceError::new(DeviceErrorKind::Busy, "scripted snapshot failure"));
        }
        let shade = self.snapshots as u8;
        Ok(RgbaImage::from_pixel(
            self.size.0,
            self.size.1,
            Rgba([shade, 0, 0, 255]),
        ))
    }

    fn is_active(&self) -> bool {
        !self.stopped && self.shared.borrow().generation == self.generation
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.shared.borrow_mut().live -= 1;
        }
    }
}
