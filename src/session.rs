//! Session controller - selection state, the live camera and the latest result.
//!
//! The shell calls the triggers (`start`, `capture`, `set_layout`, `download`,
//! `reset`) and listens on the event bus for progress. All state lives here;
//! the pipeline stages below it take what they need as parameters.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::capture::{
    Camera, CameraDevice, Clock, ConstraintProfile, default_profiles, run_sequence,
};
use crate::config::{BoothSettings, TAKE_CHOICES};
use crate::core::EventEmitter;
use crate::core::events::{
    CameraFailed, CameraStarted, CameraStopped, CompositeReady, Downloaded, LayoutChanged,
    SessionReset,
};
use crate::entities::{CompositePair, Layout, OverlayEntry, OverlayLoader, StripImage, compose_pair};
use crate::error::PhotoboothError;

/// What the user has picked.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub overlay: OverlayEntry,
    pub takes: usize,
    pub countdown_secs: u32,
    pub layout: Layout,
}

pub struct Session {
    settings: BoothSettings,
    selection: Selection,
    profiles: Vec<ConstraintProfile>,
    camera: Camera,
    latest: Option<CompositePair>,
    loader: Box<dyn OverlayLoader>,
    events: EventEmitter,
}

impl Session {
    pub fn new(
        settings: BoothSettings,
        loader: Box<dyn OverlayLoader>,
        events: EventEmitter,
    ) -> Result<Self, PhotoboothError> {
        settings.validate().map_err(PhotoboothError::InvalidSettings)?;
        let overlay = settings
            .overlays
            .find(&settings.overlay)
            .cloned()
            .ok_or_else(|| PhotoboothError::InvalidSettings(settings.overlay.clone()))?;

        let selection = Selection {
            overlay,
            takes: settings.takes,
            countdown_secs: settings.countdown_secs,
            layout: settings.layout,
        };

        Ok(Self {
            profiles: default_profiles(settings.device_tier),
            camera: Camera::new(settings.ready_timeout()),
            selection,
            settings,
            latest: None,
            loader,
            events,
        })
    }

    /// Replace the constraint table (defaults come from the device tier).
    pub fn set_profiles(&mut self, profiles: Vec<ConstraintProfile>) {
        self.profiles = profiles;
    }

    pub fn profiles(&self) -> &[ConstraintProfile] {
        &self.profiles
    }

    // ========== Camera ==========

    /// Acquire the camera, replacing any stream already held.
    ///
    /// `clock` paces the readiness wait of each profile.
    pub fn start(
        &mut self,
        device: &mut dyn CameraDevice,
        clock: &dyn Clock,
    ) -> Result<(), PhotoboothError> {
        let result = self
            .camera
            .acquire(device, &self.profiles, clock)
            .map(|_| ());
        self.report_camera(result)
    }

    /// Visibility restore: re-acquire only if the stream died.
    pub fn restore(
        &mut self,
        device: &mut dyn CameraDevice,
        clock: &dyn Clock,
    ) -> Result<bool, PhotoboothError> {
        match self.camera.ensure_active(device, &self.profiles, clock) {
            Ok(false) => Ok(false),
            result => {
                debug!("Camera was inactive, restoring");
                self.report_camera(result.map(|_| ()))?;
                Ok(true)
            }
        }
    }

    fn report_camera(&self, result: Result<(), PhotoboothError>) -> Result<(), PhotoboothError> {
        match result {
            Ok(()) => {
                let (width, height) = self.camera.dimensions().unwrap_or_default();
                let profile = self
                    .camera
                    .profile()
                    .map(|p| p.label.clone())
                    .unwrap_or_default();
                self.events.emit(CameraStarted {
                    profile,
                    width,
                    height,
                });
                Ok(())
            }
            Err(e) => {
                if let PhotoboothError::CameraUnavailable(cause, message) = &e {
                    self.events.emit(CameraFailed {
                        cause: *cause,
                        message: message.clone(),
                    });
                }
                Err(e)
            }
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    // ========== Capture ==========

    /// Run a full capture and publish a new result pair.
    ///
    /// On any failure the previous result is left as it was.
    pub fn capture(&mut self, clock: &dyn Clock) -> Result<&CompositePair, PhotoboothError> {
        let source = self
            .camera
            .source()
            .ok_or(PhotoboothError::FrameSourceNotReady)?;

        let snapshots = run_sequence(
            source,
            self.selection.takes,
            self.selection.countdown_secs,
            clock,
            &self.events,
        )?;

        let overlay = (!self.selection.overlay.is_none()).then_some(self.selection.overlay.file.as_str());
        let pair = compose_pair(&snapshots, overlay, self.loader.as_ref())?;
        drop(snapshots);

        self.events.emit(CompositeReady {
            takes: pair.slots(),
            vertical: pair.vertical().dimensions(),
            horizontal: pair.horizontal().dimensions(),
        });
        Ok(self.latest.insert(pair))
    }

    // ========== Selection ==========

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn overlays(&self) -> &[OverlayEntry] {
        self.settings.overlays.entries()
    }

    pub fn select_overlay(&mut self, key: &str) -> Result<(), PhotoboothError> {
        let entry = self
            .settings
            .overlays
            .find(key)
            .cloned()
            .ok_or_else(|| PhotoboothError::InvalidSettings(format!("unknown overlay '{}'", key)))?;
        debug!("Overlay selected: {}", entry.name);
        self.selection.overlay = entry;
        Ok(())
    }

    pub fn set_takes(&mut self, takes: usize) -> Result<(), PhotoboothError> {
        if !TAKE_CHOICES.contains(&takes) {
            return Err(PhotoboothError::InvalidSettings(format!(
                "takes must be {}..={}, got {}",
                TAKE_CHOICES.start(),
                TAKE_CHOICES.end(),
                takes
            )));
        }
        self.selection.takes = takes;
        Ok(())
    }

    pub fn set_countdown(&mut self, secs: u32) {
        self.selection.countdown_secs = secs;
    }

    /// Switch the displayed layout. Returns the stored strip for it, if any;
    /// nothing is recaptured or recomposed.
    pub fn set_layout(&mut self, layout: Layout) -> Option<&StripImage> {
        if self.selection.layout != layout {
            self.selection.layout = layout;
            self.events.emit(LayoutChanged(layout));
        }
        self.current_strip()
    }

    // ========== Results ==========

    pub fn latest(&self) -> Option<&CompositePair> {
        self.latest.as_ref()
    }

    /// Strip for the selected layout
    pub fn current_strip(&self) -> Option<&StripImage> {
        self.latest.as_ref().map(|p| p.get(self.selection.layout))
    }

    /// Write the strip for `layout` into `dir` under its contract file name.
    pub fn export(&self, dir: &Path, layout: Layout) -> Result<PathBuf, PhotoboothError> {
        let strip = self
            .latest
            .as_ref()
            .map(|p| p.get(layout))
            .ok_or(PhotoboothError::NothingToDownload)?;

        let png = strip.encode_png()?;
        let path = dir.join(strip.file_name());
        std::fs::write(&path, png)?;
        info!("Saved {} strip to {}", layout, path.display());
        self.events.emit(Downloaded {
            layout,
            path: path.clone(),
        });
        Ok(path)
    }

    /// Download the selected layout, then reset if configured to.
    pub fn download(&mut self, dir: &Path) -> Result<PathBuf, PhotoboothError> {
        let path = self.export(dir, self.selection.layout)?;
        if self.settings.reset_after_download {
            self.reset();
        }
        Ok(path)
    }

    /// Back to the initial state: no result, vertical layout. Camera stays up.
    pub fn reset(&mut self) {
        self.latest = None;
        self.selection.layout = Layout::Vertical;
        self.events.emit(SessionReset);
    }

    /// Stop the camera.
    pub fn shutdown(&mut self) {
        if self.camera.is_active() {
            self.camera.release();
            self.events.emit(CameraStopped);
        }
    }
}
