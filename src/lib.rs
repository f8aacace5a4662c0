//! PHOTOBOOTH - capture a burst of stills and compose them into photo strips
//!
//! Pipeline: camera acquisition (constraint fallback) → timed capture sequence →
//! strip compositor (vertical + horizontal, optional overlay) → PNG download.

// Core plumbing (event bus, events)
pub mod core;

pub mod capture;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod session;

pub use capture::{Camera, CameraDevice, Clock, FrameSource, PatternDevice, SimulatedClock, StillsDevice, SystemClock};
pub use core::event_bus::{EventBus, EventEmitter, downcast_event};
pub use entities::{CompositePair, Layout, Snapshot, StripImage};
pub use error::{CameraCause, CompositionError, DeviceError, DeviceErrorKind, PhotoboothError};
pub use session::{Selection, Session};
