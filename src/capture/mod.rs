//! Capture side of the pipeline: camera negotiation and timed snapshots.
//!
//! - `profiles`: ordered constraint fallback table
//! - `device`: `CameraDevice` / `FrameSource` seams
//! - `acquisition`: `Camera`, owner of the single live stream
//! - `sequencer`: N shots with per-shot countdown
//! - `clock`: real and simulated time
//! - `pattern`, `stills`: built-in device backends

pub mod acquisition;
pub mod clock;
pub mod device;
pub mod pattern;
pub mod profiles;
pub mod sequencer;
pub mod stills;

#[cfg(test)]
pub(crate) mod fakes;

pub use acquisition::{Camera, DEFAULT_READY_TIMEOUT, negotiate};
pub use clock::{Clock, SimulatedClock, SystemClock};
pub use device::{CameraDevice, FrameSource};
pub use pattern::PatternDevice;
pub use profiles::{ConstraintProfile, DeviceTier, Facing, Ideal, default_profiles};
pub use sequencer::run_sequence;
pub use stills::StillsDevice;
