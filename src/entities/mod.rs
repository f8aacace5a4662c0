//! Entities module - the images that flow through the pipeline.
//!
//! - `strip`: snapshots, layouts, composed strips and the result pair
//! - `overlay`: decorative frame catalog and loading
//! - `compositor`: snapshots + overlay -> strips

pub mod compositor;
pub mod overlay;
pub mod strip;

pub use compositor::{compose, compose_pair};
pub use overlay::{FileOverlayLoader, OverlayCatalog, OverlayEntry, OverlayLoader};
pub use strip::{CompositePair, Layout, Snapshot, StripImage};
