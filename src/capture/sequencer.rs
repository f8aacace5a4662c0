//! Capture sequencer - N snapshots, each optionally preceded by a countdown.
//!
//! Takes happen strictly in order. A failed shot aborts the run and nothing
//! captured so far is returned.

use log::{debug, info};
use std::time::Duration;

use super::clock::Clock;
use super::device::FrameSource;
use crate::core::EventEmitter;
use crate::core::events::{CountdownCleared, CountdownTick, SnapshotTaken};
use crate::entities::Snapshot;
use crate::error::PhotoboothError;

const TICK: Duration = Duration::from_secs(1);

/// Run a capture sequence of `takes` shots with `countdown_secs` per shot.
///
/// The source's dimensions are checked once up front; they are stable for the
/// life of a stream.
pub fn run_sequence(
    source: &mut dyn FrameSource,
    takes: usize,
    countdown_secs: u32,
    clock: &dyn Clock,
    events: &EventEmitter,
) -> Result<Vec<Snapshot>, PhotoboothError> {
    if takes == 0 {
        return Err(PhotoboothError::InvalidSettings(
            "take count must be at least 1".to_string(),
        ));
    }

    let (w, h) = source.dimensions();
    if w == 0 || h == 0 || !source.is_active() {
        return Err(PhotoboothError::FrameSourceNotReady);
    }

    info!(
        "Capturing {} shots at {}x{} ({}s countdown)",
        takes, w, h, countdown_secs
    );

    let mut snapshots = Vec::with_capacity(takes);
    for take in 1..=takes {
        if countdown_secs > 0 {
            for remaining in (1..=countdown_secs).rev() {
                events.emit(CountdownTick { take, remaining });
                clock.sleep(TICK);
            }
            events.emit(CountdownCleared { take });
        }

        let image = source
            .snapshot()
            .map_err(|e| PhotoboothError::CaptureFailed {
                take,
                reason: e.to_string(),
            })?;
        debug!("Snapshot {}/{} taken", take, takes);
        events.emit(SnapshotTaken {
            take,
            width: image.width(),
            height: image.height(),
        });
        snapshots.push(Snapshot::new(take, image));
    }

    Ok(snapshots)
}
