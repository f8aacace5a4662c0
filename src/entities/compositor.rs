//! Strip compositor - lays snapshots out into vertical and horizontal strips.
//!
//! Pure: takes snapshots and an overlay loader, returns a [`CompositePair`],
//! touches nothing else. Both layouts are filled in one pass over the slots, so
//! each slot gets the same snapshot and the same decoded overlay in both strips.
//!
//! Overlay policy is per slot: if loading fails for a slot, that slot stays
//! unframed in both strips, the failure is logged and the run continues.

use image::{RgbaImage, imageops};
use log::{debug, info, warn};

use super::overlay::OverlayLoader;
use super::strip::{CompositePair, Layout, Snapshot, StripImage};
use crate::error::CompositionError;

/// Compose both layouts from one snapshot run.
///
/// `overlay` is the overlay identifier to draw atop every slot (`None` or an
/// empty string means unframed).
pub fn compose_pair(
    snapshots: &[Snapshot],
    overlay: Option<&str>,
    loader: &dyn OverlayLoader,
) -> Result<CompositePair, CompositionError> {
    let slot = check_slots(snapshots)?;
    let count = snapshots.len() as u32;
    let overlay = overlay.filter(|o| !o.is_empty());

    debug!(
        "compose_pair: {} slots of {}x{}, overlay {:?}",
        count, slot.0, slot.1, overlay
    );

    let (vw, vh) = Layout::Vertical.canvas_size(slot, count);
    let (hw, hh) = Layout::Horizontal.canvas_size(slot, count);
    let mut vertical = RgbaImage::new(vw, vh);
    let mut horizontal = RgbaImage::new(hw, hh);

    for (i, snapshot) in snapshots.iter().enumerate() {
        let index = i as u32;
        let v_origin = Layout::Vertical.slot_origin(slot, index);
        let h_origin = Layout::Horizontal.slot_origin(slot, index);

        imageops::replace(&mut vertical, snapshot.image(), v_origin.0 as i64, v_origin.1 as i64);
        imageops::replace(&mut horizontal, snapshot.image(), h_origin.0 as i64, h_origin.1 as i64);

        if let Some(id) = overlay {
            match load_fitted(loader, id, slot) {
                Ok(frame) => {
                    blend_over(&mut vertical, &frame, v_origin);
                    blend_over(&mut horizontal, &frame, h_origin);
                }
                Err(e) => warn!("Overlay skipped for slot {}: {}", i + 1, e),
            }
        }
    }

    info!(
        "Composed {} shots: vertical {}x{}, horizontal {}x{}",
        count, vw, vh, hw, hh
    );

    Ok(CompositePair::new(
        StripImage::new(Layout::Vertical, snapshots.len(), vertical),
        StripImage::new(Layout::Horizontal, snapshots.len(), horizontal),
    ))
}

/// Compose a single layout. Same slot and overlay rules as [`compose_pair`].
pub fn compose(
    snapshots: &[Snapshot],
    overlay: Option<&str>,
    loader: &dyn OverlayLoader,
    layout: Layout,
) -> Result<StripImage, CompositionError> {
    let slot = check_slots(snapshots)?;
    let count = snapshots.len() as u32;
    let overlay = overlay.filter(|o| !o.is_empty());
    let (w, h) = layout.canvas_size(slot, count);
    let mut canvas = RgbaImage::new(w, h);

    for (i, snapshot) in snapshots.iter().enumerate() {
        let origin = layout.slot_origin(slot, i as u32);
        imageops::replace(&mut canvas, snapshot.image(), origin.0 as i64, origin.1 as i64);
        if let Some(id) = overlay {
            match load_fitted(loader, id, slot) {
                Ok(frame) => blend_over(&mut canvas, &frame, origin),
                Err(e) => warn!("Overlay skipped for slot {}: {}", i + 1, e),
            }
        }
    }

    Ok(StripImage::new(layout, snapshots.len(), canvas))
}

/// All snapshots must share the first one's size; returns that size.
fn check_slots(snapshots: &[Snapshot]) -> Result<(u32, u32), CompositionError> {
    let first = snapshots.first().ok_or(CompositionError::EmptySequence)?;
    let expected = first.dimensions();
    if expected.0 == 0 || expected.1 == 0 {
        return Err(CompositionError::SizeMismatch {
            index: 0,
            expected,
            actual: expected,
        });
    }
    for (index, s) in snapshots.iter().enumerate().skip(1) {
        if s.dimensions() != expected {
            return Err(CompositionError::SizeMismatch {
                index,
                expected,
                actual: s.dimensions(),
            });
        }
    }
    Ok(expected)
}

/// Load the overlay and stretch it over the slot if sizes differ.
fn load_fitted(
    loader: &dyn OverlayLoader,
    id: &str,
    slot: (u32, u32),
) -> Result<RgbaImage, CompositionError> {
    let img = loader.load(id)?;
    if img.dimensions() == slot {
        return Ok(img);
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(CompositionError::OverlayLoad {
            overlay: id.to_string(),
            reason: "overlay has no pixels".to_string(),
        });
    }
    debug!(
        "Scaling overlay {} from {}x{} to {}x{}",
        id,
        img.width(),
        img.height(),
        slot.0,
        slot.1
    );
    Ok(imageops::resize(&img, slot.0, slot.1, imageops::FilterType::Triangle))
}

/// Source-over blend of `top` onto `canvas` at `origin`, clipped to the canvas.
fn blend_over(canvas: &mut RgbaImage, top: &RgbaImage, origin: (u32, u32)) {
    let (cw, ch) = canvas.dimensions();
    let (tw, th) = top.dimensions();
    let overlap_w = tw.min(cw.saturating_sub(origin.0)) as usize;
    let overlap_h = th.min(ch.saturating_sub(origin.1)) as usize;
    if overlap_w == 0 || overlap_h == 0 {
        return;
    }

    let canvas_stride = cw as usize * 4;
    let top_stride = tw as usize * 4;
    let x0 = origin.0 as usize * 4;
    let dst: &mut [u8] = canvas;
    let src: &[u8] = top;

    for y in 0..overlap_h {
        let d_off = (origin.1 as usize + y) * canvas_stride + x0;
        let s_off = y * top_stride;
        blend_over_u8(
            &mut dst[d_off..d_off + overlap_w * 4],
            &src[s_off..s_off + overlap_w * 4],
        );
    }
}

/// Blend one RGBA8 row of `top` over `bottom` in place.
fn blend_over_u8(bottom: &mut [u8], top: &[u8]) {
    debug_assert_eq!(bottom.len(), top.len());

    for (b, t) in bottom.chunks_exact_mut(4).zip(top.chunks_exact(4)) {
        let top_alpha = t[3] as f32 / 255.0;
        if top_alpha <= 0.0 {
            continue;
        }
        let inv_alpha = 1.0 - top_alpha;
        for c in 0..3 {
            let out = b[c] as f32 / 255.0 * inv_alpha + t[c] as f32 / 255.0 * top_alpha;
            b[c] = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        let out_a = b[3] as f32 / 255.0 * inv_alpha + top_alpha;
        b[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}
