//! End-to-end scenarios through the public session API, using the built-in
//! pattern camera and overlays on disk.

use image::{Rgba, RgbaImage};
use photobooth::capture::{ConstraintProfile, Facing, Ideal, PatternDevice, SimulatedClock};
use photobooth::config::BoothSettings;
use photobooth::core::events::{CameraFailed, CompositeReady, CountdownTick, SnapshotTaken};
use photobooth::entities::{FileOverlayLoader, Layout, OverlayCatalog, OverlayEntry};
use photobooth::{EventBus, Session, downcast_event};
use std::path::PathBuf;
use std::time::Duration;

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn settings(takes: usize, countdown_secs: u32) -> BoothSettings {
    BoothSettings {
        takes,
        countdown_secs,
        overlays: OverlayCatalog::new(vec![
            OverlayEntry::new("None", ""),
            OverlayEntry::new("Border", "border.png"),
            OverlayEntry::new("Broken", "missing.png"),
        ]),
        ..BoothSettings::default()
    }
}

#[test]
fn test_three_shots_no_delay_no_overlay() {
    let dir = scratch("photobooth_it_three_shots");
    let bus = EventBus::new();
    let mut session = Session::new(
        settings(3, 0),
        Box::new(FileOverlayLoader::new(&dir)),
        bus.emitter(),
    )
    .unwrap();
    session.set_profiles(vec![ConstraintProfile::sized(
        "vga",
        Ideal::new(640),
        Ideal::new(480),
        None,
    )]);

    let mut camera = PatternDevice::new(1920, 1080);
    session.start(&mut camera, &SimulatedClock::new()).unwrap();

    let clock = SimulatedClock::new();
    let pair = session.capture(&clock).unwrap();
    assert_eq!(pair.vertical().dimensions(), (640, 1440));
    assert_eq!(pair.horizontal().dimensions(), (1920, 480));

    // Same shot in the same slot of both strips, capture order preserved
    let v = pair.vertical().image().clone();
    let h = pair.horizontal().image().clone();
    for i in 0..3u32 {
        assert_eq!(v.get_pixel(5, 480 * i + 7), h.get_pixel(640 * i + 5, 7));
    }
    assert_ne!(v.get_pixel(5, 7), v.get_pixel(5, 487));

    assert!(clock.sleeps().is_empty());
    let events = bus.poll();
    assert!(events.iter().all(|e| downcast_event::<CountdownTick>(e).is_none()));
    let shots: Vec<usize> = events
        .iter()
        .filter_map(|e| downcast_event::<SnapshotTaken>(e).map(|s| s.take))
        .collect();
    assert_eq!(shots, vec![1, 2, 3]);
}

#[test]
fn test_two_shots_with_countdown_and_overlay() {
    let dir = scratch("photobooth_it_countdown_overlay");
    RgbaImage::from_fn(16, 12, |x, y| {
        if x < 2 || y < 2 || x >= 14 || y >= 10 {
            Rgba([255, 215, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
    .save(dir.join("border.png"))
    .unwrap();

    let bus = EventBus::new();
    let mut session = Session::new(
        settings(2, 3),
        Box::new(FileOverlayLoader::new(&dir)),
        bus.emitter(),
    )
    .unwrap();
    session.set_profiles(vec![ConstraintProfile::any()]);
    session.select_overlay("Border").unwrap();

    let mut camera = PatternDevice::new(16, 12);
    session.start(&mut camera, &SimulatedClock::new()).unwrap();

    let clock = SimulatedClock::new();
    session.capture(&clock).unwrap();
    assert_eq!(clock.elapsed(), Duration::from_secs(6));

    let ticks: Vec<(usize, u32)> = bus
        .poll()
        .iter()
        .filter_map(|e| downcast_event::<CountdownTick>(e).map(|t| (t.take, t.remaining)))
        .collect();
    assert_eq!(ticks, vec![(1, 3), (1, 2), (1, 1), (2, 3), (2, 2), (2, 1)]);

    let gold = &Rgba([255, 215, 0, 255]);
    let pair = session.latest().unwrap();
    for i in 0..2u32 {
        assert_eq!(pair.vertical().image().get_pixel(0, 12 * i), gold);
        assert_eq!(pair.horizontal().image().get_pixel(16 * i + 15, 11), gold);
    }
}

#[test]
fn test_broken_overlay_matches_unframed() {
    let dir = scratch("photobooth_it_broken_overlay");
    let run = |overlay: &str| {
        let mut session = Session::new(
            settings(2, 0),
            Box::new(FileOverlayLoader::new(&dir)),
            EventBus::new().emitter(),
        )
        .unwrap();
        session.select_overlay(overlay).unwrap();
        let mut camera = PatternDevice::new(32, 24);
        session.start(&mut camera, &SimulatedClock::new()).unwrap();
        session.capture(&SimulatedClock::new()).unwrap().clone()
    };

    let plain = run("None");
    let broken = run("Broken");
    assert_eq!(plain.vertical().image(), broken.vertical().image());
    assert_eq!(plain.horizontal().image(), broken.horizontal().image());
}

#[test]
fn test_fallback_chain_reaches_permissive_profile() {
    let bus = EventBus::new();
    let mut session =
        Session::new(settings(1, 0), Box::new(FileOverlayLoader::new(".")), bus.emitter()).unwrap();
    session.set_profiles(vec![
        ConstraintProfile::sized("hd", Ideal::new(1280), Ideal::new(720), Some(Facing::User)),
        ConstraintProfile::facing("user", Facing::User),
        ConstraintProfile::any(),
    ]);

    // Only a rear camera: both user-facing profiles are overconstrained
    let mut camera = PatternDevice::new(800, 600).facing(Facing::Environment);
    session.start(&mut camera, &SimulatedClock::new()).unwrap();
    assert_eq!(
        session.camera().profile().map(|p| p.label.as_str()),
        Some("any")
    );
    assert_eq!(camera.open_streams(), 1);

    session.capture(&SimulatedClock::new()).unwrap();
    assert!(
        bus.poll()
            .iter()
            .all(|e| downcast_event::<CameraFailed>(e).is_none())
    );
    assert!(
        session.latest().is_some(),
        "fallback camera should produce a strip"
    );
}

#[test]
fn test_restart_keeps_one_stream_open() {
    let mut session = Session::new(
        settings(1, 0),
        Box::new(FileOverlayLoader::new(".")),
        EventBus::new().emitter(),
    )
    .unwrap();
    let mut camera = PatternDevice::new(64, 48);
    session.start(&mut camera, &SimulatedClock::new()).unwrap();
    session.start(&mut camera, &SimulatedClock::new()).unwrap();
    assert_eq!(camera.open_streams(), 1);

    assert!(!session.restore(&mut camera, &SimulatedClock::new()).unwrap());
    session.shutdown();
    assert_eq!(camera.open_streams(), 0);
}

#[test]
fn test_layout_switch_and_download_both() {
    let dir = scratch("photobooth_it_download");
    let bus = EventBus::new();
    let mut booth = settings(2, 0);
    booth.reset_after_download = false;
    let mut session =
        Session::new(booth, Box::new(FileOverlayLoader::new(&dir)), bus.emitter()).unwrap();
    let mut camera = PatternDevice::new(20, 10);
    session.start(&mut camera, &SimulatedClock::new()).unwrap();
    session.capture(&SimulatedClock::new()).unwrap();

    let ready = bus
        .poll()
        .iter()
        .filter(|e| downcast_event::<CompositeReady>(e).is_some())
        .count();
    assert_eq!(ready, 1);

    assert_eq!(
        session.set_layout(Layout::Horizontal).map(|s| s.dimensions()),
        Some((40, 10))
    );
    let h = session.download(&dir).unwrap();
    assert_eq!(h.file_name().unwrap(), "photobooth_strip_horizontal.png");

    assert_eq!(
        session.set_layout(Layout::Vertical).map(|s| s.dimensions()),
        Some((20, 20))
    );
    let v = session.download(&dir).unwrap();
    assert_eq!(v.file_name().unwrap(), "photobooth_strip_vertical.png");
    assert_eq!(image::image_dimensions(&v).unwrap(), (20, 20));

    // No new snapshots were taken for either download
    assert!(
        bus.poll()
            .iter()
            .all(|e| downcast_event::<SnapshotTaken>(e).is_none())
    );
}
