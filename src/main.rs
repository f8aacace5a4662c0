use photobooth::capture::{
    CameraDevice, Clock, DeviceTier, PatternDevice, SimulatedClock, StillsDevice, SystemClock,
};
use photobooth::cli::Args;
use photobooth::config::{self, BoothSettings};
use photobooth::core::EventBus;
use photobooth::core::events::{CountdownCleared, CountdownTick, SnapshotTaken};
use photobooth::entities::{FileOverlayLoader, Layout};
use photobooth::session::Session;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::io::Write;
use std::path::PathBuf;

fn init_logging(args: &Args, path_config: &config::PathConfig) -> Result<()> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Respects RUST_LOG if set
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

/// Settings file values, overridden by whatever was given on the command line.
fn apply_overrides(settings: &mut BoothSettings, args: &Args) {
    if let Some(takes) = args.takes {
        settings.takes = takes;
    }
    if let Some(secs) = args.countdown {
        settings.countdown_secs = secs;
    }
    if let Some(layout) = args.layout {
        settings.layout = layout;
    }
    if let Some(overlay) = &args.overlay {
        settings.overlay = overlay.clone();
    }
    if args.mobile {
        settings.device_tier = DeviceTier::Mobile;
    }
    if let Some(dir) = &args.out_dir {
        settings.output_dir = dir.clone();
    }
}

fn open_device(source: &str) -> Box<dyn CameraDevice> {
    if source.eq_ignore_ascii_case("pattern") {
        Box::new(PatternDevice::default())
    } else {
        Box::new(StillsDevice::new(PathBuf::from(source)))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }
    init_logging(&args, &path_config)?;
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(config::SETTINGS_FILE, &path_config);
    info!("Settings path: {}", settings_path.display());
    let mut settings = BoothSettings::load(&settings_path);
    apply_overrides(&mut settings, &args);

    if args.list_overlays {
        for entry in settings.overlays.entries() {
            if entry.is_none() {
                println!("{}", entry.name);
            } else {
                println!("{} ({})", entry.name, entry.file);
            }
        }
        return Ok(());
    }

    let bus = EventBus::new();
    bus.subscribe::<CountdownTick, _>(|t| {
        print!("{}... ", t.remaining);
        let _ = std::io::stdout().flush();
    });
    bus.subscribe::<CountdownCleared, _>(|_| println!());
    let takes = settings.takes;
    bus.subscribe::<SnapshotTaken, _>(move |s| println!("Snap! {}/{}", s.take, takes));

    let loader = FileOverlayLoader::new(config::config_dir(&path_config));
    let output_dir = settings.output_dir.clone();
    let mut session = Session::new(settings, Box::new(loader), bus.emitter())?;

    let clock: Box<dyn Clock> = if args.instant {
        Box::new(SimulatedClock::new())
    } else {
        Box::new(SystemClock)
    };

    let mut device = open_device(&args.source);
    if let Err(e) = session.start(device.as_mut(), clock.as_ref()) {
        let msg = e.user_message();
        return Err(anyhow::Error::new(e).context(msg));
    }

    if let Err(e) = session.capture(clock.as_ref()) {
        let msg = e.user_message();
        session.shutdown();
        return Err(anyhow::Error::new(e).context(msg));
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let saved = if args.both {
        Layout::ALL
            .iter()
            .map(|&layout| session.export(&output_dir, layout))
            .collect::<Result<Vec<_>, _>>()
    } else {
        session.download(&output_dir).map(|p| vec![p])
    };
    session.shutdown();

    for path in saved? {
        println!("Saved {}", path.display());
    }
    Ok(())
}
