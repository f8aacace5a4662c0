use clap::Parser;
use std::path::PathBuf;

use crate::entities::Layout;

const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Target: ",
    std::env::consts::ARCH,
    "-",
    std::env::consts::OS
);

/// Headless photobooth: countdown, capture, compose, save the strip
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Number of shots in the strip (1-4)
    #[arg(short = 'n', long = "takes", value_name = "N")]
    pub takes: Option<usize>,

    /// Countdown before each shot, in whole seconds (0 = no countdown)
    #[arg(short = 'c', long = "countdown", value_name = "SECS")]
    pub countdown: Option<u32>,

    /// Strip layout to download: vertical | horizontal
    #[arg(short = 'L', long = "layout", value_name = "LAYOUT")]
    pub layout: Option<Layout>,

    /// Overlay name or file from the catalog ("None" for unframed)
    #[arg(short = 'O', long = "overlay", value_name = "NAME")]
    pub overlay: Option<String>,

    /// Camera source: "pattern" for the test pattern, or a directory of stills
    #[arg(short = 's', long = "source", value_name = "pattern|DIR", default_value = "pattern")]
    pub source: String,

    /// Use the mobile constraint profiles
    #[arg(long = "mobile")]
    pub mobile: bool,

    /// Output directory for the PNG strip
    #[arg(short = 'o', long = "out", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Save both layouts instead of only the selected one
    #[arg(long = "both")]
    pub both: bool,

    /// Don't actually wait during countdowns
    #[arg(long = "instant")]
    pub instant: bool,

    /// List the overlay catalog and exit
    #[arg(long = "list-overlays")]
    pub list_overlays: bool,

    /// Enable logging to file (default: photobooth.log in the data dir)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
