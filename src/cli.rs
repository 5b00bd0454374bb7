use clap::Parser;
use std::path::PathBuf;

// Build version with storage backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Store:  JSON file -> session scratch -> memory fallback\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Video tagging timeline engine - inspect and export stored timelines
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Video id to operate on (timelines are keyed by this)
    #[arg(value_name = "VIDEO_ID")]
    pub video_id: Option<String>,

    /// Print the stored timeline for VIDEO_ID
    #[arg(short = 'L', long = "list")]
    pub list: bool,

    /// Export the stored timeline for VIDEO_ID to CSV (default: actions.csv)
    #[arg(short = 'e', long = "export", value_name = "FILE")]
    pub export: Option<Option<PathBuf>>,

    /// Print the team registry
    #[arg(short = 't', long = "teams")]
    pub teams: bool,

    /// Add a team to the registry (can be specified multiple times)
    #[arg(long = "add-team", value_name = "NAME")]
    pub add_teams: Vec<String>,

    /// Remove a team from the registry (can be specified multiple times)
    #[arg(long = "remove-team", value_name = "NAME")]
    pub remove_teams: Vec<String>,

    /// Enable debug logging to file (default: stderr)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
