use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, value_parser};

use crate::config::default::{DEFAULT_CACHE_DIR, DEFAULT_FOUND_DIR, DEFAULT_WAIT_MS};
use crate::serial::SerialNumber;

/// rocascan - Harvest CA certificates by serial number and scan them for ROCA weak keys
#[derive(Parser, Debug)]
#[command(author, version, about = "rocascan - Harvest CA certificates by serial number and scan them for ROCA weak keys", long_about = None)]
pub struct Cli {
    /// Global log level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Log to file (in addition to stdout)
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub log_file: bool,

    /// Log file path (default: ~/.rocascan/logs/rocascan.log)
    #[arg(long, value_name = "FILE", value_parser = value_parser!(PathBuf))]
    pub log_file_path: Option<PathBuf>,

    /// Suppress non-error logs
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub quiet: bool,

    /// Save the run report to a JSON file
    #[arg(short, long, value_name = "FILE", value_parser = value_parser!(PathBuf))]
    pub output: Option<PathBuf>,

    /// Suppress the summary on stdout (use with --output)
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub no_stdout: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Command,
}

/// Log level
#[derive(Copy, Clone, Debug, ValueEnum, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    pub fn to_level_filter(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download and analyze a range of serial numbers
    Scan(ScanArgs),

    /// Analyze certificates already in the cache (no network access)
    Analyze(AnalyzeArgs),

    /// Build a tab-separated index of certificate files
    Index(IndexArgs),
}

/// Range scan arguments
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// First serial number (inclusive)
    #[arg(long, value_parser = value_parser!(SerialNumber))]
    pub from: SerialNumber,

    /// Last serial number (inclusive). Below --from walks the range downwards
    #[arg(long, value_parser = value_parser!(SerialNumber))]
    pub to: SerialNumber,

    /// Cache folder
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache: PathBuf,

    /// Folder receiving vulnerable certificates
    #[arg(long, default_value = DEFAULT_FOUND_DIR)]
    pub found: PathBuf,

    /// Wait after each request to the portal (ms)
    #[arg(short = 'w', long, default_value_t = DEFAULT_WAIT_MS)]
    pub wait_ms: u64,

    /// Only fill the cache, skip analysis
    #[arg(long, action = ArgAction::SetTrue)]
    pub download_only: bool,

    /// Portal search endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// HTTP timeout in ms (default: none)
    #[arg(long, value_parser = value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Disable the progress bar
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_progress: bool,
}

/// Cache analysis arguments
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Cache folder
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache: PathBuf,

    /// Folder receiving vulnerable certificates
    #[arg(long, default_value = DEFAULT_FOUND_DIR)]
    pub found: PathBuf,

    /// Disable the progress indicator
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_progress: bool,
}

/// Index arguments
#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Folder to index; index.csv is written into it
    #[arg(required = true)]
    pub folder: PathBuf,

    /// Disable the progress indicator
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_command() {
        let cli = Cli::try_parse_from([
            "rocascan", "scan", "--from", "200", "--to", "100", "-w", "0", "--download-only",
        ])
        .unwrap();
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.from.value(), 200);
                assert_eq!(args.to.value(), 100);
                assert_eq!(args.wait_ms, 0);
                assert!(args.download_only);
                assert_eq!(args.cache, PathBuf::from("cache"));
                assert_eq!(args.found, PathBuf::from("found"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_out_of_range_serial() {
        assert!(Cli::try_parse_from(["rocascan", "scan", "--from", "100000000", "--to", "1"]).is_err());
    }
}
