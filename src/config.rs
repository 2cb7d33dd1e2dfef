use std::path::PathBuf;

/// Ports tallied at least this many times get their own traffic report.
pub const DEFAULT_TRAFFIC_THRESHOLD: u64 = 100;

/// Source address whose traffic is always extracted into its own log.
pub const WATCHED_SOURCE_IP: &str = "220.195.35.40";

/// Everything the report generators need to know about one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway log file under analysis
    pub log_path: PathBuf,
    /// Directory the report files are written to
    pub output_dir: PathBuf,
    /// Minimum tally for a port to earn a traffic report
    pub threshold: u64,
}

impl Config {
    /// Build a run configuration with the default threshold, writing
    /// reports to the current working directory.
    pub fn new(log_path: PathBuf) -> Self {
        Self {
            log_path,
            output_dir: PathBuf::from("."),
            threshold: DEFAULT_TRAFFIC_THRESHOLD,
        }
    }
}
