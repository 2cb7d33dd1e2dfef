mod config;
mod matcher;
mod report;
mod tally;

use clap::Parser;
use colored::Colorize;
use config::Config;
use std::path::PathBuf;

/// A CLI tool that scans firewall/gateway logs and writes traffic and
/// intrusion reports
#[derive(Parser, Debug)]
#[command(
    name = "gateway_reporter",
    author,
    version,
    about = "Scans a firewall/gateway log and generates traffic and intrusion reports"
)]
struct Args {
    /// Path to the gateway log file to scan
    #[arg(value_name = "LOG_FILE")]
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    // A missing or unusable path is reported to the user but is not an
    // error exit: the tool simply has nothing to do.
    let Some(log_path) = args.file else {
        eprintln!("Error: the file path of the gateway log is not provided!");
        return;
    };
    if !log_path.exists() {
        eprintln!("Error: file '{}' does not exist!", log_path.display());
        return;
    }

    let config = Config::new(log_path);
    if let Err(e) = run(&config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Tally the log, then write one traffic report per high-traffic port,
/// the invalid-user report, and the watched source address log.
fn run(config: &Config) -> Result<(), report::ReportError> {
    let traffic = tally::tally_port_traffic(&config.log_path)?;
    report::print_traffic_summary(&traffic, config.threshold);

    for port in tally::ports_meeting_threshold(&traffic, config.threshold) {
        let path = report::generate_port_traffic_report(config, &port)?;
        println!("  {} wrote '{}'", "✓".green(), path.display());
    }

    let path = report::generate_invalid_user_report(config)?;
    println!("  {} wrote '{}'", "✓".green(), path.display());

    let path = report::generate_source_ip_log(config, config::WATCHED_SOURCE_IP)?;
    println!("  {} wrote '{}'", "✓".green(), path.display());

    Ok(())
}
