use crate::config::Config;
use crate::matcher::{self, FilterError, FilterOptions};
use colored::Colorize;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

const THIN_SEP: &str =
    "────────────────────────────────────────────────────────────────────";

/// Pattern for invalid-user login attempts: date and time captures, then
/// the offending username and the dotted-quad address it came from.
const INVALID_USER_PATTERN: &str = r"(.*?\d) (\d+:\d+:\d+).*? user (.*?) from (\d+\.\d+\.\d+\.\d+)";

/// Errors that can occur while generating a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("could not write report: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not write report: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of a destination-port traffic report
#[derive(Debug, Serialize)]
struct PortTrafficRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Source IP address")]
    source_ip: String,
    #[serde(rename = "Destination IP address")]
    destination_ip: String,
    #[serde(rename = "Source port no")]
    source_port: String,
    #[serde(rename = "Destination port no")]
    destination_port: String,
}

/// One row of the invalid-user report
#[derive(Debug, Serialize)]
struct InvalidUserRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Username")]
    username: String,
    #[serde(rename = "IP Address")]
    ip_address: String,
}

/// Write a CSV report of all traffic to one destination port.
///
/// The port is fixed in the search pattern rather than re-captured; its
/// column is filled from the parameter. Rows append to
/// `destination_port_<port>_report.csv` in the configured output directory,
/// with the header emitted only when the file is first created. Returns the
/// path written.
pub fn generate_port_traffic_report(config: &Config, port: &str) -> Result<PathBuf, ReportError> {
    let report_path = config
        .output_dir
        .join(format!("destination_port_{port}_report.csv"));

    // The port becomes part of the pattern, so any regex metacharacters in
    // it must be neutralized first.
    let pattern = format!(
        r"(.*?\d) (.*?) .*?SRC=(.*?) DST=(.*?) .*?SPT=(.*?) DPT={} ",
        regex::escape(port)
    );
    let matches = matcher::filter_log(&config.log_path, &pattern, FilterOptions::default())?;

    let mut writer = report_writer(&report_path)?;
    for groups in &matches.captures {
        let [date, time, source_ip, destination_ip, source_port] = groups.as_slice() else {
            continue;
        };
        writer.serialize(PortTrafficRow {
            date: date.clone(),
            time: time.clone(),
            source_ip: source_ip.clone(),
            destination_ip: destination_ip.clone(),
            source_port: source_port.clone(),
            destination_port: port.to_string(),
        })?;
    }
    writer.flush()?;

    Ok(report_path)
}

/// Write a CSV report of invalid-user login attempts to
/// `invalid_users.csv` in the configured output directory. Returns the
/// path written.
pub fn generate_invalid_user_report(config: &Config) -> Result<PathBuf, ReportError> {
    let report_path = config.output_dir.join("invalid_users.csv");

    let matches =
        matcher::filter_log(&config.log_path, INVALID_USER_PATTERN, FilterOptions::default())?;

    let mut writer = report_writer(&report_path)?;
    for groups in &matches.captures {
        let [date, time, username, ip_address] = groups.as_slice() else {
            continue;
        };
        writer.serialize(InvalidUserRow {
            date: date.clone(),
            time: time.clone(),
            username: username.clone(),
            ip_address: ip_address.clone(),
        })?;
    }
    writer.flush()?;

    Ok(report_path)
}

/// Append every raw log line from one source address to
/// `source_ip_<address>.log`, dots replaced with underscores in the file
/// name. Returns the path written.
pub fn generate_source_ip_log(config: &Config, ip_address: &str) -> Result<PathBuf, ReportError> {
    let sanitized = ip_address.replace('.', "_");
    let log_path = config.output_dir.join(format!("source_ip_{sanitized}.log"));

    let pattern = format!(r"SRC={} ", regex::escape(ip_address));
    let matches = matcher::filter_log(&config.log_path, &pattern, FilterOptions::default())?;

    let mut file = OpenOptions::new().create(true).append(true).open(&log_path)?;
    for record in &matches.records {
        writeln!(file, "{record}")?;
    }

    Ok(log_path)
}

/// Print the per-port traffic tally to the terminal, busiest ports first.
/// Ports at or above the report threshold are flagged.
pub fn print_traffic_summary(traffic: &HashMap<String, u64>, threshold: u64) {
    println!(
        "\n  {} {}",
        "▶".cyan(),
        "DESTINATION PORT TRAFFIC".white().bold()
    );
    println!("  {THIN_SEP}");

    if traffic.is_empty() {
        println!("  (no port traffic found)");
        return;
    }

    let mut ports: Vec<(&String, &u64)> = traffic.iter().collect();
    ports.sort_unstable_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (port, count) in ports {
        if *count >= threshold {
            println!(
                "  DPT={:<6} {:>8}  {}",
                port.cyan(),
                count.to_string().red().bold(),
                "high traffic".red()
            );
        } else {
            println!("  DPT={:<6} {:>8}", port.cyan(), count);
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open a CSV report for appending. The header row (taken from the row
/// struct's column names) is only written when the file is newly created;
/// appending to an existing report adds rows only, so repeated runs
/// accumulate rows under a single header.
fn report_writer(path: &Path) -> Result<csv::Writer<File>, ReportError> {
    let is_new = !path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file))
}
