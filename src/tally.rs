use crate::matcher::{self, FilterError, FilterOptions};
use std::collections::HashMap;
use std::path::Path;

/// Destination-port marker as it appears in gateway log lines:
/// a numeric token after `DPT=`, terminated by a space.
const DPT_PATTERN: &str = r"DPT=(\d+) ";

/// Count how many records mention each destination port.
///
/// Ports are tallied as the literal captured token, so a zero-padded port
/// ("080") is a different key from its numeric twin ("80"). Every match in
/// the file contributes to exactly one count; no filtering happens here.
pub fn tally_port_traffic(log_file: &Path) -> Result<HashMap<String, u64>, FilterError> {
    let matches = matcher::filter_log(log_file, DPT_PATTERN, FilterOptions::default())?;

    let mut traffic: HashMap<String, u64> = HashMap::new();
    for groups in &matches.captures {
        if let Some(port) = groups.first() {
            *traffic.entry(port.clone()).or_insert(0) += 1;
        }
    }

    Ok(traffic)
}

/// Ports whose tally reached `threshold` (inclusive), in ascending numeric
/// order so reports are generated in a stable sequence.
pub fn ports_meeting_threshold(traffic: &HashMap<String, u64>, threshold: u64) -> Vec<String> {
    let mut ports: Vec<String> = traffic
        .iter()
        .filter(|(_, &count)| count >= threshold)
        .map(|(port, _)| port.clone())
        .collect();
    ports.sort_unstable_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    });
    ports
}
