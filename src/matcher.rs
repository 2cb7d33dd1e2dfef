use colored::Colorize;
use regex::RegexBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while filtering a log file
#[derive(Debug, Error)]
pub enum FilterError {
    /// The filter pattern is not a valid regular expression
    #[error("invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The log file could not be opened or read
    #[error("could not read log file: {0}")]
    Io(#[from] std::io::Error),
}

/// Options controlling a single filtering pass
#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    /// Match case-insensitively. Defaults to true, since gateway logs mix
    /// the case of their field markers.
    pub ignore_case: bool,
    /// Print a one-line summary of the pass (match count and case mode)
    pub print_summary: bool,
    /// Echo every matching record to stdout
    pub print_records: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            print_summary: false,
            print_records: false,
        }
    }
}

/// The outcome of one filtering pass over a log file.
///
/// `records` and `captures` are parallel sequences in file order:
/// `captures[i]` holds the capture-group text extracted from `records[i]`,
/// in the order the groups appear in the pattern. Group order is the only
/// binding between a capture and its meaning.
#[derive(Debug, Default)]
pub struct FilterMatches {
    /// Matched lines, trimmed of surrounding whitespace
    pub records: Vec<String>,
    /// One entry per record; length equals the pattern's group count
    pub captures: Vec<Vec<String>>,
}

/// Scan `log_file` line by line and collect every line matching `pattern`.
///
/// Only the first match per line is used; lines without a match are skipped
/// entirely (neither counted nor returned). Matching is line-oriented, so
/// records spanning multiple lines are not supported.
///
/// Returns `Err(FilterError::InvalidPattern)` if the pattern does not
/// compile and `Err(FilterError::Io)` if the file cannot be opened or read.
pub fn filter_log(
    log_file: &Path,
    pattern: &str,
    opts: FilterOptions,
) -> Result<FilterMatches, FilterError> {
    let re = RegexBuilder::new(pattern)
        .case_insensitive(opts.ignore_case)
        .build()?;

    let file = File::open(log_file)?;
    let reader = BufReader::new(file);

    let mut matches = FilterMatches::default();
    for line in reader.lines() {
        let line = line?;
        if let Some(caps) = re.captures(&line) {
            let groups = (1..caps.len())
                .map(|i| caps.get(i).map_or(String::new(), |m| m.as_str().to_string()))
                .collect();
            matches.records.push(line.trim().to_string());
            matches.captures.push(groups);
        }
    }

    if opts.print_records {
        for record in &matches.records {
            println!("{record}");
        }
    }

    if opts.print_summary {
        let mode = if opts.ignore_case {
            "case-insensitive"
        } else {
            "case-sensitive"
        };
        println!(
            "{} records matched ({} matching)",
            matches.records.len().to_string().green().bold(),
            mode
        );
    }

    Ok(matches)
}

// ─── Unit Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_with(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp log file");
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn returns_only_matching_lines() {
        let log = log_with(&[
            "Jan 28 09:00:01 gw kernel: SRC=1.2.3.4 DPT=80 LEN=40",
            "Jan 28 09:00:02 gw sshd[9]: session opened",
            "Jan 28 09:00:03 gw kernel: SRC=5.6.7.8 DPT=22 LEN=60",
        ]);
        let matches =
            filter_log(log.path(), r"DPT=(\d+) ", FilterOptions::default()).unwrap();
        assert_eq!(matches.records.len(), 2);
        assert_eq!(matches.captures.len(), 2);
        assert!(matches.records.iter().all(|r| r.contains("DPT=")));
    }

    #[test]
    fn captures_follow_group_order() {
        let log = log_with(&["Jan 28 09:00:01 gw kernel: SRC=1.2.3.4 DST=9.8.7.6 LEN=40"]);
        let matches = filter_log(
            log.path(),
            r"SRC=(\S+) DST=(\S+)",
            FilterOptions::default(),
        )
        .unwrap();
        assert_eq!(matches.captures[0], vec!["1.2.3.4", "9.8.7.6"]);
    }

    #[test]
    fn first_match_per_line_wins() {
        let log = log_with(&["DPT=80 then again DPT=443 on one line"]);
        let matches =
            filter_log(log.path(), r"DPT=(\d+) ", FilterOptions::default()).unwrap();
        assert_eq!(matches.records.len(), 1);
        assert_eq!(matches.captures[0], vec!["80"]);
    }

    #[test]
    fn matches_case_insensitively_by_default() {
        let log = log_with(&["Jan 28 09:00:01 gw kernel: src=1.2.3.4 dpt=80 len=40"]);
        let matches =
            filter_log(log.path(), r"DPT=(\d+) ", FilterOptions::default()).unwrap();
        assert_eq!(matches.captures[0], vec!["80"]);
    }

    #[test]
    fn honors_case_sensitive_mode() {
        let log = log_with(&["Jan 28 09:00:01 gw kernel: src=1.2.3.4 dpt=80 len=40"]);
        let opts = FilterOptions {
            ignore_case: false,
            ..FilterOptions::default()
        };
        let matches = filter_log(log.path(), r"DPT=(\d+) ", opts).unwrap();
        assert!(matches.records.is_empty());
        assert!(matches.captures.is_empty());
    }

    #[test]
    fn records_are_trimmed() {
        let log = log_with(&["  Jan 28 09:00:01 gw kernel: DPT=80 LEN=40   "]);
        let matches =
            filter_log(log.path(), r"DPT=(\d+) ", FilterOptions::default()).unwrap();
        assert_eq!(
            matches.records[0],
            "Jan 28 09:00:01 gw kernel: DPT=80 LEN=40"
        );
    }

    #[test]
    fn rejects_malformed_pattern() {
        let log = log_with(&["any line"]);
        let err = filter_log(log.path(), r"DPT=(\d+", FilterOptions::default());
        assert!(matches!(err, Err(FilterError::InvalidPattern(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = filter_log(
            Path::new("no_such_gateway.log"),
            r"DPT=(\d+) ",
            FilterOptions::default(),
        );
        assert!(matches!(err, Err(FilterError::Io(_))));
    }

    #[test]
    fn print_options_do_not_affect_results() {
        let log = log_with(&["Jan 28 09:00:01 gw kernel: DPT=80 LEN=40"]);
        let opts = FilterOptions {
            print_summary: true,
            print_records: true,
            ..FilterOptions::default()
        };
        let matches = filter_log(log.path(), r"DPT=(\d+) ", opts).unwrap();
        assert_eq!(matches.records.len(), 1);
        assert_eq!(matches.captures[0], vec!["80"]);
    }

    #[test]
    fn empty_log_yields_no_matches() {
        let log = log_with(&[]);
        let matches =
            filter_log(log.path(), r"DPT=(\d+) ", FilterOptions::default()).unwrap();
        assert!(matches.records.is_empty());
        assert!(matches.captures.is_empty());
    }
}
