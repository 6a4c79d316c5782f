use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

pub const FIELD_SEPARATOR: char = ',';

/// Records read from a file, plus the lines that had to be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecords {
    pub records: Vec<(String, Vec<f64>)>,
    pub skipped_lines: Vec<usize>, // 1-based line numbers
}

// Anything that is not a finite number counts as missing
fn parse_feature(token: &str) -> f64 {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(f64::NAN)
}

/// Parses `identifier,f1,...,fN` lines.
///
/// Empty lines are ignored. Lines without exactly `num_features + 1` fields
/// are skipped with a warning. Unparseable or infinite values become NaN so
/// they can be imputed later.
pub fn parse_records<R: BufRead>(reader: R, num_features: usize) -> Result<LoadedRecords, RecordLoaderError> {
    let mut records = Vec::new();
    let mut skipped_lines = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_num = index + 1;
        let line = line.map_err(|err| RecordLoaderError::FailedToReadLine { line_num, reason: err.to_string() })?;

        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if tokens.len() != num_features + 1 {
            warn!(
                line_num,
                found = tokens.len(),
                expected = num_features + 1,
                "skipping line with the wrong number of comma separated values"
            );
            skipped_lines.push(line_num);
            continue;
        }

        let identifier = tokens[0].trim().to_string();
        let features: Vec<f64> = tokens[1..].iter().map(|token| parse_feature(token)).collect();

        records.push((identifier, features));
    }

    Ok(LoadedRecords { records, skipped_lines })
}

pub fn parse_file<P: AsRef<Path>>(file_path: P, num_features: usize) -> Result<LoadedRecords, RecordLoaderError> {
    let path = file_path.as_ref();
    let file = File::open(path).map_err(|err| RecordLoaderError::FailedToOpenFile {
        file: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let loaded = parse_records(io::BufReader::new(file), num_features)?;

    info!(
        file = %path.display(),
        records = loaded.records.len(),
        skipped = loaded.skipped_lines.len(),
        "loaded records"
    );

    Ok(loaded)
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordLoaderError {
    #[error("failed to open data file \"{file}\": {reason}")]
    FailedToOpenFile { file: String, reason: String },
    #[error("failed to read line {line_num}: {reason}")]
    FailedToReadLine { line_num: usize, reason: String },
}
