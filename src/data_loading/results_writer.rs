use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

pub const DEFAULT_RESULTS_FILE: &str = "clustering_results";

/// Writes one `identifier,label` line per entry, in the given order.
pub fn write_labels<W: Write>(writer: &mut W, labels: &[(String, usize)]) -> io::Result<()> {
    for (identifier, label) in labels {
        writeln!(writer, "{},{}", identifier, label)?;
    }

    writer.flush()
}

pub fn write_results_file<P: AsRef<Path>>(file_path: P, labels: &[(String, usize)]) -> Result<(), ResultsWriterError> {
    let path = file_path.as_ref();
    let file_name = path.display().to_string();

    let file = File::create(path).map_err(|err| ResultsWriterError::FailedToOpenFile {
        file: file_name.clone(),
        reason: err.to_string(),
    })?;

    let mut writer = BufWriter::new(file);
    write_labels(&mut writer, labels).map_err(|err| ResultsWriterError::FailedToWrite {
        file: file_name.clone(),
        reason: err.to_string(),
    })?;

    info!(file = %file_name, lines = labels.len(), "wrote clustering results");

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultsWriterError {
    #[error("failed to open output file \"{file}\": {reason}")]
    FailedToOpenFile { file: String, reason: String },
    #[error("failed to write to \"{file}\": {reason}")]
    FailedToWrite { file: String, reason: String },
}
