use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::TableSink;
use crate::error::ProbeError;
use crate::probes::ProbeTable;

/// Formats a cell as an integer when the value is exactly integral,
/// otherwise as the shortest real that reads back to the same value.
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Encodes a table as CSV with a header row.
pub fn encode_table(table: &ProbeTable) -> Result<Vec<u8>, ProbeError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.header())?;
    for record in table.records() {
        writer.write_record(
            table
                .columns()
                .iter()
                .map(|column| format_value(column.value(record))),
        )?;
    }

    writer
        .into_inner()
        .map_err(|e| ProbeError::Sink(csv::Error::from(e.into_error())))
}

/// Writes each table to a single CSV file. The table is staged next to the
/// target and renamed over it, so the target only ever holds a whole table.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> ProbeError {
        ProbeError::SinkIo {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl TableSink for CsvFileSink {
    fn write_table(&mut self, table: &ProbeTable) -> Result<(), ProbeError> {
        let bytes = encode_table(table)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Self::io_error(parent, e))?;
            }
        }

        let staging = self.staging_path();
        debug!(path = %staging.display(), bytes = bytes.len(), "staging table");
        fs::write(&staging, &bytes).map_err(|e| Self::io_error(&staging, e))?;

        if let Err(e) = fs::rename(&staging, &self.path) {
            // nothing was published, drop the staged copy
            let _ = fs::remove_file(&staging);
            return Err(Self::io_error(&self.path, e));
        }

        info!(
            family = %table.family(),
            electrodes = table.len(),
            path = %self.path.display(),
            "exported probe table"
        );
        Ok(())
    }
}
