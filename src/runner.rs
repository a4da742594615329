use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{Config, ProbeEntry, ProbesConfig};
use crate::error::ProbeError;
use crate::export::{CsvFileSink, TableSink};
use crate::probes::{generate, ProbeFamily, ProbeLayout, ProbeTable};

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub family: ProbeFamily,
    pub path: PathBuf,
    pub electrodes: usize,
}

fn generate_entry<L: ProbeLayout>(
    family: ProbeFamily,
    entry: &ProbeEntry<L>,
) -> Result<(String, ProbeTable), ProbeError> {
    Ok((entry.file_name.clone(), generate(family, &entry.layout)?))
}

/// Generates `family` from its configured geometry, paired with its output
/// file name. `None` when the family is not configured.
pub fn generate_configured(
    probes: &ProbesConfig,
    family: ProbeFamily,
) -> Option<Result<(String, ProbeTable), ProbeError>> {
    match family {
        ProbeFamily::A4x16 => probes.a4x16.as_ref().map(|e| generate_entry(family, e)),
        ProbeFamily::Neuropixels1 => probes.neuropixels_1.as_ref().map(|e| generate_entry(family, e)),
        ProbeFamily::Neuropixels2 => probes.neuropixels_2.as_ref().map(|e| generate_entry(family, e)),
        ProbeFamily::Ucla128k => probes.ucla_128k.as_ref().map(|e| generate_entry(family, e)),
        ProbeFamily::Ucla256f => probes.ucla_256f.as_ref().map(|e| generate_entry(family, e)),
    }
}

pub fn export_table(table: &ProbeTable, path: &Path) -> Result<ExportSummary, ProbeError> {
    CsvFileSink::new(path).write_table(table)?;
    Ok(ExportSummary {
        family: table.family(),
        path: path.to_path_buf(),
        electrodes: table.len(),
    })
}

/// Resolves each table's output path, one file per family.
fn output_paths(
    directory: &Path,
    tables: &[(String, ProbeTable)],
) -> Result<Vec<PathBuf>, ProbeError> {
    let mut claimed: HashMap<PathBuf, ProbeFamily> = HashMap::new();
    let mut paths = Vec::with_capacity(tables.len());
    for (file_name, table) in tables {
        let path = directory.join(file_name);
        if let Some(&first) = claimed.get(&path) {
            return Err(ProbeError::DuplicateOutput {
                path,
                first,
                second: table.family(),
            });
        }
        claimed.insert(path.clone(), table.family());
        paths.push(path);
    }
    Ok(paths)
}

/// Generates every configured family, then exports them in family order.
/// Nothing is written unless every family generates cleanly.
pub fn run(config: &Config) -> Result<Vec<ExportSummary>, ProbeError> {
    let start_time = Instant::now();

    // families are independent, generate them side by side
    let tables = ProbeFamily::ALL[..]
        .par_iter()
        .filter_map(|&family| generate_configured(&config.probes, family))
        .collect::<Result<Vec<_>, ProbeError>>()?;

    if tables.is_empty() {
        warn!("no probe families configured, nothing to export");
    }

    let directory = &config.output.directory;
    let paths = output_paths(directory, &tables)?;
    let mut summaries = Vec::with_capacity(tables.len());
    for ((_, table), path) in tables.iter().zip(&paths) {
        summaries.push(export_table(table, path)?);
    }

    info!(
        tables = summaries.len(),
        directory = %directory.display(),
        elapsed = ?start_time.elapsed(),
        "finished probe layout run"
    );
    Ok(summaries)
}

/// Generates one family from its standard geometry into `directory`.
pub fn run_family<P: AsRef<Path>>(
    family: ProbeFamily,
    directory: P,
) -> Result<ExportSummary, ProbeError> {
    let table = family.generate_standard()?;
    export_table(&table, &directory.as_ref().join(family.file_name()))
}
