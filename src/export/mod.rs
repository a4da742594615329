pub mod csv_sink;

use crate::error::ProbeError;
use crate::probes::ProbeTable;

pub use csv_sink::{encode_table, format_value, CsvFileSink};

/// Destination for generated electrode tables.
pub trait TableSink {
    fn write_table(&mut self, table: &ProbeTable) -> Result<(), ProbeError>;
}

/// Keeps encoded tables in memory, in the order they were written.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: Vec<Vec<u8>>,
}

impl TableSink for MemorySink {
    fn write_table(&mut self, table: &ProbeTable) -> Result<(), ProbeError> {
        self.tables.push(encode_table(table)?);
        Ok(())
    }
}
