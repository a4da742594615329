use serde::{Deserialize, Serialize};

use super::{
    require_addressable, require_count, require_finite, require_non_negative,
    require_positive, Column,
    ContactShape, ElectrodeRecord, InvalidParameter, ProbeLayout,
};

/// Single Neuropixels shank: a two-column grid above the tip, with sites
/// grouped into consecutive hardware banks.
///
/// Both probe generations share this geometry. 1.0 staggers even and odd
/// rows and addresses one bank; 2.0 keeps its columns straight and
/// addresses five.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NeuropixelsConfig {
    pub n_electrodes: usize,
    pub n_columns: usize,
    pub tip_length: f64,
    pub pitch_row: f64,
    pub pitch_col: f64,
    /// x of the first column, cycled by row index
    pub row_start_x: Vec<f64>,
    pub contact: ContactShape,
    pub bank_size: usize,
    pub n_banks: usize,
}

impl NeuropixelsConfig {
    pub fn neuropixels_1() -> Self {
        Self {
            n_electrodes: 960,
            n_columns: 2,
            tip_length: 175.0,
            pitch_row: 20.0,
            pitch_col: 32.0,
            // even rows start 12 + 2 um left of center, odd rows 16 + 12 + 2 um
            row_start_x: vec![-(12.0 + 2.0), -(16.0 + 12.0 + 2.0)],
            contact: ContactShape::new(12.0, 12.0, 24.0),
            bank_size: 384,
            n_banks: 1,
        }
    }

    /// 2.0 four-shank probe, one shank's channel map.
    pub fn neuropixels_2() -> Self {
        Self {
            n_electrodes: 1280,
            n_columns: 2,
            tip_length: 175.0,
            pitch_row: 15.0,
            pitch_col: 32.0,
            row_start_x: vec![-30.0],
            contact: ContactShape::new(12.0, 12.0, 24.0),
            bank_size: 96,
            n_banks: 5,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_electrodes / self.n_columns
    }

    fn bank(&self, count: usize) -> Option<usize> {
        let bank = count / self.bank_size;
        (bank < self.n_banks).then_some(bank)
    }

    /// Odd column of bank 0 plus even column of bank 1.
    fn double_length(&self, column: usize, count: usize) -> bool {
        (column == 1 && count < self.bank_size)
            || (column == 0 && count / self.bank_size == 1)
    }
}

impl ProbeLayout for NeuropixelsConfig {
    fn columns(&self) -> Vec<Column> {
        let mut columns = Column::SITE.to_vec();
        columns.push(Column::Bank(0));
        columns.push(Column::DoubleLength);
        columns.extend((1..self.n_banks).map(Column::Bank));
        columns
    }

    fn expected_count(&self) -> usize {
        self.n_electrodes
    }

    fn validate(&self) -> Result<(), InvalidParameter> {
        require_count("n_electrodes", self.n_electrodes)?;
        require_count("n_columns", self.n_columns)?;
        if self.n_electrodes % self.n_columns != 0 {
            return Err(InvalidParameter::new(
                "n_columns",
                format!("must divide n_electrodes ({})", self.n_electrodes),
            ));
        }
        require_non_negative("tip_length", self.tip_length)?;
        require_positive("pitch_row", self.pitch_row)?;
        require_positive("pitch_col", self.pitch_col)?;
        if self.row_start_x.is_empty() {
            return Err(InvalidParameter::new(
                "row_start_x",
                "needs at least one starting offset",
            ));
        }
        for &x in &self.row_start_x {
            require_finite("row_start_x", x)?;
        }
        require_count("bank_size", self.bank_size)?;
        require_count("n_banks", self.n_banks)?;
        let banked = require_addressable("n_banks", self.bank_size.checked_mul(self.n_banks))?;
        if banked > self.n_electrodes {
            return Err(InvalidParameter::new(
                "n_banks",
                format!(
                    "{} banks of {} do not fit on {} electrodes",
                    self.n_banks, self.bank_size, self.n_electrodes
                ),
            ));
        }
        self.contact.validate()
    }

    fn sites(&self) -> impl Iterator<Item = ElectrodeRecord> + '_ {
        let columns = self.n_columns;

        (0..self.n_rows())
            .flat_map(move |row| (0..columns).map(move |column| (row, column)))
            .enumerate()
            .map(move |(count, (row, column))| {
                let y = self.tip_length + row as f64 * self.pitch_row;
                let start_x = self.row_start_x[row % self.row_start_x.len()];
                let x = start_x + column as f64 * self.pitch_col;

                let bank = self.bank(count);
                ElectrodeRecord {
                    default: bank == Some(0),
                    bank,
                    double_length: self.double_length(column, count),
                    ..ElectrodeRecord::site(count, x, y, &self.contact)
                }
            })
    }
}
