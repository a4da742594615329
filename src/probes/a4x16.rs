use serde::{Deserialize, Serialize};

use super::{
    require_count, require_finite, require_positive, Column, ContactShape, ElectrodeRecord,
    InvalidParameter, ProbeLayout,
};

/// Multi-shank array with two staggered columns of sites per shank.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct A4x16Config {
    pub n_electrodes: usize,
    pub sites_per_shank: usize,
    pub n_columns: usize,
    pub shank_pitch: f64,
    pub pitch_x: f64,
    pub pitch_y: f64,
    /// Extra y offset of each column after the first
    pub y_shift: f64,
    pub min_y: f64,
    pub contact: ContactShape,
}

impl A4x16Config {
    pub fn standard() -> Self {
        Self {
            n_electrodes: 64,
            sites_per_shank: 16,
            n_columns: 2,
            shank_pitch: 200.0,
            pitch_x: 30.0,
            pitch_y: 46.0,
            y_shift: 23.0,
            min_y: 52.0 / 2.0,
            // circular 17.7 um contacts
            contact: ContactShape::new(17.7 / 2.0, 17.7 / 2.0, 0.0),
        }
    }

    pub fn n_shanks(&self) -> usize {
        self.n_electrodes / self.sites_per_shank
    }

    pub fn rows_per_shank(&self) -> usize {
        self.sites_per_shank / self.n_columns
    }

    fn position(&self, shank: usize, row: usize, column: usize) -> (f64, f64) {
        let shank_x = shank as f64 * self.shank_pitch;
        let x = shank_x + self.pitch_x / 2.0 - column as f64 * self.pitch_x;
        let y = row as f64 * self.pitch_y + self.min_y + column as f64 * self.y_shift;
        (x, y)
    }
}

impl ProbeLayout for A4x16Config {
    fn columns(&self) -> Vec<Column> {
        Column::SITE.to_vec()
    }

    fn expected_count(&self) -> usize {
        self.n_electrodes
    }

    fn validate(&self) -> Result<(), InvalidParameter> {
        require_count("n_electrodes", self.n_electrodes)?;
        require_count("sites_per_shank", self.sites_per_shank)?;
        require_count("n_columns", self.n_columns)?;
        if self.n_electrodes % self.sites_per_shank != 0 {
            return Err(InvalidParameter::new(
                "sites_per_shank",
                format!("must divide n_electrodes ({})", self.n_electrodes),
            ));
        }
        if self.sites_per_shank % self.n_columns != 0 {
            return Err(InvalidParameter::new(
                "n_columns",
                format!("must divide sites_per_shank ({})", self.sites_per_shank),
            ));
        }
        require_positive("shank_pitch", self.shank_pitch)?;
        require_positive("pitch_x", self.pitch_x)?;
        require_positive("pitch_y", self.pitch_y)?;
        require_finite("y_shift", self.y_shift)?;
        require_finite("min_y", self.min_y)?;
        self.contact.validate()
    }

    fn sites(&self) -> impl Iterator<Item = ElectrodeRecord> + '_ {
        let rows = self.rows_per_shank();
        let columns = self.n_columns;

        // shank -> row -> column
        (0..self.n_shanks())
            .flat_map(move |shank| {
                (0..rows).flat_map(move |row| (0..columns).map(move |column| (shank, row, column)))
            })
            .enumerate()
            .map(move |(electrode, (shank, row, column))| {
                let (x, y) = self.position(shank, row, column);
                ElectrodeRecord::site(electrode, x, y, &self.contact)
            })
    }
}
