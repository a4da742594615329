use serde::{Deserialize, Serialize};

use super::{
    require_addressable, require_count, require_finite, require_positive, Column, ContactShape,
    ElectrodeRecord, InvalidParameter, ProbeLayout,
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UclaColumn {
    Left,
    Center,
    Right,
}

/// Three-column (left/center/right) UCLA array. The leading center sites
/// come first, the rest are numbered round-robin across the columns.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UclaConfig {
    /// Sites in each of the left and right columns
    pub n_elec_lr: usize,
    /// Sites in the center column, leading sites included
    pub n_elec_c: usize,
    pub lead_sites_y: Vec<f64>,
    pub column_order: [UclaColumn; 3],
    pub left_x: f64,
    pub center_x: f64,
    pub right_x: f64,
    pub lr_start_y: f64,
    pub center_start_y: f64,
    pub pitch_y: f64,
    pub contact: ContactShape,
}

impl UclaConfig {
    pub fn ucla_128k() -> Self {
        let pitch_y = 15.0 + 10.0;
        let c_start_y = 15.0;
        Self {
            n_elec_lr: 10,
            n_elec_c: 12,
            lead_sites_y: vec![c_start_y, c_start_y + pitch_y],
            column_order: [UclaColumn::Left, UclaColumn::Right, UclaColumn::Center],
            left_x: -22.5,
            center_x: -5.0,
            right_x: 12.5,
            lr_start_y: 50.0,
            center_start_y: 15.0 + 10.0 + 15.0 + 10.0 + 15.0,
            pitch_y,
            contact: ContactShape::new(10.0, 10.0, 23.0),
        }
    }

    pub fn ucla_256f() -> Self {
        Self {
            n_elec_lr: 42,
            n_elec_c: 44,
            lead_sites_y: vec![30.0, 45.0],
            column_order: [UclaColumn::Center, UclaColumn::Left, UclaColumn::Right],
            left_x: -20.0,
            center_x: -5.0,
            right_x: 10.0,
            lr_start_y: 75.0,
            center_start_y: 55.0,
            pitch_y: 50.0,
            contact: ContactShape::new(10.0, 10.0, 23.0),
        }
    }

    /// Total site count, `None` when it does not fit in `usize`.
    pub fn checked_count(&self) -> Option<usize> {
        self.n_elec_lr.checked_mul(2)?.checked_add(self.n_elec_c)
    }

    /// Sites placed by the round-robin cycle, after the leading ones.
    fn n_cycled(&self) -> usize {
        self.expected_count().saturating_sub(self.lead_sites_y.len())
    }

    fn position(&self, column: UclaColumn, row: usize) -> (f64, f64) {
        let offset = row as f64 * self.pitch_y;
        match column {
            UclaColumn::Left => (self.left_x, self.lr_start_y + offset),
            UclaColumn::Right => (self.right_x, self.lr_start_y + offset),
            UclaColumn::Center => (self.center_x, self.center_start_y + offset),
        }
    }
}

impl ProbeLayout for UclaConfig {
    fn columns(&self) -> Vec<Column> {
        Column::SITE.to_vec()
    }

    fn expected_count(&self) -> usize {
        self.checked_count().unwrap_or(usize::MAX)
    }

    fn validate(&self) -> Result<(), InvalidParameter> {
        require_count("n_elec_lr", self.n_elec_lr)?;
        require_count("n_elec_c", self.n_elec_c)?;
        require_addressable("n_elec_lr", self.checked_count())?;
        if self.lead_sites_y.len() > self.n_elec_c {
            return Err(InvalidParameter::new(
                "lead_sites_y",
                format!("has more sites than the center column ({})", self.n_elec_c),
            ));
        }
        for column in [UclaColumn::Left, UclaColumn::Center, UclaColumn::Right] {
            if !self.column_order.contains(&column) {
                return Err(InvalidParameter::new(
                    "column_order",
                    format!("must name each column once, {:?} is missing", column),
                ));
            }
        }

        let cycled = self.n_cycled();
        for (position, column) in self.column_order.iter().enumerate() {
            let placed = cycled / 3 + usize::from(position < cycled % 3);
            let wanted = match column {
                UclaColumn::Left | UclaColumn::Right => self.n_elec_lr,
                UclaColumn::Center => self.n_elec_c - self.lead_sites_y.len(),
            };
            if placed != wanted {
                return Err(InvalidParameter::new(
                    "column_order",
                    format!(
                        "cycle places {} {:?} sites, the column holds {}",
                        placed, column, wanted
                    ),
                ));
            }
        }

        for &y in &self.lead_sites_y {
            require_finite("lead_sites_y", y)?;
        }
        require_finite("left_x", self.left_x)?;
        require_finite("center_x", self.center_x)?;
        require_finite("right_x", self.right_x)?;
        require_finite("lr_start_y", self.lr_start_y)?;
        require_finite("center_start_y", self.center_start_y)?;
        require_positive("pitch_y", self.pitch_y)?;
        self.contact.validate()
    }

    fn sites(&self) -> impl Iterator<Item = ElectrodeRecord> + '_ {
        let n_lead = self.lead_sites_y.len();

        let lead = self
            .lead_sites_y
            .iter()
            .enumerate()
            .map(move |(electrode, &y)| {
                ElectrodeRecord::site(electrode, self.center_x, y, &self.contact)
            });

        let cycled = (0..self.n_cycled()).map(move |i| {
            let column = self.column_order[i % 3];
            let (x, y) = self.position(column, i / 3);
            ElectrodeRecord::site(n_lead + i, x, y, &self.contact)
        });

        lead.chain(cycled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{generate, ProbeFamily};
    use crate::ProbeError;

    fn count_at(records: &[ElectrodeRecord], x: f64) -> usize {
        records.iter().filter(|r| r.x == x).count()
    }

    #[test]
    fn test_128k_leading_center_sites() {
        let table = generate(ProbeFamily::Ucla128k, &UclaConfig::ucla_128k()).unwrap();
        assert_eq!(
            table.row(0).unwrap(),
            vec![0.0, -5.0, 15.0, 0.0, 10.0, 10.0, 23.0, 1.0, 1.0]
        );
        assert_eq!(
            table.row(1).unwrap(),
            vec![1.0, -5.0, 40.0, 0.0, 10.0, 10.0, 23.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_128k_cycles_left_right_center() {
        let config = UclaConfig::ucla_128k();
        let table = generate(ProbeFamily::Ucla128k, &config).unwrap();
        let records = table.records();
        assert_eq!(records.len(), 32);

        assert_eq!((records[2].x, records[2].y), (-22.5, 50.0));
        assert_eq!((records[3].x, records[3].y), (12.5, 50.0));
        assert_eq!((records[4].x, records[4].y), (-5.0, 65.0));
        assert_eq!((records[5].x, records[5].y), (-22.5, 75.0));
        assert_eq!((records[31].x, records[31].y), (-5.0, 65.0 + 9.0 * 25.0));

        assert_eq!(count_at(records, config.left_x), 10);
        assert_eq!(count_at(records, config.right_x), 10);
        assert_eq!(count_at(records, config.center_x), 12);
    }

    #[test]
    fn test_256f_cycles_center_left_right() {
        let config = UclaConfig::ucla_256f();
        let table = generate(ProbeFamily::Ucla256f, &config).unwrap();
        let records = table.records();
        assert_eq!(records.len(), 128);

        assert_eq!((records[0].x, records[0].y), (-5.0, 30.0));
        assert_eq!((records[1].x, records[1].y), (-5.0, 45.0));
        assert_eq!((records[2].x, records[2].y), (-5.0, 55.0));
        assert_eq!((records[3].x, records[3].y), (-20.0, 75.0));
        assert_eq!((records[4].x, records[4].y), (10.0, 75.0));
        assert_eq!((records[127].x, records[127].y), (10.0, 75.0 + 41.0 * 50.0));

        assert_eq!(count_at(records, config.left_x), 42);
        assert_eq!(count_at(records, config.right_x), 42);
        assert_eq!(count_at(records, config.center_x), 44);
    }

    #[test]
    fn test_every_site_is_selected() {
        let table = generate(ProbeFamily::Ucla256f, &UclaConfig::ucla_256f()).unwrap();
        assert!(table.records().iter().all(|r| r.default && r.all));
        assert!(table
            .records()
            .iter()
            .all(|r| (r.w, r.h, r.d) == (10.0, 10.0, 23.0)));
    }

    #[test]
    fn test_repeated_column_is_rejected() {
        let config = UclaConfig {
            column_order: [UclaColumn::Left, UclaColumn::Left, UclaColumn::Center],
            ..UclaConfig::ucla_128k()
        };
        let err = generate(ProbeFamily::Ucla128k, &config).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Configuration { parameter: "column_order", .. }
        ));
    }

    #[test]
    fn test_site_count_overflow_is_rejected() {
        let config = UclaConfig {
            n_elec_lr: usize::MAX / 2 + 1,
            ..UclaConfig::ucla_128k()
        };
        assert_eq!(config.checked_count(), None);

        let err = generate(ProbeFamily::Ucla128k, &config).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Configuration {
                family: ProbeFamily::Ucla128k,
                parameter: "n_elec_lr",
                ..
            }
        ));
    }

    #[test]
    fn test_counts_must_fit_the_cycle() {
        let config = UclaConfig {
            n_elec_c: 14,
            ..UclaConfig::ucla_128k()
        };
        let err = generate(ProbeFamily::Ucla128k, &config).unwrap_err();
        match err {
            ProbeError::Configuration {
                family, parameter, ..
            } => {
                assert_eq!(family, ProbeFamily::Ucla128k);
                assert_eq!(parameter, "column_order");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
