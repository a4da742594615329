pub mod a4x16;
pub mod neuropixels;
pub mod ucla;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProbeError;

pub use a4x16::A4x16Config;
pub use neuropixels::NeuropixelsConfig;
pub use ucla::{UclaColumn, UclaConfig};

// -----------------------------------------------------------------------------
// PROBE FAMILIES
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProbeFamily {
    A4x16,
    Neuropixels1,
    Neuropixels2,
    Ucla128k,
    Ucla256f,
}

impl ProbeFamily {
    pub const ALL: [ProbeFamily; 5] = [
        ProbeFamily::A4x16,
        ProbeFamily::Neuropixels1,
        ProbeFamily::Neuropixels2,
        ProbeFamily::Ucla128k,
        ProbeFamily::Ucla256f,
    ];

    /// Identifier used on the command line and as the output file stem.
    pub fn id(self) -> &'static str {
        match self {
            ProbeFamily::A4x16 => "a4x16",
            ProbeFamily::Neuropixels1 => "neuropixels_1",
            ProbeFamily::Neuropixels2 => "neuropixels_2",
            ProbeFamily::Ucla128k => "ucla_128k",
            ProbeFamily::Ucla256f => "ucla_256f",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.csv", self.id())
    }

    /// Site count of the family's standard geometry.
    pub fn standard_count(self) -> usize {
        match self {
            ProbeFamily::A4x16 => 64,
            ProbeFamily::Neuropixels1 => 960,
            ProbeFamily::Neuropixels2 => 1280,
            ProbeFamily::Ucla128k => 32,
            ProbeFamily::Ucla256f => 128,
        }
    }

    pub fn generate_standard(self) -> Result<ProbeTable, ProbeError> {
        match self {
            ProbeFamily::A4x16 => generate(self, &A4x16Config::standard()),
            ProbeFamily::Neuropixels1 => generate(self, &NeuropixelsConfig::neuropixels_1()),
            ProbeFamily::Neuropixels2 => generate(self, &NeuropixelsConfig::neuropixels_2()),
            ProbeFamily::Ucla128k => generate(self, &UclaConfig::ucla_128k()),
            ProbeFamily::Ucla256f => generate(self, &UclaConfig::ucla_256f()),
        }
    }
}

impl fmt::Display for ProbeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeFamily::A4x16 => "A4x16",
            ProbeFamily::Neuropixels1 => "Neuropixels 1.0",
            ProbeFamily::Neuropixels2 => "Neuropixels 2.0",
            ProbeFamily::Ucla128k => "UCLA 128K",
            ProbeFamily::Ucla256f => "UCLA 256F",
        };
        f.write_str(name)
    }
}

impl FromStr for ProbeFamily {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ProbeFamily::ALL
            .into_iter()
            .find(|family| family.id() == wanted)
            .ok_or_else(|| ProbeError::UnknownFamily(s.to_string()))
    }
}

// -----------------------------------------------------------------------------
// ELECTRODE RECORDS
// -----------------------------------------------------------------------------

/// Physical extent of a single contact, in micrometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactShape {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl ContactShape {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    fn validate(&self) -> Result<(), InvalidParameter> {
        require_positive("contact.width", self.width)?;
        require_positive("contact.height", self.height)?;
        // flat contacts are allowed a zero depth
        require_non_negative("contact.depth", self.depth)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectrodeRecord {
    pub electrode: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub h: f64,
    pub d: f64,
    pub default: bool,
    pub all: bool,
    /// Bank selection group, banks are disjoint
    pub bank: Option<usize>,
    pub double_length: bool,
}

impl ElectrodeRecord {
    /// A site on the probe plane that belongs to the default selection.
    pub fn site(electrode: usize, x: f64, y: f64, contact: &ContactShape) -> Self {
        Self {
            electrode,
            x,
            y,
            z: 0.0,
            w: contact.width,
            h: contact.height,
            d: contact.depth,
            default: true,
            all: true,
            bank: None,
            double_length: false,
        }
    }

    pub fn in_bank(&self, bank: usize) -> bool {
        self.bank == Some(bank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Electrode,
    X,
    Y,
    Z,
    W,
    H,
    D,
    Default,
    All,
    Bank(usize),
    DoubleLength,
}

impl Column {
    /// Columns every family carries, in output order.
    pub const SITE: [Column; 9] = [
        Column::Electrode,
        Column::X,
        Column::Y,
        Column::Z,
        Column::W,
        Column::H,
        Column::D,
        Column::Default,
        Column::All,
    ];

    pub fn name(&self) -> String {
        match self {
            Column::Electrode => "electrode".to_string(),
            Column::X => "x".to_string(),
            Column::Y => "y".to_string(),
            Column::Z => "z".to_string(),
            Column::W => "w".to_string(),
            Column::H => "h".to_string(),
            Column::D => "d".to_string(),
            Column::Default => "default".to_string(),
            Column::All => "all".to_string(),
            Column::Bank(n) => format!("bank{}", n),
            Column::DoubleLength => "double_length".to_string(),
        }
    }

    pub fn value(&self, record: &ElectrodeRecord) -> f64 {
        let flag = |set: bool| if set { 1.0 } else { 0.0 };
        match self {
            Column::Electrode => record.electrode as f64,
            Column::X => record.x,
            Column::Y => record.y,
            Column::Z => record.z,
            Column::W => record.w,
            Column::H => record.h,
            Column::D => record.d,
            Column::Default => flag(record.default),
            Column::All => flag(record.all),
            Column::Bank(n) => flag(record.in_bank(*n)),
            Column::DoubleLength => flag(record.double_length),
        }
    }
}

// -----------------------------------------------------------------------------
// LAYOUT GENERATION
// -----------------------------------------------------------------------------

/// A parameter that failed validation, reported against its family by
/// [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidParameter {
    pub parameter: &'static str,
    pub reason: String,
}

impl InvalidParameter {
    pub fn new(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self {
            parameter,
            reason: reason.into(),
        }
    }
}

pub(crate) fn require_count(parameter: &'static str, value: usize) -> Result<(), InvalidParameter> {
    if value == 0 {
        return Err(InvalidParameter::new(parameter, "must be a positive count"));
    }
    Ok(())
}

pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<(), InvalidParameter> {
    if !value.is_finite() || value <= 0.0 {
        return Err(InvalidParameter::new(
            parameter,
            format!("must be a positive distance, got {}", value),
        ));
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    parameter: &'static str,
    value: f64,
) -> Result<(), InvalidParameter> {
    if !value.is_finite() || value < 0.0 {
        return Err(InvalidParameter::new(
            parameter,
            format!("must be zero or positive, got {}", value),
        ));
    }
    Ok(())
}

/// Unwraps a checked site-count computation, rejecting counts that overflow
/// `usize`.
pub(crate) fn require_addressable(
    parameter: &'static str,
    value: Option<usize>,
) -> Result<usize, InvalidParameter> {
    value.ok_or_else(|| InvalidParameter::new(parameter, "overflows the electrode count"))
}

pub(crate) fn require_finite(parameter: &'static str, value: f64) -> Result<(), InvalidParameter> {
    if !value.is_finite() {
        return Err(InvalidParameter::new(parameter, "must be a finite offset"));
    }
    Ok(())
}

pub trait ProbeLayout {
    fn columns(&self) -> Vec<Column>;

    fn expected_count(&self) -> usize;

    fn validate(&self) -> Result<(), InvalidParameter>;

    /// Sites in output order. Only called on a validated layout.
    fn sites(&self) -> impl Iterator<Item = ElectrodeRecord> + '_;
}

/// An electrode table for one probe, ordered by electrode index.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeTable {
    family: ProbeFamily,
    columns: Vec<Column>,
    records: Vec<ElectrodeRecord>,
}

impl ProbeTable {
    pub fn family(&self) -> ProbeFamily {
        self.family
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[ElectrodeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row(&self, index: usize) -> Option<Vec<f64>> {
        let record = self.records.get(index)?;
        Some(self.columns.iter().map(|c| c.value(record)).collect())
    }
}

pub fn generate<L: ProbeLayout>(
    family: ProbeFamily,
    layout: &L,
) -> Result<ProbeTable, ProbeError> {
    layout
        .validate()
        .map_err(|invalid| ProbeError::Configuration {
            family,
            parameter: invalid.parameter,
            reason: invalid.reason,
        })?;

    let expected = layout.expected_count();
    let records: Vec<ElectrodeRecord> = layout.sites().collect();

    if records.len() != expected {
        return Err(ProbeError::InvariantViolation {
            family,
            detail: format!("generated {} electrodes, expected {}", records.len(), expected),
        });
    }
    if let Some((position, record)) = records
        .iter()
        .enumerate()
        .find(|(position, record)| record.electrode != *position)
    {
        return Err(ProbeError::InvariantViolation {
            family,
            detail: format!(
                "electrode {} found at position {}",
                record.electrode, position
            ),
        });
    }
    if let Some(record) = records.iter().find(|record| !record.all) {
        return Err(ProbeError::InvariantViolation {
            family,
            detail: format!("electrode {} is missing from the `all` selection", record.electrode),
        });
    }

    debug!(%family, electrodes = records.len(), "generated probe layout");

    Ok(ProbeTable {
        family,
        columns: layout.columns(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Skips an electrode index so generation has to catch it.
    struct GappedLayout;

    impl ProbeLayout for GappedLayout {
        fn columns(&self) -> Vec<Column> {
            Column::SITE.to_vec()
        }

        fn expected_count(&self) -> usize {
            3
        }

        fn validate(&self) -> Result<(), InvalidParameter> {
            Ok(())
        }

        fn sites(&self) -> impl Iterator<Item = ElectrodeRecord> + '_ {
            let contact = ContactShape::new(1.0, 1.0, 1.0);
            [0, 1, 3]
                .into_iter()
                .map(move |i| ElectrodeRecord::site(i, 0.0, i as f64, &contact))
        }
    }

    /// Promises more sites than it places.
    struct ShortLayout;

    impl ProbeLayout for ShortLayout {
        fn columns(&self) -> Vec<Column> {
            Column::SITE.to_vec()
        }

        fn expected_count(&self) -> usize {
            4
        }

        fn validate(&self) -> Result<(), InvalidParameter> {
            Ok(())
        }

        fn sites(&self) -> impl Iterator<Item = ElectrodeRecord> + '_ {
            let contact = ContactShape::new(1.0, 1.0, 1.0);
            (0..3).map(move |i| ElectrodeRecord::site(i, 0.0, i as f64, &contact))
        }
    }

    #[test]
    fn test_every_family_has_its_standard_count() {
        for family in ProbeFamily::ALL {
            let table = family.generate_standard().unwrap();
            assert_eq!(table.len(), family.standard_count(), "{}", family);
            assert_eq!(table.family(), family);
        }
    }

    #[test]
    fn test_electrode_ids_are_contiguous() {
        for family in ProbeFamily::ALL {
            let table = family.generate_standard().unwrap();
            for (i, record) in table.records().iter().enumerate() {
                assert_eq!(record.electrode, i, "{} electrode {}", family, i);
            }
        }
    }

    #[test]
    fn test_all_flag_is_set_everywhere() {
        for family in ProbeFamily::ALL {
            let table = family.generate_standard().unwrap();
            assert!(table.records().iter().all(|r| r.all), "{}", family);
            assert!(table.records().iter().all(|r| r.z == 0.0), "{}", family);
        }
    }

    #[test]
    fn test_regeneration_is_identical() {
        for family in ProbeFamily::ALL {
            assert_eq!(
                family.generate_standard().unwrap(),
                family.generate_standard().unwrap()
            );
        }
    }

    #[test]
    fn test_gap_in_electrode_ids_is_an_invariant_violation() {
        let err = generate(ProbeFamily::A4x16, &GappedLayout).unwrap_err();
        match err {
            ProbeError::InvariantViolation { family, detail } => {
                assert_eq!(family, ProbeFamily::A4x16);
                assert!(detail.contains("electrode 3"), "{}", detail);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_short_table_is_an_invariant_violation() {
        let err = generate(ProbeFamily::Ucla128k, &ShortLayout).unwrap_err();
        match err {
            ProbeError::InvariantViolation { family, detail } => {
                assert_eq!(family, ProbeFamily::Ucla128k);
                assert_eq!(detail, "generated 3 electrodes, expected 4");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_family_names_parse() {
        assert_eq!("a4x16".parse::<ProbeFamily>().unwrap(), ProbeFamily::A4x16);
        assert_eq!(
            "Neuropixels-2".parse::<ProbeFamily>().unwrap(),
            ProbeFamily::Neuropixels2
        );
        assert_eq!(
            "ucla_256f".parse::<ProbeFamily>().unwrap(),
            ProbeFamily::Ucla256f
        );
        assert!(matches!(
            "utah".parse::<ProbeFamily>(),
            Err(ProbeError::UnknownFamily(name)) if name == "utah"
        ));
    }

    #[test]
    fn test_bank_columns_read_the_record_bank() {
        let contact = ContactShape::new(12.0, 12.0, 24.0);
        let record = ElectrodeRecord {
            bank: Some(2),
            ..ElectrodeRecord::site(7, -30.0, 200.0, &contact)
        };
        assert_eq!(Column::Bank(2).value(&record), 1.0);
        assert_eq!(Column::Bank(0).value(&record), 0.0);
        assert_eq!(Column::Electrode.value(&record), 7.0);
        assert_eq!(Column::Bank(4).name(), "bank4");
    }
}
