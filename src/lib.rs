pub mod config;
pub mod error;
pub mod export;
pub mod probes;
pub mod runner;
pub mod utils;

pub use error::ProbeError;
pub use probes::{generate, ElectrodeRecord, ProbeFamily, ProbeLayout, ProbeTable};
