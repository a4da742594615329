use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::probes::ProbeFamily;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// A geometric parameter is outside its allowed range
    #[error("Invalid {family} geometry: `{parameter}` {reason}")]
    Configuration {
        family: ProbeFamily,
        parameter: &'static str,
        reason: String,
    },

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Also covers fields missing from a config file
    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Failed to write config file {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The generated table does not have the shape its geometry implies
    #[error("{family} layout violated an invariant: {detail}")]
    InvariantViolation { family: ProbeFamily, detail: String },

    #[error("Failed to encode table: {0}")]
    Sink(#[from] csv::Error),

    #[error("Failed to write table to {}: {source}", path.display())]
    SinkIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Two configured families name the same output file
    #[error("{first} and {second} both export to {}", path.display())]
    DuplicateOutput {
        path: PathBuf,
        first: ProbeFamily,
        second: ProbeFamily,
    },

    #[error("Unknown probe family '{0}'")]
    UnknownFamily(String),
}
