// src/config/mod.rs
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProbeError;
use crate::probes::{A4x16Config, NeuropixelsConfig, ProbeFamily, UclaConfig};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub output: OutputConfig,
    pub probes: ProbesConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

/// One entry per probe family; a family left out is not generated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ProbesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a4x16: Option<ProbeEntry<A4x16Config>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neuropixels_1: Option<ProbeEntry<NeuropixelsConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neuropixels_2: Option<ProbeEntry<NeuropixelsConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ucla_128k: Option<ProbeEntry<UclaConfig>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ucla_256f: Option<ProbeEntry<UclaConfig>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProbeEntry<T> {
    pub file_name: String,
    pub layout: T,
}

impl<T> ProbeEntry<T> {
    fn standard(family: ProbeFamily, layout: T) -> Self {
        Self {
            file_name: family.file_name(),
            layout,
        }
    }
}

impl Config {
    /// All five families with their standard geometry and file names.
    pub fn standard<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            output: OutputConfig {
                directory: directory.as_ref().to_path_buf(),
            },
            probes: ProbesConfig {
                a4x16: Some(ProbeEntry::standard(
                    ProbeFamily::A4x16,
                    A4x16Config::standard(),
                )),
                neuropixels_1: Some(ProbeEntry::standard(
                    ProbeFamily::Neuropixels1,
                    NeuropixelsConfig::neuropixels_1(),
                )),
                neuropixels_2: Some(ProbeEntry::standard(
                    ProbeFamily::Neuropixels2,
                    NeuropixelsConfig::neuropixels_2(),
                )),
                ucla_128k: Some(ProbeEntry::standard(
                    ProbeFamily::Ucla128k,
                    UclaConfig::ucla_128k(),
                )),
                ucla_256f: Some(ProbeEntry::standard(
                    ProbeFamily::Ucla256f,
                    UclaConfig::ucla_256f(),
                )),
            },
        }
    }
}

impl ProbesConfig {
    /// Configured families, in [`ProbeFamily::ALL`] order.
    pub fn families(&self) -> Vec<ProbeFamily> {
        ProbeFamily::ALL
            .into_iter()
            .filter(|&family| self.file_name(family).is_some())
            .collect()
    }

    pub fn file_name(&self, family: ProbeFamily) -> Option<&str> {
        let name = match family {
            ProbeFamily::A4x16 => self.a4x16.as_ref().map(|e| &e.file_name),
            ProbeFamily::Neuropixels1 => self.neuropixels_1.as_ref().map(|e| &e.file_name),
            ProbeFamily::Neuropixels2 => self.neuropixels_2.as_ref().map(|e| &e.file_name),
            ProbeFamily::Ucla128k => self.ucla_128k.as_ref().map(|e| &e.file_name),
            ProbeFamily::Ucla256f => self.ucla_256f.as_ref().map(|e| &e.file_name),
        };
        name.map(String::as_str)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ProbeError> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|source| ProbeError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_yaml::from_str(&config_str)?)
}

pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ProbeError> {
    let path = path.as_ref();
    let yaml = serde_yaml::to_string(config)?;

    fs::write(path, yaml).map_err(|source| ProbeError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    })
}
