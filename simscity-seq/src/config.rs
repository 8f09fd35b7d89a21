use std::fs::{read_to_string, write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fragments::FragmentConfig;
use crate::library_size::LibrarySizeParams;
use crate::pcr::PcrConfig;
use crate::umi::ZeroExpressionPolicy;

///
/// Settings for a full sequencing simulation (library sizes, fragmentation,
/// UMI sampling and optional PCR).
///
/// # Example
/// ```toml
/// sparse = true
/// seed = 42
///
/// [library_size]
/// loc = 8.0
/// scale = 0.4
///
/// [fragments]
/// lam = 1.0
///
/// [pcr]
/// betas = 0.6
/// n_cycles = 12
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SequencingConfig {
    pub library_size: LibrarySizeParams,
    /// Fragment genes before sampling. Without it every gene is one feature.
    pub fragments: Option<FragmentConfig>,
    /// Amplify the UMI counts. Without it no reads are produced.
    pub pcr: Option<PcrConfig>,
    pub sparse: bool,
    pub zero_expression: ZeroExpressionPolicy,
    pub seed: Option<u64>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl SequencingConfig {
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_file(&self, path: &Path) -> ConfigResult<()> {
        write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

impl TryFrom<&Path> for SequencingConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        SequencingConfig::from_toml_str(&toml_str)
    }
}
