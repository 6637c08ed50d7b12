use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    ckks::Parameters,
    error::{Error, Result},
    kernel::KernelOptions,
};

/// Everything fixed before a product is computed.
///
/// ```toml
/// [scheme]
/// log_n = 14
/// max_level = 7
///
/// [kernel]
/// reduction = "linear"
/// precision = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scheme: Parameters,
    pub kernel: KernelOptions,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.scheme.validate()?;
        config.kernel.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }
}
