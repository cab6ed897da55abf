use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use sql_training_core::records::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_STAGE_DIR: &str = "./stages";

/// Optional YAML file. Relative paths resolve against the file's directory.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub data_dir: Option<PathBuf>,
    pub stage_dir: Option<PathBuf>,
    pub chunk_size: Option<usize>,
}

/// Flag values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub stage_dir: Option<PathBuf>,
    pub chunk_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HarnessConfig {
    pub data_dir: PathBuf,
    pub stage_dir: PathBuf,
    pub chunk_size: usize,
}

impl ConfigFile {
    /// # Errors
    /// Returns an error when the file cannot be read or is not valid config YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut file: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        file.data_dir = file.data_dir.map(|dir| base.join(dir));
        file.stage_dir = file.stage_dir.map(|dir| base.join(dir));
        Ok(file)
    }
}

impl HarnessConfig {
    /// Flags win over the file, the file wins over the defaults.
    ///
    /// # Errors
    /// Returns an error when the config file is unreadable or the chunk size is zero.
    pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let file = config_path.map(ConfigFile::load).transpose()?.unwrap_or_default();

        let config = Self {
            data_dir: overrides
                .data_dir
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            stage_dir: overrides
                .stage_dir
                .or(file.stage_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGE_DIR)),
            chunk_size: overrides.chunk_size.or(file.chunk_size).unwrap_or(DEFAULT_CHUNK_SIZE),
        };
        if config.chunk_size == 0 {
            return Err(anyhow!("chunk_size must be at least 1"));
        }
        Ok(config)
    }
}
