use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};
use crate::fs::{AreaRegistry, LocalFilesystem};

/// Max cache age in seconds. Default 10 minutes.
pub const DEFAULT_MAX_AGE: u64 = 600;

/// Default cache file extension
pub const DEFAULT_EXTENSION: &str = ".data";

/// Default permission mask applied to created directories and entry files
pub const DEFAULT_UMASK: u32 = 0o002;

/// Main configuration for a cache sweep run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub cache: CacheConfig,
    pub areas: Vec<AreaConfig>,
    pub logging: LoggingConfig,
}

/// File cache store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub directory: PathBuf,
    pub extension: String,
    pub umask: u32,
    pub max_age_secs: u64,
}

/// One named storage area swept by the flusher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            areas: vec![
                AreaConfig {
                    name: "cache".to_string(),
                    path: PathBuf::from("./data/cache"),
                },
                AreaConfig {
                    name: "thumbs".to_string(),
                    path: PathBuf::from("./data/thumbs"),
                },
            ],
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./data/cache/store"),
            extension: DEFAULT_EXTENSION.to_string(),
            umask: DEFAULT_UMASK,
            max_age_secs: DEFAULT_MAX_AGE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl CacheConfig {
    /// Store settings rooted at `directory`, everything else default
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Reject settings the store cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.extension.len() < 2 || !self.extension.starts_with('.') {
            return Err(CacheError::Config(format!(
                "extension must start with '.' and name a suffix, got {:?}",
                self.extension
            )));
        }
        if self.extension.contains(['/', '\\']) {
            return Err(CacheError::Config(format!(
                "extension must not contain path separators, got {:?}",
                self.extension
            )));
        }
        if self.umask > 0o777 {
            return Err(CacheError::Config(format!(
                "umask must be within 0o777, got {:#o}",
                self.umask
            )));
        }
        Ok(())
    }
}

impl SweepConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SweepConfig = serde_yaml::from_str(&content)?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Build the registry of local storage areas, in configured order
    pub fn area_registry(&self) -> AreaRegistry {
        let mut registry = AreaRegistry::new();
        for area in &self.areas {
            registry.register(area.name.clone(), LocalFilesystem::new(&area.path));
        }
        registry
    }
}
