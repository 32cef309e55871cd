//! Pipeline configuration via `strand.toml`
//!
//! A pipeline can be built from a config file kept next to its outputs. All
//! fields have defaults, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use strand_core::{Error, Result};
use strand_storage::naming::{SequentialNamingScheme, DEFAULT_SHARD_BASE, DEFAULT_SHARD_DIGITS};

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "strand.toml";

/// Widest shard index padding accepted in config.
pub const MAX_SHARD_DIGITS: usize = 20;

/// Shard file naming for outputs written by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamingConfig {
    /// Prefix of every shard file name
    #[serde(default = "default_base")]
    pub base: String,
    /// Zero-padding width of the shard index
    #[serde(default = "default_digits")]
    pub digits: usize,
}

fn default_base() -> String {
    DEFAULT_SHARD_BASE.to_string()
}

fn default_digits() -> usize {
    DEFAULT_SHARD_DIGITS
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            base: default_base(),
            digits: default_digits(),
        }
    }
}

impl NamingConfig {
    /// Naming scheme described by this section.
    pub fn scheme(&self) -> SequentialNamingScheme {
        SequentialNamingScheme::with_digits(self.digits)
    }
}

/// Pipeline configuration loaded from `strand.toml`.
///
/// # Example
///
/// ```toml
/// name = "word-count"
/// shards = 4
///
/// [naming]
/// base = "part"
/// digits = 5
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pipeline name, used in logs.
    #[serde(default = "default_name")]
    pub name: String,
    /// Number of shard files each write produces.
    #[serde(default = "default_shards")]
    pub shards: usize,
    /// Shard file naming.
    #[serde(default)]
    pub naming: NamingConfig,
}

fn default_name() -> String {
    "strand".to_string()
}

fn default_shards() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            name: default_name(),
            shards: default_shards(),
            naming: NamingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Set the pipeline name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the shard count per write
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Set the shard file prefix
    pub fn with_shard_base(mut self, base: impl Into<String>) -> Self {
        self.naming.base = base.into();
        self
    }

    /// Set the shard index padding width
    pub fn with_shard_digits(mut self, digits: usize) -> Self {
        self.naming.digits = digits;
        self
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` if any value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.shards == 0 {
            return Err(Error::Config("shards must be at least 1".into()));
        }
        if self.naming.base.is_empty() {
            return Err(Error::Config("naming.base must not be empty".into()));
        }
        if self.naming.base.contains(|c: char| c == '/' || c == '\\') {
            return Err(Error::Config(format!(
                "naming.base '{}' must not contain path separators",
                self.naming.base
            )));
        }
        if !(1..=MAX_SHARD_DIGITS).contains(&self.naming.digits) {
            return Err(Error::Config(format!(
                "naming.digits must be between 1 and {}, got {}",
                MAX_SHARD_DIGITS, self.naming.digits
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strand pipeline configuration
#
# Pipeline name, used in logs
name = "strand"

# Number of shard files each write produces (at least 1)
shards = 1

[naming]
# Prefix of every shard file name
base = "part"
# Zero-padding width of the shard index (1-20)
digits = 5
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PipelineConfig = toml::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
