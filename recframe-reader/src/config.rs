//! Reader configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via RECFRAME_CONFIG or `from_file`)
//! 3. Environment variables

use crate::{DEFAULT_INITIAL_PAYLOAD_CAPACITY, DEFAULT_MAX_RECORD_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What to do with the two check fields of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumPolicy {
    /// Read and discard the check fields.
    #[default]
    Skip,
    /// Verify both fields as masked CRC32C.
    Verify,
}

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Largest declared payload length accepted before stopping with an oversize error.
    pub max_record_size: u64,
    /// Check field handling.
    pub checksums: ChecksumPolicy,
    /// Upper bound on the payload buffer reserved before payload bytes arrive.
    pub initial_payload_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            checksums: ChecksumPolicy::Skip,
            initial_payload_capacity: DEFAULT_INITIAL_PAYLOAD_CAPACITY,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_record_size(mut self, max: u64) -> Self {
        self.max_record_size = max;
        self
    }

    pub fn with_checksums(mut self, policy: ChecksumPolicy) -> Self {
        self.checksums = policy;
        self
    }

    pub fn with_initial_payload_capacity(mut self, capacity: usize) -> Self {
        self.initial_payload_capacity = capacity;
        self
    }

    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("RECFRAME_CONFIG") {
            config = Self::from_file(&path)?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: ReaderConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(max) = std::env::var("RECFRAME_MAX_RECORD_SIZE") {
            if let Ok(n) = max.parse() {
                self.max_record_size = n;
            }
        }

        if let Ok(verify) = std::env::var("RECFRAME_VERIFY_CHECKSUMS") {
            self.checksums = if verify == "1" || verify.to_lowercase() == "true" {
                ChecksumPolicy::Verify
            } else {
                ChecksumPolicy::Skip
            };
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_record_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_record_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns whether check fields are verified.
    pub fn verifies_checksums(&self) -> bool {
        self.checksums == ChecksumPolicy::Verify
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    IoError(PathBuf, std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    ParseError(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert_eq!(config.max_record_size, 256 * 1024 * 1024);
        assert_eq!(config.checksums, ChecksumPolicy::Skip);
        assert!(!config.verifies_checksums());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = ReaderConfig::new()
            .with_max_record_size(1024)
            .with_checksums(ChecksumPolicy::Verify)
            .with_initial_payload_capacity(16);
        assert_eq!(config.max_record_size, 1024);
        assert!(config.verifies_checksums());
        assert_eq!(config.initial_payload_capacity, 16);
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let config = ReaderConfig::new().with_max_record_size(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = ReaderConfig::new().with_checksums(ChecksumPolicy::Verify);
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: ReaderConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_record_size: 4096").unwrap();
        writeln!(file, "checksums: verify").unwrap();
        file.flush().unwrap();

        let config = ReaderConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_record_size, 4096);
        assert_eq!(config.checksums, ChecksumPolicy::Verify);
        assert_eq!(
            config.initial_payload_capacity,
            DEFAULT_INITIAL_PAYLOAD_CAPACITY
        );
    }

    #[test]
    fn test_from_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            ReaderConfig::from_file(&missing),
            Err(ConfigError::IoError(..))
        ));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "max_record_size: [not, a, number]").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            ReaderConfig::from_file(file.path()),
            Err(ConfigError::ParseError(..))
        ));
    }
}
