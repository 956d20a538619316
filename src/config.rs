//! Configuration loading for memedit
//!
//! Handles loading scanner settings from a TOML file and merging with
//! defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Upper bound on concurrent scan tasks
    #[serde(default = "default_max_threads")]
    pub max_threads: usize,

    /// Candidates handled per filter task
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_max_threads() -> usize {
    crate::sched::DEFAULT_MAX_THREADS
}

fn default_chunk_size() -> usize {
    crate::memory::scanner::DEFAULT_CHUNK_SIZE
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            max_threads: default_max_threads(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: ScannerConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the engine cannot honor
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanner.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "scanner.max_threads must be at least 1".to_string(),
            ));
        }
        let cap = num_cpus::get().max(1) * 16;
        if self.scanner.max_threads > cap {
            return Err(ConfigError::Invalid(format!(
                "scanner.max_threads {} is above the cap of {} for this machine",
                self.scanner.max_threads, cap
            )));
        }
        if self.scanner.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "scanner.chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scanner.max_threads, 8);
        assert_eq!(config.scanner.chunk_size, 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load("/nonexistent/memedit.toml").unwrap();
        assert_eq!(config.scanner.max_threads, 8);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\nmax_threads = 2").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.scanner.max_threads, 2);
        // Unset fields keep their defaults
        assert_eq!(config.scanner.chunk_size, 128);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\nchunk_size = 0").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scanner]\nmax_threads = 0").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scanner = nonsense").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
