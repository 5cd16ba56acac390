//! Layered application configuration.
//!
//! Values are merged with figment, later layers winning:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. TOML file: `--config <PATH>` or `<config dir>/hdcleaner/config.toml`
//! 3. environment variables prefixed `HDCLEANER_` (e.g. `HDCLEANER_IO_THREADS=8`)
//! 4. command-line flags ([`ConfigOverrides`])
//!
//! A missing default file is ignored. A file named explicitly must exist.
//!
//! ```toml
//! io_threads = 2
//! chunk_size = 131072
//! min_size = 4096
//! include_hidden = false
//! follow_symlinks = false
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::catalog::FilterOptions;
use crate::duplicates::{FinderConfig, DEFAULT_IO_THREADS};
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "HDCLEANER_";

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly named configuration file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or holds a value of the wrong type.
    #[error("Invalid configuration: {0}")]
    Invalid(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of hashing threads
    pub io_threads: usize,
    /// Read chunk size in bytes
    pub chunk_size: usize,
    /// Minimum file size in bytes
    pub min_size: u64,
    /// Compare hidden, VCS and OS metadata files too
    pub include_hidden: bool,
    /// Follow symbolic links while enumerating
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_size: 0,
            include_hidden: false,
            follow_symlinks: false,
        }
    }
}

/// Values given on the command line. `None` leaves lower layers in effect.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    /// `--io-threads`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_threads: Option<usize>,
    /// `--chunk-size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    /// `--min-size`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// `--include-hidden`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_hidden: Option<bool>,
    /// `--follow-symlinks`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_symlinks: Option<bool>,
}

impl From<&crate::cli::CommonArgs> for ConfigOverrides {
    fn from(args: &crate::cli::CommonArgs) -> Self {
        // Boolean switches can only turn a setting on.
        Self {
            io_threads: args.io_threads,
            chunk_size: args.chunk_size,
            min_size: args.min_size,
            include_hidden: args.include_hidden.then_some(true),
            follow_symlinks: args.follow_symlinks.then_some(true),
        }
    }
}

impl Config {
    /// Default platform-specific configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "hdcleaner").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the layered figment without CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file.
    pub fn figment(explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading configuration from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading configuration from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load configuration from all layers.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a missing explicit file, malformed TOML,
    /// or a value of the wrong type in any layer.
    pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config: Config = Self::figment(explicit)?
            .merge(Serialized::defaults(overrides))
            .extract()?;
        log::debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    /// Record filters derived from this configuration.
    #[must_use]
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::default()
            .with_min_size(self.min_size)
            .with_only_visible(!self.include_hidden)
    }

    /// Pipeline configuration derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_chunk_size(self.chunk_size)
            .with_filter(self.filter_options())
    }

    /// Enumeration configuration derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.follow_symlinks)
    }
}
