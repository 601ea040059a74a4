use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use log::LevelFilter;
use crate::{Error, Result};

pub const DATA_DIR_VAR: &str = "BUCKET_STORE_DATA_DIR";
pub const BACKEND_VAR: &str = "BUCKET_STORE_BACKEND";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

const DEFAULT_DATA_DIR: &str = "./data";
const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Which [`crate::Store`] implementation to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Single-file `redb` database under the data directory.
    #[default]
    Durable,
    /// Process-local map, discarded on exit.
    Memory,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "durable" => Ok(Backend::Durable),
            "memory" => Ok(Backend::Memory),
            _ => Err(Error::Config(format!(
                "{} must be one of durable, memory; got {:?}",
                BACKEND_VAR, s
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Durable => f.write_str("durable"),
            Backend::Memory => f.write_str("memory"),
        }
    }
}

/// Runtime configuration, normally read from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the durable store's database file.
    pub data_dir: PathBuf,
    pub backend: Backend,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            backend: Backend::Durable,
            log_level: LevelFilter::Info,
        }
    }
}

impl Config {
    /// Loads and validates configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Unset variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(backend) = lookup(BACKEND_VAR) {
            config.backend = backend.parse()?;
        }
        if let Some(level) = lookup(LOG_LEVEL_VAR) {
            config.log_level = parse_log_level(&level)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values and
    /// revalidates. `None` keeps the environment's value.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, backend: Option<Backend>) -> Result<Self> {
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        if let Some(backend) = backend {
            self.backend = backend;
        }
        self.validate()?;
        Ok(self)
    }

    /// Checks cross-field constraints. Called by the loaders and by
    /// [`Config::with_overrides`].
    pub fn validate(&self) -> Result<()> {
        if self.backend == Backend::Durable && self.data_dir.as_os_str().is_empty() {
            return Err(Error::Config(format!(
                "{} must not be empty for the durable backend",
                DATA_DIR_VAR
            )));
        }
        Ok(())
    }
}

fn parse_log_level(level: &str) -> Result<LevelFilter> {
    let normalized = level.to_ascii_lowercase();
    if !VALID_LOG_LEVELS.contains(&normalized.as_str()) {
        return Err(Error::Config(format!(
            "{} must be one of {}; got {:?}",
            LOG_LEVEL_VAR,
            VALID_LOG_LEVELS.join(", "),
            level
        )));
    }
    LevelFilter::from_str(&normalized).map_err(|e| Error::Config(e.to_string()))
}
