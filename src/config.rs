//! Configuration loaded from `wilt.toml`.
//!
//! [`WiltConfig`] holds every tunable. Fields missing from the file fall back
//! to defaults, and the `WILT_STORE` environment variable overrides the
//! store location.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, WiltError};
use crate::state_machine::DelaySchedule;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wilt.toml";

/// Environment variable overriding [`WiltConfig::store_path`].
pub const STORE_ENV_VAR: &str = "WILT_STORE";

#[derive(Debug, Clone, Deserialize)]
pub struct WiltConfig {
    /// Where the plant's state is persisted.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// Leave the run loop once the plant is dead.
    #[serde(default = "default_stop_when_dead")]
    pub stop_when_dead: bool,

    /// Seconds between wakes, per state.
    #[serde(default)]
    pub delays: DelaySchedule,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("wilt-state.json")
}

fn default_stop_when_dead() -> bool {
    true
}

impl Default for WiltConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            stop_when_dead: default_stop_when_dead(),
            delays: DelaySchedule::default(),
        }
    }
}

impl WiltConfig {
    /// Load from `path`, or use defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<WiltConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(store) = std::env::var(STORE_ENV_VAR)
            && !store.is_empty()
        {
            config.store_path = PathBuf::from(store);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.store_path.as_os_str().is_empty() {
            return Err(WiltError::Config("store_path must not be empty".into()));
        }
        Ok(())
    }
}
