use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};

mod config;
pub mod helpers;
mod sessions;

use helpers::remove_if_exists;

const ENABLE_LOGS: bool = true;

const SESSIONS_FILE: &str = "sessions.json";
const CONFIG_FILE: &str = "config.json";
const DATA_DIR_ENV: &str = "FOCUSSESSIONS_DATA_DIR";
const DEFAULT_DIR_NAME: &str = ".focussessions";

/// Handle to the on-disk session log and config. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: Arc<PathBuf>,
}

impl Storage {
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir).with_context(|| {
            format!("failed to create data directory {}", data_dir.display())
        })?;

        crate::log_info!("Storage opened at {}", data_dir.display());

        Ok(Self {
            data_dir: Arc::new(data_dir),
        })
    }

    /// `$FOCUSSESSIONS_DATA_DIR` if set, otherwise `~/.focussessions`.
    pub fn open_default() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .ok_or_else(|| anyhow!("could not resolve the home directory"))?
                .join(DEFAULT_DIR_NAME),
        };
        Self::open(data_dir)
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_path()
    }

    fn sessions_path(&self) -> PathBuf {
        self.data_dir.join(SESSIONS_FILE)
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE)
    }

    /// Deletes every session and the config. Irreversible.
    pub fn reset_all(&self) -> Result<()> {
        remove_if_exists(&self.sessions_path())?;
        remove_if_exists(&self.config_path())?;
        crate::log_warn!("All session and config data removed from {}", self.data_dir.display());
        Ok(())
    }
}
