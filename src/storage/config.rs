use anyhow::Result;

use super::{
    helpers::{read_json, write_json_atomic},
    Storage,
};
use crate::models::Config;

const ENABLE_LOGS: bool = true;

impl Storage {
    /// Persisted config, or the default written to disk on first access.
    pub fn get_config(&self) -> Result<Config> {
        let path = self.config_path();
        if let Some(config) = read_json::<Config>(&path)? {
            return Ok(config);
        }

        let config = Config::default();
        self.save_config(&config)?;
        crate::log_info!("No config found; wrote defaults to {}", path.display());
        Ok(config)
    }

    /// Overwrites the stored config; out-of-range values are rejected unwritten.
    pub fn save_config(&self, config: &Config) -> Result<()> {
        config.validate()?;
        write_json_atomic(&self.config_path(), config)
    }

    pub fn is_first_run(&self) -> bool {
        !self.config_path().exists()
    }
}
