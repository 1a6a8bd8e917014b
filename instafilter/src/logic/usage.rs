use crate::config::Config;
use filter_session::{SessionError, SessionResult, UsageStore};
use log::debug;

/// Keeps the filter change counter in the config file.
#[derive(Debug, Clone)]
pub struct ConfigUsageStore {
    config: Config,
}

impl ConfigUsageStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl UsageStore for ConfigUsageStore {
    fn load(&mut self) -> u32 {
        self.config.filter_count
    }

    fn flush(&mut self, count: u32) -> SessionResult<()> {
        if self.config.filter_count == count {
            return Ok(());
        }

        self.config.filter_count = count;
        self.config
            .save()
            .map_err(|e| SessionError::Storage(e.to_string()))?;

        debug!("filterCount = {count}");
        Ok(())
    }
}
