use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};
use crate::storage::{check_key, MEDICATIONS_KEY};

pub const CONFIG_FILE: &str = "config.yaml";

/// Project settings, read from `.medtracker/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Storage key holding the medication list.
    pub storage_key: String,
    /// Seconds between reminder checks, at most 60 so no minute is skipped.
    pub reminder_interval_secs: u64,
    /// How long a shown reminder should stay up.
    pub notification_dismiss_secs: u64,
    /// When false, reminder permission is denied and ticks do nothing.
    pub notifications: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: MEDICATIONS_KEY.to_string(),
            reminder_interval_secs: 60,
            notification_dismiss_secs: 10,
            notifications: true,
        }
    }
}

impl TrackerConfig {
    /// Load the config from a `.medtracker/` directory. A missing file yields defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let config = match fs::read_to_string(dir.join(CONFIG_FILE)) {
            Ok(text) if text.trim().is_empty() => Self::default(),
            Ok(text) => serde_yaml::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(CONFIG_FILE), serde_yaml::to_string(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=60).contains(&self.reminder_interval_secs) {
            return Err(TrackerError::Validation(format!(
                "reminder_interval_secs must be between 1 and 60, got {}",
                self.reminder_interval_secs
            )));
        }
        check_key(&self.storage_key)
    }

    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }

    pub fn dismiss_after(&self) -> Duration {
        Duration::from_secs(self.notification_dismiss_secs)
    }
}
