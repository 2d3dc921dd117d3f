//! Handles settings for the startup check. Configuration is written in
//! `settings.toml`; every field has a default, so an empty file is valid.

use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StartupSettings {
    /// When false, `initialize_on_startup` returns immediately and arms no
    /// timer.
    pub enabled: bool,
    /// Wait before the first attempt, leaving the host's startup sequence
    /// room to finish.
    pub delay_ms: u64,
    /// Retries after the first attempt; `0` means a single attempt.
    pub max_retries: u32,
    /// Sleep between attempts. Skipped after the final one.
    pub retry_delay_ms: u64,
    /// Per-attempt deadline on the engine call.
    pub timeout_ms: u64,
    /// Emit a user-facing error notification on exhaustion. The log entry is
    /// written either way.
    pub notify_on_error: bool,
    /// When false, exhaustion escalates as an error instead of resolving
    /// quietly.
    pub skip_on_error: bool,
}

impl Default for StartupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: 2_000,
            max_retries: 3,
            retry_delay_ms: 5_000,
            timeout_ms: 60_000,
            notify_on_error: true,
            skip_on_error: true,
        }
    }
}

impl StartupSettings {
    /// Loads settings from `<name>.toml` (or any format the config crate
    /// recognizes under that stem).
    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(name))
            .build()?;

        settings.try_deserialize()
    }

    pub(crate) fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub(crate) fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub(crate) fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
