//! Per-engine auto-apply settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings owned by one [`Engine`] instance, read once at the start of a
/// batch run. There is no process-global singleton; each engine carries its
/// own copy so tenants and tests stay isolated.
///
/// [`Engine`]: crate::Engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoApplySettings {
    /// Master switch. When off, a due-check returns a zero result without
    /// touching any store.
    pub global_enabled: bool,
    /// Upper bound on concurrent materializations within one batch chunk.
    pub max_batch_size: usize,
    /// Per-item deadline during batch materialization.
    pub timeout_ms: u64,
}

impl Default for AutoApplySettings {
    fn default() -> Self {
        Self {
            global_enabled: true,
            max_batch_size: 10,
            timeout_ms: 30_000,
        }
    }
}

impl AutoApplySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub(crate) fn apply(&mut self, update: AutoApplySettingsUpdate) {
        if let Some(enabled) = update.global_enabled {
            self.global_enabled = enabled;
        }
        if let Some(size) = update.max_batch_size {
            self.max_batch_size = size;
        }
        if let Some(timeout_ms) = update.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
    }
}

/// Partial update for [`AutoApplySettings`]; unset fields keep their value.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoApplySettingsUpdate {
    pub global_enabled: Option<bool>,
    pub max_batch_size: Option<usize>,
    pub timeout_ms: Option<u64>,
}

impl AutoApplySettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn global_enabled(mut self, enabled: bool) -> Self {
        self.global_enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = Some(size);
        self
    }

    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}
