//! Single-flight startup runner around the engine's due-check.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use engine::{AutoApplyResult, Engine};
use serde::Serialize;
use tokio::time::{Instant, sleep, timeout};

use crate::{Notifier, StartupError, StartupSettings};

/// Lifecycle of the startup check. One run per process start; a terminal
/// state is never left.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// The delay timer is armed but the first attempt has not started.
    Scheduled,
    Running,
    Succeeded,
    /// Every attempt failed.
    Exhausted,
}

/// Outcome of one supervised run, kept for later inspection.
#[derive(Clone, Debug, Serialize)]
pub struct StartupResult {
    pub success: bool,
    pub result: Option<AutoApplyResult>,
    pub error: Option<String>,
    /// Index of the attempt that produced this result; `0` means the first
    /// attempt went through.
    pub retry_count: u32,
    /// Duration of the final attempt only, not of the whole retry loop.
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

pub struct Supervisor {
    engine: Engine,
    notifier: Arc<dyn Notifier>,
    settings: StartupSettings,
    tenant_id: String,
    user_id: String,
    state: Mutex<RunState>,
    last_result: Mutex<Option<StartupResult>>,
}

impl Supervisor {
    pub fn new(
        engine: Engine,
        notifier: Arc<dyn Notifier>,
        settings: StartupSettings,
        tenant_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            notifier,
            settings,
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            state: Mutex::new(RunState::Idle),
            last_result: Mutex::new(None),
        }
    }

    pub fn state(&self) -> RunState {
        *self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn last_result(&self) -> Option<StartupResult> {
        self.last_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs the startup check: waits the configured delay, then attempts the
    /// due-check until it succeeds or retries are exhausted.
    ///
    /// Returns `Ok(None)` when the check is disabled. A concurrent call while
    /// a run is scheduled or in flight resolves to the last stored result
    /// instead of starting a second run. Exhaustion resolves to the failed
    /// result unless `skip_on_error` is off, in which case it escalates.
    pub async fn initialize_on_startup(&self) -> Result<Option<StartupResult>, StartupError> {
        if !self.settings.enabled {
            tracing::info!("startup check disabled, skipping");
            return Ok(None);
        }

        if !self.try_schedule() {
            tracing::debug!("startup check already scheduled, reusing last result");
            return Ok(self.last_result());
        }

        tracing::info!(
            delay_ms = self.settings.delay_ms,
            "startup check scheduled"
        );
        sleep(self.settings.delay()).await;

        let result = self.execute_with_retry().await;
        if !result.success && !self.settings.skip_on_error {
            return Err(StartupError::ExhaustedRetries {
                attempts: self.settings.max_retries + 1,
                last_error: result.error.clone().unwrap_or_default(),
            });
        }

        Ok(Some(result))
    }

    /// Runs the check immediately, without delay. Fails fast with
    /// `AlreadyRunning` instead of queueing behind an in-flight run.
    ///
    /// A run that exhausts its retries still resolves to the failed result;
    /// the caller inspects `success`.
    pub async fn trigger_manual_check(&self) -> Result<StartupResult, StartupError> {
        if !self.try_schedule() {
            return Err(StartupError::AlreadyRunning);
        }

        tracing::info!("manual startup check triggered");
        Ok(self.execute_with_retry().await)
    }

    /// Claims the run slot. Only one caller wins between two terminal states.
    fn try_schedule(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            RunState::Scheduled | RunState::Running => false,
            RunState::Idle | RunState::Succeeded | RunState::Exhausted => {
                *state = RunState::Scheduled;
                true
            }
        }
    }

    fn set_state(&self, next: RunState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    async fn execute_with_retry(&self) -> StartupResult {
        self.set_state(RunState::Running);

        let mut last_error = String::new();
        for attempt in 0..=self.settings.max_retries {
            let started = Instant::now();
            let outcome = timeout(
                self.settings.timeout(),
                self.engine
                    .check_and_apply_due_transactions(&self.tenant_id, &self.user_id),
            )
            .await;

            match outcome {
                Ok(Ok(result)) => {
                    let startup = StartupResult {
                        success: true,
                        result: Some(result.clone()),
                        error: None,
                        retry_count: attempt,
                        execution_time_ms: started.elapsed().as_millis() as u64,
                        timestamp: Utc::now(),
                    };
                    tracing::info!(
                        attempt,
                        applied = result.applied_count,
                        failed = result.failed_count,
                        pending = result.pending_count,
                        "startup check succeeded"
                    );
                    self.notify_summary(&result);
                    self.set_state(RunState::Succeeded);
                    self.store_result(startup.clone());
                    return startup;
                }
                Ok(Err(err)) => {
                    last_error = err.to_string();
                    tracing::warn!(attempt, "startup check attempt failed: {err}");
                }
                Err(_) => {
                    last_error = format!("timed out after {}ms", self.settings.timeout_ms);
                    tracing::warn!(attempt, "startup check attempt timed out");
                }
            }

            if attempt < self.settings.max_retries {
                sleep(self.settings.retry_delay()).await;
            }
        }

        let attempts = self.settings.max_retries + 1;
        tracing::error!(attempts, "startup check exhausted retries: {last_error}");
        if self.settings.notify_on_error {
            self.notifier.show_error(&format!(
                "Automatic transaction check failed after {attempts} attempt(s): {last_error}"
            ));
        }

        let startup = StartupResult {
            success: false,
            result: None,
            error: Some(last_error),
            retry_count: self.settings.max_retries,
            execution_time_ms: 0,
            timestamp: Utc::now(),
        };
        self.set_state(RunState::Exhausted);
        self.store_result(startup.clone());
        startup
    }

    fn store_result(&self, result: StartupResult) {
        *self
            .last_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    fn notify_summary(&self, result: &AutoApplyResult) {
        if result.is_empty() {
            tracing::info!("startup check found nothing due");
            return;
        }

        if result.applied_count > 0 {
            self.notifier.show_success(&format!(
                "Applied {} recurring transaction(s) automatically",
                result.applied_count
            ));
        }
        if result.failed_count > 0 {
            self.notifier.show_error(&format!(
                "{} recurring transaction(s) failed to apply",
                result.failed_count
            ));
        }
        if result.pending_count > 0 {
            self.notifier.show_info(&format!(
                "{} recurring transaction(s) are due and waiting for manual review",
                result.pending_count
            ));
        }
    }
}
