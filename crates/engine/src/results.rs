//! Result vocabulary shared between the engine and its callers.
//!
//! These types are transient: they describe one invocation and are never
//! persisted. The engine stays silent towards users; callers render these
//! however they see fit.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Recurring};

/// How a dispatch failure was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureDisposition {
    /// The failed-attempt counter reached its cap; auto-apply was forced off
    /// and stays off until manually re-enabled.
    Disabled,
    /// Nothing to pay or not enough funds. The counter advanced, the schedule
    /// did not; next run sees the same date.
    SkippedInsufficientFunds,
    /// Transient by assumption; a later run retries.
    RetryLater,
}

impl FailureDisposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::SkippedInsufficientFunds => "skipped_insufficient_funds",
            Self::RetryLater => "retry_later",
        }
    }
}

/// Outcome of applying one recurring definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApplyResult {
    pub success: bool,
    /// Primary transaction id (a transfer reports its primary row).
    pub transaction_id: Option<Uuid>,
    pub error: Option<String>,
    pub disposition: Option<FailureDisposition>,
    /// The definition as seen at read time, before any bookkeeping.
    pub recurring: Recurring,
}

impl ApplyResult {
    pub fn applied(recurring: Recurring, transaction_id: Option<Uuid>) -> Self {
        Self {
            success: true,
            transaction_id,
            error: None,
            disposition: None,
            recurring,
        }
    }

    pub fn failed(
        recurring: Recurring,
        error: &EngineError,
        disposition: Option<FailureDisposition>,
    ) -> Self {
        Self {
            success: false,
            transaction_id: None,
            error: Some(error.to_string()),
            disposition,
            recurring,
        }
    }

    pub fn timed_out(recurring: Recurring, timeout_ms: u64) -> Self {
        Self::failed(recurring, &EngineError::Timeout(timeout_ms), None)
    }
}

/// Aggregated outcome of one engine invocation.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AutoApplyResult {
    pub applied_count: usize,
    pub failed_count: usize,
    pub pending_count: usize,
    pub applied_transactions: Vec<ApplyResult>,
    pub failed_transactions: Vec<ApplyResult>,
    /// Due definitions with auto-apply off; reported, never touched.
    pub pending_transactions: Vec<Recurring>,
}

impl AutoApplyResult {
    pub(crate) fn record(&mut self, result: &ApplyResult) {
        if result.success {
            self.applied_count += 1;
            self.applied_transactions.push(result.clone());
        } else {
            self.failed_count += 1;
            self.failed_transactions.push(result.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.applied_count == 0 && self.failed_count == 0 && self.pending_count == 0
    }
}

/// Per-item outcomes in submission order plus their tally.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BatchApplyResult {
    pub results: Vec<ApplyResult>,
    pub summary: AutoApplyResult,
}
