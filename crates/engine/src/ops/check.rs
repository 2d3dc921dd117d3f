use chrono::{DateTime, Utc};

use crate::{AutoApplyResult, Recurring, ResultEngine};

use super::Engine;

impl Engine {
    /// Runs one due-check: reads the due set, materializes the auto-apply
    /// partition and reports the rest as pending, untouched.
    ///
    /// With `global_enabled` off this returns a zero-valued result without a
    /// single store access. The partition is computed once, before any write
    /// begins, so classification reflects state at read time.
    pub async fn check_and_apply_due_transactions(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> ResultEngine<AutoApplyResult> {
        if !self.auto_apply_settings().global_enabled {
            tracing::debug!("auto-apply globally disabled, skipping due check");
            return Ok(AutoApplyResult::default());
        }

        let due = self.recurrings.find_due(tenant_id, Utc::now()).await?;
        let (enabled, pending): (Vec<Recurring>, Vec<Recurring>) =
            due.into_iter().partition(|r| r.auto_apply_enabled);

        tracing::info!(
            tenant_id,
            auto_apply = enabled.len(),
            pending = pending.len(),
            "processing due recurring transactions"
        );

        let batch = self
            .batch_apply_transactions(enabled, tenant_id, user_id)
            .await;
        let mut summary = batch.summary;
        summary.pending_count = pending.len();
        summary.pending_transactions = pending;
        Ok(summary)
    }

    /// Side-effect-free view of the due set, for previews and monitoring.
    pub async fn due_recurring_transactions(
        &self,
        tenant_id: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<Recurring>> {
        let as_of = as_of.unwrap_or_else(Utc::now);
        Ok(self.recurrings.find_due(tenant_id, as_of).await?)
    }
}
