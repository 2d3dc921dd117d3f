use chrono::Utc;
use uuid::Uuid;

use crate::store::{RecurringPatch, ScheduleAdvance};
use crate::{
    ApplyResult, EngineError, FailureDisposition, Recurring, RecurringKind, ResultEngine, schedule,
};

use super::Engine;

mod credit_card;
mod standard;
mod transfer;

impl Engine {
    /// Materializes one due definition and advances its schedule.
    ///
    /// Never returns an error to the caller: every failure becomes an
    /// [`ApplyResult`] with `success = false`. Validation failures are
    /// decided before any store access; dispatch failures feed the
    /// failed-attempt counter and, at the cap, permanently disable the
    /// definition.
    pub async fn apply_recurring_transaction(
        &self,
        recurring: &Recurring,
        tenant_id: &str,
        user_id: &str,
    ) -> ApplyResult {
        if let Err(err) = validate(recurring) {
            tracing::warn!(
                recurring_id = %recurring.id,
                name = %recurring.name,
                "recurring transaction rejected: {err}"
            );
            return ApplyResult::failed(recurring.clone(), &err, None);
        }

        match self.materialize(recurring, tenant_id, user_id).await {
            Ok(transaction_ids) => {
                let transaction_id = transaction_ids.first().copied();
                match self.record_success(recurring, tenant_id, user_id).await {
                    Ok(()) => {
                        tracing::info!(
                            recurring_id = %recurring.id,
                            name = %recurring.name,
                            "applied recurring transaction"
                        );
                        ApplyResult::applied(recurring.clone(), transaction_id)
                    }
                    Err(err) => {
                        // The ledger writes landed; only the schedule
                        // bookkeeping failed. Keep the transaction id so the
                        // failure can be reconciled manually.
                        tracing::error!(
                            recurring_id = %recurring.id,
                            "schedule bookkeeping failed after apply: {err}"
                        );
                        ApplyResult {
                            success: false,
                            transaction_id,
                            error: Some(err.to_string()),
                            disposition: None,
                            recurring: recurring.clone(),
                        }
                    }
                }
            }
            Err(err) => {
                let disposition = self.record_failure(recurring, &err, tenant_id).await;
                tracing::warn!(
                    recurring_id = %recurring.id,
                    name = %recurring.name,
                    disposition = disposition.as_str(),
                    "failed to apply recurring transaction: {err}"
                );
                ApplyResult::failed(recurring.clone(), &err, Some(disposition))
            }
        }
    }

    async fn materialize(
        &self,
        recurring: &Recurring,
        tenant_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        match recurring.kind {
            RecurringKind::Standard => self.materialize_standard(recurring, tenant_id, user_id).await,
            RecurringKind::Transfer => self.materialize_transfer(recurring, tenant_id, user_id).await,
            RecurringKind::CreditCardPayment => {
                self.materialize_credit_card_payment(recurring, tenant_id, user_id)
                    .await
            }
        }
    }

    /// Success bookkeeping: advance the schedule month-end-safely, clear the
    /// failure counter, stamp the application time and acting user.
    async fn record_success(
        &self,
        recurring: &Recurring,
        tenant_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let next_date =
            schedule::next_occurrence(recurring.next_occurrence_date, recurring.interval_months)?;
        self.recurrings
            .advance_schedule(&[ScheduleAdvance {
                id: recurring.id,
                next_date,
            }])
            .await?;

        if recurring.failed_attempts > 0 {
            self.recurrings.reset_failed_attempts(&[recurring.id]).await?;
        }

        let patch = RecurringPatch {
            last_auto_applied_at: Some(Utc::now()),
            last_applied_by: Some(user_id.to_string()),
            ..Default::default()
        };
        self.recurrings.update(recurring.id, patch, tenant_id).await?;
        Ok(())
    }

    /// Failure bookkeeping: one increment per attempt while under the cap, a
    /// disable once the counter reaches it. The schedule is never advanced on
    /// failure, so the next run sees the same due date.
    async fn record_failure(
        &self,
        recurring: &Recurring,
        error: &EngineError,
        tenant_id: &str,
    ) -> FailureDisposition {
        let mut failed_attempts = recurring.failed_attempts;
        if failed_attempts < recurring.max_failed_attempts {
            match self
                .recurrings
                .increment_failed_attempts(&[recurring.id])
                .await
            {
                Ok(()) => failed_attempts += 1,
                Err(err) => tracing::error!(
                    recurring_id = %recurring.id,
                    "failed to record failed attempt: {err}"
                ),
            }
        }

        if failed_attempts >= recurring.max_failed_attempts {
            if let Err(err) = self
                .recurrings
                .set_auto_apply_enabled(recurring.id, false, Some(tenant_id))
                .await
            {
                tracing::error!(
                    recurring_id = %recurring.id,
                    "failed to disable auto-apply: {err}"
                );
            }
            FailureDisposition::Disabled
        } else if matches!(error, EngineError::InsufficientFunds(_)) {
            FailureDisposition::SkippedInsufficientFunds
        } else {
            FailureDisposition::RetryLater
        }
    }
}

/// Checks a definition before any store access. A violation here costs no
/// failed-attempt slot: retrying cannot help until the definition is edited.
fn validate(recurring: &Recurring) -> ResultEngine<()> {
    if !recurring.is_active {
        return Err(EngineError::Validation(
            "recurring transaction is not active".to_string(),
        ));
    }

    match recurring.kind {
        // The payment amount comes from the liability balance.
        RecurringKind::CreditCardPayment => {}
        RecurringKind::Standard | RecurringKind::Transfer => match recurring.amount_minor {
            Some(amount) if amount > 0 => {}
            Some(_) => {
                return Err(EngineError::Validation("amount must be > 0".to_string()));
            }
            None if recurring.is_amount_flexible => {
                return Err(EngineError::Validation(
                    "flexible amount not resolved, cannot auto-apply".to_string(),
                ));
            }
            None => {
                return Err(EngineError::Validation("amount is required".to_string()));
            }
        },
    }

    if recurring.source_account_id.is_none() {
        return Err(EngineError::Validation(
            "source account is required".to_string(),
        ));
    }

    if recurring.kind == RecurringKind::Transfer {
        match recurring.transfer_account_id {
            None => {
                return Err(EngineError::Validation(
                    "transfer account is required".to_string(),
                ));
            }
            Some(destination) if Some(destination) == recurring.source_account_id => {
                return Err(EngineError::Validation(
                    "transfer account must differ from source account".to_string(),
                ));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn source_account(recurring: &Recurring) -> ResultEngine<Uuid> {
    recurring
        .source_account_id
        .ok_or_else(|| EngineError::Validation("source account is required".to_string()))
}

fn required_amount(recurring: &Recurring) -> ResultEngine<i64> {
    match recurring.amount_minor {
        Some(amount) if amount > 0 => Ok(amount),
        _ => Err(EngineError::Validation("amount is required".to_string())),
    }
}
