use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::{ApplyResult, AutoApplyResult, BatchApplyResult, Recurring};

use super::Engine;

impl Engine {
    /// Applies definitions in sequential chunks of at most `max_batch_size`,
    /// dispatching the items of a chunk concurrently. Peak concurrent writes
    /// are therefore bounded by the chunk size.
    ///
    /// Each item runs under a `timeout_ms` deadline. The deadline is
    /// cooperative: a timed-out item resolves to a failed result, but writes
    /// it already issued are not retracted. Treat a timeout as "unknown,
    /// verify before retrying", never as "rolled back".
    ///
    /// Results come back in submission order, not completion order. The
    /// summary tallies applied/failed only; the pending partition is owned by
    /// [`check_and_apply_due_transactions`].
    ///
    /// [`check_and_apply_due_transactions`]: Engine::check_and_apply_due_transactions
    pub async fn batch_apply_transactions(
        &self,
        recurrings: Vec<Recurring>,
        tenant_id: &str,
        user_id: &str,
    ) -> BatchApplyResult {
        // Settings are read once per run; concurrent updates apply to the
        // next run.
        let settings = self.auto_apply_settings();
        let chunk_size = settings.max_batch_size.max(1);
        let deadline = settings.timeout();
        let timeout_ms = settings.timeout_ms;

        let mut results: Vec<ApplyResult> = Vec::with_capacity(recurrings.len());
        for chunk in recurrings.chunks(chunk_size) {
            let mut tasks = JoinSet::new();
            for (offset, recurring) in chunk.iter().cloned().enumerate() {
                let engine = self.clone();
                let tenant = tenant_id.to_string();
                let user = user_id.to_string();
                tasks.spawn(async move {
                    let outcome = timeout(
                        deadline,
                        engine.apply_recurring_transaction(&recurring, &tenant, &user),
                    )
                    .await;
                    let result = match outcome {
                        Ok(result) => result,
                        Err(_) => {
                            tracing::warn!(
                                recurring_id = %recurring.id,
                                name = %recurring.name,
                                timeout_ms,
                                "recurring transaction timed out"
                            );
                            ApplyResult::timed_out(recurring, timeout_ms)
                        }
                    };
                    (offset, result)
                });
            }

            let mut chunk_results: Vec<(usize, ApplyResult)> = Vec::with_capacity(chunk.len());
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(pair) => chunk_results.push(pair),
                    Err(err) => tracing::error!("apply task failed to join: {err}"),
                }
            }
            chunk_results.sort_by_key(|(offset, _)| *offset);
            results.extend(chunk_results.into_iter().map(|(_, result)| result));
        }

        let mut summary = AutoApplyResult::default();
        for result in &results {
            summary.record(result);
        }
        BatchApplyResult { results, summary }
    }
}
