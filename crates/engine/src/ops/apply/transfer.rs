use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{EngineError, NewTransaction, Recurring, ResultEngine, TransactionKind};

use super::super::Engine;
use super::{required_amount, source_account};

impl Engine {
    /// Two reciprocal-linked transactions plus two independent balance
    /// updates: `+amount` at the source, `-amount` at the destination.
    ///
    /// The mirror row is stamped one second after the primary so a date sort
    /// orders the pair deterministically.
    pub(crate) async fn materialize_transfer(
        &self,
        recurring: &Recurring,
        tenant_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        let source_id = source_account(recurring)?;
        let destination_id = recurring
            .transfer_account_id
            .ok_or_else(|| EngineError::Validation("transfer account is required".to_string()))?;
        let amount_minor = required_amount(recurring)?;

        let occurred_at = Utc::now();
        let primary_id = Uuid::new_v4();
        let mirror_id = Uuid::new_v4();

        let primary = NewTransaction::with_id(
            primary_id,
            tenant_id,
            source_id,
            TransactionKind::Transfer,
            amount_minor,
            occurred_at,
            user_id,
        )
        .note(recurring.name.as_str())
        .recurring(recurring.id)
        .linked(mirror_id);

        let mirror = NewTransaction::with_id(
            mirror_id,
            tenant_id,
            destination_id,
            TransactionKind::Transfer,
            -amount_minor,
            occurred_at + Duration::seconds(1),
            user_id,
        )
        .note(recurring.name.as_str())
        .recurring(recurring.id)
        .linked(primary_id);

        self.transactions.create_many(vec![primary, mirror]).await?;

        // Two independent calls: the second can fail after the first landed.
        // Such a partial failure is surfaced as a failed result, not
        // compensated.
        self.accounts
            .adjust_balance(source_id, amount_minor, tenant_id)
            .await?;
        self.accounts
            .adjust_balance(destination_id, -amount_minor, tenant_id)
            .await?;
        Ok(vec![primary_id, mirror_id])
    }
}
