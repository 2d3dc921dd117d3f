use chrono::Utc;
use uuid::Uuid;

use crate::{NewTransaction, Recurring, ResultEngine, TransactionKind};

use super::super::Engine;
use super::{required_amount, source_account};

impl Engine {
    /// One transaction at the source account for the configured amount, plus
    /// a matching balance adjustment.
    pub(crate) async fn materialize_standard(
        &self,
        recurring: &Recurring,
        tenant_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        let source_id = source_account(recurring)?;
        let amount_minor = required_amount(recurring)?;

        let data = NewTransaction::new(
            tenant_id,
            source_id,
            TransactionKind::Income,
            amount_minor,
            Utc::now(),
            user_id,
        )
        .note(recurring.name.as_str())
        .recurring(recurring.id);

        let transaction = self.transactions.create(data, tenant_id).await?;
        self.accounts
            .adjust_balance(source_id, amount_minor, tenant_id)
            .await?;
        Ok(vec![transaction.id])
    }
}
