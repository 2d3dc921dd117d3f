use chrono::Utc;
use uuid::Uuid;

use crate::{EngineError, NewTransaction, Recurring, ResultEngine, TransactionKind};

use super::super::Engine;
use super::source_account;

impl Engine {
    /// Pays off the negative balance of the liability account referenced by
    /// `category_id`: one expense transaction at the source for |balance|,
    /// then both balances move towards the paid state.
    pub(crate) async fn materialize_credit_card_payment(
        &self,
        recurring: &Recurring,
        tenant_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        let source_id = source_account(recurring)?;
        let liability_id = recurring.category_id.ok_or_else(|| {
            EngineError::Validation("liability account reference is required".to_string())
        })?;

        let liability = self
            .accounts
            .find_by_id(liability_id, tenant_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("account {liability_id}")))?;

        if liability.balance_minor >= 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "no balance to pay on {}",
                liability.name
            )));
        }
        let payment_minor = -liability.balance_minor;

        let data = NewTransaction::new(
            tenant_id,
            source_id,
            TransactionKind::Expense,
            payment_minor,
            Utc::now(),
            user_id,
        )
        .note(recurring.name.as_str())
        .recurring(recurring.id);

        let transaction = self.transactions.create(data, tenant_id).await?;

        // Liability moves towards zero, source is debited by the payment.
        self.accounts
            .adjust_balance(liability_id, payment_minor, tenant_id)
            .await?;
        self.accounts
            .adjust_balance(source_id, payment_minor, tenant_id)
            .await?;
        Ok(vec![transaction.id])
    }
}
