//! Ledger transaction primitives produced by materialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Creation payload for one ledger transaction.
///
/// The id is generated engine-side so a transfer pair can carry reciprocal
/// `linked_transaction_id` references from the moment both rows are created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub id: Uuid,
    pub tenant_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    /// Signed amount in integer minor units.
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub recurring_id: Option<Uuid>,
    pub linked_transaction_id: Option<Uuid>,
    pub created_by: String,
}

impl NewTransaction {
    pub fn new(
        tenant_id: impl Into<String>,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        created_by: impl Into<String>,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4(),
            tenant_id,
            account_id,
            kind,
            amount_minor,
            occurred_at,
            created_by,
        )
    }

    pub fn with_id(
        id: Uuid,
        tenant_id: impl Into<String>,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tenant_id: tenant_id.into(),
            account_id,
            kind,
            amount_minor,
            occurred_at,
            note: None,
            recurring_id: None,
            linked_transaction_id: None,
            created_by: created_by.into(),
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn recurring(mut self, recurring_id: Uuid) -> Self {
        self.recurring_id = Some(recurring_id);
        self
    }

    #[must_use]
    pub fn linked(mut self, transaction_id: Uuid) -> Self {
        self.linked_transaction_id = Some(transaction_id);
        self
    }
}

/// A materialized ledger transaction as returned by the transaction store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub tenant_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub recurring_id: Option<Uuid>,
    pub linked_transaction_id: Option<Uuid>,
    pub created_by: String,
}

impl From<NewTransaction> for Transaction {
    fn from(data: NewTransaction) -> Self {
        Self {
            id: data.id,
            tenant_id: data.tenant_id,
            account_id: data.account_id,
            kind: data.kind,
            amount_minor: data.amount_minor,
            occurred_at: data.occurred_at,
            note: data.note,
            recurring_id: data.recurring_id,
            linked_transaction_id: data.linked_transaction_id,
            created_by: data.created_by,
        }
    }
}
