//! Narrow contracts the engine requires from its persistence collaborators.
//!
//! Backends live outside this crate; the engine only ever sees these traits.
//! Every method suspends, so each call is also a cancellation point for the
//! per-item batch deadline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{Account, NewTransaction, Recurring, Transaction};

/// Failure of an underlying create/read/update call, transient I/O included.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
}

type ResultStore<T> = Result<T, StoreError>;

/// Advance one definition's schedule to its next occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleAdvance {
    pub id: Uuid,
    pub next_date: DateTime<Utc>,
}

/// Partial update for the fields the engine owns on a [`Recurring`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecurringPatch {
    pub next_occurrence_date: Option<DateTime<Utc>>,
    pub last_auto_applied_at: Option<DateTime<Utc>>,
    pub last_applied_by: Option<String>,
}

#[async_trait]
pub trait RecurringStore: Send + Sync {
    /// Active, not-deleted definitions of the tenant with
    /// `next_occurrence_date <= as_of`.
    async fn find_due(&self, tenant_id: &str, as_of: DateTime<Utc>)
    -> ResultStore<Vec<Recurring>>;

    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> ResultStore<Option<Recurring>>;

    /// Rows that do not exist are skipped, not errors.
    async fn advance_schedule(&self, updates: &[ScheduleAdvance]) -> ResultStore<()>;

    async fn increment_failed_attempts(&self, ids: &[Uuid]) -> ResultStore<()>;

    async fn reset_failed_attempts(&self, ids: &[Uuid]) -> ResultStore<()>;

    async fn set_auto_apply_enabled(
        &self,
        id: Uuid,
        enabled: bool,
        tenant_id: Option<&str>,
    ) -> ResultStore<()>;

    async fn update(
        &self,
        id: Uuid,
        patch: RecurringPatch,
        tenant_id: &str,
    ) -> ResultStore<Option<Recurring>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(&self, data: NewTransaction, tenant_id: &str) -> ResultStore<Transaction>;

    /// Creates all rows or none; tenant scoping comes from each payload.
    async fn create_many(&self, data: Vec<NewTransaction>) -> ResultStore<Vec<Transaction>>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Applies a signed delta and returns the new balance in minor units.
    async fn adjust_balance(
        &self,
        account_id: Uuid,
        delta_minor: i64,
        tenant_id: &str,
    ) -> ResultStore<i64>;

    async fn find_by_id(&self, account_id: Uuid, tenant_id: &str)
    -> ResultStore<Option<Account>>;
}
