//! In-memory store backend.
//!
//! Implements all three store contracts over process-local state. Tests and
//! local tooling use it directly; production hosts bring their own backends.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::{
    AccountStore, RecurringPatch, RecurringStore, ScheduleAdvance, StoreError, TransactionStore,
};
use crate::{Account, NewTransaction, Recurring, Transaction};

#[derive(Debug, Default)]
struct Inner {
    recurrings: HashMap<Uuid, Recurring>,
    accounts: HashMap<Uuid, Account>,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_recurring(&self, recurring: Recurring) {
        self.lock().recurrings.insert(recurring.id, recurring);
    }

    pub fn insert_account(&self, account: Account) {
        self.lock().accounts.insert(account.id, account);
    }

    pub fn recurring(&self, id: Uuid) -> Option<Recurring> {
        self.lock().recurrings.get(&id).cloned()
    }

    pub fn account_balance(&self, id: Uuid) -> Option<i64> {
        self.lock().accounts.get(&id).map(|a| a.balance_minor)
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.lock().transactions.clone()
    }
}

#[async_trait]
impl RecurringStore for MemoryStore {
    async fn find_due(
        &self,
        tenant_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Recurring>, StoreError> {
        let mut due: Vec<Recurring> = self
            .lock()
            .recurrings
            .values()
            .filter(|r| r.tenant_id == tenant_id && r.is_active && r.next_occurrence_date <= as_of)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.next_occurrence_date);
        Ok(due)
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> Result<Option<Recurring>, StoreError> {
        Ok(self
            .lock()
            .recurrings
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned())
    }

    async fn advance_schedule(&self, updates: &[ScheduleAdvance]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        for update in updates {
            if let Some(recurring) = inner.recurrings.get_mut(&update.id) {
                recurring.next_occurrence_date = update.next_date;
            }
        }
        Ok(())
    }

    async fn increment_failed_attempts(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        for id in ids {
            if let Some(recurring) = inner.recurrings.get_mut(id) {
                recurring.failed_attempts += 1;
            }
        }
        Ok(())
    }

    async fn reset_failed_attempts(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        for id in ids {
            if let Some(recurring) = inner.recurrings.get_mut(id) {
                recurring.failed_attempts = 0;
            }
        }
        Ok(())
    }

    async fn set_auto_apply_enabled(
        &self,
        id: Uuid,
        enabled: bool,
        tenant_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let recurring = inner
            .recurrings
            .get_mut(&id)
            .filter(|r| tenant_id.is_none_or(|t| r.tenant_id == t))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        recurring.auto_apply_enabled = enabled;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: RecurringPatch,
        tenant_id: &str,
    ) -> Result<Option<Recurring>, StoreError> {
        let mut inner = self.lock();
        let Some(recurring) = inner
            .recurrings
            .get_mut(&id)
            .filter(|r| r.tenant_id == tenant_id)
        else {
            return Ok(None);
        };
        if let Some(next_date) = patch.next_occurrence_date {
            recurring.next_occurrence_date = next_date;
        }
        if let Some(applied_at) = patch.last_auto_applied_at {
            recurring.last_auto_applied_at = Some(applied_at);
        }
        if let Some(applied_by) = patch.last_applied_by {
            recurring.last_applied_by = Some(applied_by);
        }
        Ok(Some(recurring.clone()))
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn create(
        &self,
        data: NewTransaction,
        _tenant_id: &str,
    ) -> Result<Transaction, StoreError> {
        let transaction = Transaction::from(data);
        self.lock().transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn create_many(&self, data: Vec<NewTransaction>) -> Result<Vec<Transaction>, StoreError> {
        let mut inner = self.lock();
        let created: Vec<Transaction> = data.into_iter().map(Transaction::from).collect();
        inner.transactions.extend(created.iter().cloned());
        Ok(created)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn adjust_balance(
        &self,
        account_id: Uuid,
        delta_minor: i64,
        tenant_id: &str,
    ) -> Result<i64, StoreError> {
        let mut inner = self.lock();
        let account = inner
            .accounts
            .get_mut(&account_id)
            .filter(|a| a.tenant_id == tenant_id)
            .ok_or_else(|| StoreError::NotFound(account_id.to_string()))?;
        account.balance_minor += delta_minor;
        Ok(account.balance_minor)
    }

    async fn find_by_id(
        &self,
        account_id: Uuid,
        tenant_id: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .lock()
            .accounts
            .get(&account_id)
            .filter(|a| a.tenant_id == tenant_id)
            .cloned())
    }
}
