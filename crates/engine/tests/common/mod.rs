#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use engine::store::{RecurringPatch, RecurringStore, ScheduleAdvance, StoreError};
use engine::{Account, AutoApplySettings, Engine, MemoryStore, Recurring, RecurringKind};

pub const TENANT: &str = "tenant-1";
pub const USER: &str = "alice";

pub fn engine_with_store() -> (Engine, Arc<MemoryStore>) {
    engine_with_settings(AutoApplySettings::default())
}

pub fn engine_with_settings(settings: AutoApplySettings) -> (Engine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let engine = Engine::builder()
        .stores(store.clone())
        .settings(settings)
        .build()
        .unwrap();
    (engine, store)
}

pub fn yesterday() -> DateTime<Utc> {
    Utc::now() - Duration::days(1)
}

pub fn seeded_account(store: &MemoryStore, name: &str, balance_minor: i64) -> Uuid {
    let account = Account::new(TENANT, name, balance_minor);
    let id = account.id;
    store.insert_account(account);
    id
}

pub fn standard_recurring(source: Uuid, amount_minor: i64) -> Recurring {
    Recurring::new(TENANT, "Rent", RecurringKind::Standard, 1, yesterday())
        .source_account(source)
        .amount(amount_minor)
}

/// Wraps the memory store and counts selected recurring-store calls.
pub struct CountingRecurringStore {
    inner: Arc<MemoryStore>,
    pub find_due_calls: AtomicUsize,
    pub increment_calls: AtomicUsize,
    pub disable_calls: AtomicUsize,
}

impl CountingRecurringStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            find_due_calls: AtomicUsize::new(0),
            increment_calls: AtomicUsize::new(0),
            disable_calls: AtomicUsize::new(0),
        }
    }

    pub fn find_due_calls(&self) -> usize {
        self.find_due_calls.load(Ordering::SeqCst)
    }

    pub fn increment_calls(&self) -> usize {
        self.increment_calls.load(Ordering::SeqCst)
    }

    pub fn disable_calls(&self) -> usize {
        self.disable_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecurringStore for CountingRecurringStore {
    async fn find_due(
        &self,
        tenant_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Recurring>, StoreError> {
        self.find_due_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_due(tenant_id, as_of).await
    }

    async fn find_by_id(&self, id: Uuid, tenant_id: &str) -> Result<Option<Recurring>, StoreError> {
        self.inner.find_by_id(id, tenant_id).await
    }

    async fn advance_schedule(&self, updates: &[ScheduleAdvance]) -> Result<(), StoreError> {
        self.inner.advance_schedule(updates).await
    }

    async fn increment_failed_attempts(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.increment_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.increment_failed_attempts(ids).await
    }

    async fn reset_failed_attempts(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        self.inner.reset_failed_attempts(ids).await
    }

    async fn set_auto_apply_enabled(
        &self,
        id: Uuid,
        enabled: bool,
        tenant_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_auto_apply_enabled(id, enabled, tenant_id).await
    }

    async fn update(
        &self,
        id: Uuid,
        patch: RecurringPatch,
        tenant_id: &str,
    ) -> Result<Option<Recurring>, StoreError> {
        self.inner.update(id, patch, tenant_id).await
    }
}
