use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;

use crate::settings::AutoApplySettingsUpdate;
use crate::store::{AccountStore, RecurringStore, TransactionStore};
use crate::{AutoApplySettings, EngineError, ResultEngine};

mod apply;
mod batch;
mod check;

/// Coordinates due-definition lookup, materialization, balance mutation and
/// schedule bookkeeping over the store contracts.
///
/// Cloning is cheap; clones share the stores and the settings object.
#[derive(Clone)]
pub struct Engine {
    recurrings: Arc<dyn RecurringStore>,
    transactions: Arc<dyn TransactionStore>,
    accounts: Arc<dyn AccountStore>,
    settings: Arc<RwLock<AutoApplySettings>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Snapshot of the current settings.
    pub fn auto_apply_settings(&self) -> AutoApplySettings {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Applies a partial update and returns the resulting settings. A run
    /// already in progress keeps the settings it started with.
    pub fn update_auto_apply_settings(&self, update: AutoApplySettingsUpdate) -> AutoApplySettings {
        let mut guard = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        guard.apply(update);
        guard.clone()
    }

    /// External toggle for one definition's auto-apply flag.
    pub async fn set_auto_apply_enabled(
        &self,
        id: Uuid,
        enabled: bool,
        tenant_id: Option<&str>,
    ) -> ResultEngine<()> {
        self.recurrings
            .set_auto_apply_enabled(id, enabled, tenant_id)
            .await?;
        Ok(())
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    recurrings: Option<Arc<dyn RecurringStore>>,
    transactions: Option<Arc<dyn TransactionStore>>,
    accounts: Option<Arc<dyn AccountStore>>,
    settings: AutoApplySettings,
}

impl EngineBuilder {
    #[must_use]
    pub fn recurring_store(mut self, store: Arc<dyn RecurringStore>) -> Self {
        self.recurrings = Some(store);
        self
    }

    #[must_use]
    pub fn transaction_store(mut self, store: Arc<dyn TransactionStore>) -> Self {
        self.transactions = Some(store);
        self
    }

    #[must_use]
    pub fn account_store(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.accounts = Some(store);
        self
    }

    /// Wires one backend implementing all three contracts.
    #[must_use]
    pub fn stores<S>(self, store: Arc<S>) -> Self
    where
        S: RecurringStore + TransactionStore + AccountStore + 'static,
    {
        self.recurring_store(store.clone())
            .transaction_store(store.clone())
            .account_store(store)
    }

    #[must_use]
    pub fn settings(mut self, settings: AutoApplySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let recurrings = self
            .recurrings
            .ok_or_else(|| EngineError::Validation("recurring store is required".to_string()))?;
        let transactions = self
            .transactions
            .ok_or_else(|| EngineError::Validation("transaction store is required".to_string()))?;
        let accounts = self
            .accounts
            .ok_or_else(|| EngineError::Validation("account store is required".to_string()))?;
        Ok(Engine {
            recurrings,
            transactions,
            accounts,
            settings: Arc::new(RwLock::new(self.settings)),
        })
    }
}
