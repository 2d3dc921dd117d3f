//! Auto-apply engine for recurring transactions.
//!
//! Finds recurring-transaction definitions whose next occurrence is due,
//! materializes them into concrete ledger transactions (standard,
//! inter-account transfer, credit-card statement payment), advances each
//! definition's schedule and classifies failures so permanently broken
//! definitions disable themselves instead of retrying forever.
//!
//! Persistence is a collaborator: the engine only talks to the narrow
//! contracts in [`store`], never to a concrete backend.

pub use accounts::Account;
pub use error::EngineError;
pub use memory::MemoryStore;
pub use ops::{Engine, EngineBuilder};
pub use recurring::{Recurring, RecurringKind};
pub use results::{ApplyResult, AutoApplyResult, BatchApplyResult, FailureDisposition};
pub use schedule::next_occurrence;
pub use settings::{AutoApplySettings, AutoApplySettingsUpdate};
pub use store::{
    AccountStore, RecurringPatch, RecurringStore, ScheduleAdvance, StoreError, TransactionStore,
};
pub use transactions::{NewTransaction, Transaction, TransactionKind};

mod accounts;
mod error;
mod memory;
mod ops;
mod recurring;
mod results;
mod schedule;
mod settings;
pub mod store;
mod transactions;

type ResultEngine<T> = Result<T, EngineError>;
