//! The module contains the errors the engine can produce.
//!
//! Every failure of [`apply_recurring_transaction`] is reported through an
//! [`ApplyResult`] rather than propagated; these variants are what ends up in
//! its `error` field and what failure classification matches on.
//!
//! [`apply_recurring_transaction`]: crate::Engine::apply_recurring_transaction
//! [`ApplyResult`]: crate::ApplyResult

use thiserror::Error;

use crate::store::StoreError;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The definition violates a required-field or consistency rule.
    /// Nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Credit-card payment path: the liability carries no debt to pay.
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" not found")]
    KeyNotFound(String),
    /// An item did not settle within the per-item deadline. Writes it already
    /// issued still stand.
    #[error("timed out after {0}ms")]
    Timeout(u64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a == b,
            _ => false,
        }
    }
}
