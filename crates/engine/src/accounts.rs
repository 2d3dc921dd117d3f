//! Account snapshot used by materializers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-model of a ledger account. Balance mutation goes through
/// [`AccountStore::adjust_balance`], never through this struct.
///
/// [`AccountStore::adjust_balance`]: crate::AccountStore::adjust_balance
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    /// Signed balance in integer minor units; negative means debt.
    pub balance_minor: i64,
}

impl Account {
    pub fn new(tenant_id: impl Into<String>, name: impl Into<String>, balance_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            balance_minor,
        }
    }
}
