//! Recurring-transaction definitions.
//!
//! A `Recurring` is a user-owned template describing a transaction that
//! repeats on a month-interval schedule. The engine owns only its scheduling
//! fields (`next_occurrence_date`, `failed_attempts`, `last_auto_applied_at`,
//! `last_applied_by` and the disable side of `auto_apply_enabled`); everything
//! else belongs to the user-facing CRUD layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// The three materialization shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringKind {
    /// One transaction at the source account.
    Standard,
    /// Two reciprocal-linked transactions between source and destination.
    Transfer,
    /// Pays off the negative balance of the liability account referenced by
    /// `category_id`.
    CreditCardPayment,
}

impl RecurringKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Transfer => "transfer",
            Self::CreditCardPayment => "credit_card_payment",
        }
    }
}

impl TryFrom<&str> for RecurringKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "standard" => Ok(Self::Standard),
            "transfer" => Ok(Self::Transfer),
            "credit_card_payment" => Ok(Self::CreditCardPayment),
            other => Err(EngineError::Validation(format!(
                "invalid recurring kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recurring {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub kind: RecurringKind,
    pub source_account_id: Option<Uuid>,
    /// Required iff `kind == Transfer`; must differ from the source.
    pub transfer_account_id: Option<Uuid>,
    /// For credit-card payments this references the liability account.
    pub category_id: Option<Uuid>,
    /// Amount in integer minor units. Optional when `is_amount_flexible`.
    pub amount_minor: Option<i64>,
    pub interval_months: u32,
    pub next_occurrence_date: DateTime<Utc>,
    pub is_active: bool,
    pub auto_apply_enabled: bool,
    pub is_amount_flexible: bool,
    pub failed_attempts: u32,
    pub max_failed_attempts: u32,
    pub last_auto_applied_at: Option<DateTime<Utc>>,
    pub last_applied_by: Option<String>,
}

impl Recurring {
    pub fn new(
        tenant_id: impl Into<String>,
        name: impl Into<String>,
        kind: RecurringKind,
        interval_months: u32,
        next_occurrence_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            kind,
            source_account_id: None,
            transfer_account_id: None,
            category_id: None,
            amount_minor: None,
            interval_months,
            next_occurrence_date,
            is_active: true,
            auto_apply_enabled: true,
            is_amount_flexible: false,
            failed_attempts: 0,
            max_failed_attempts: 3,
            last_auto_applied_at: None,
            last_applied_by: None,
        }
    }

    #[must_use]
    pub fn amount(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn source_account(mut self, account_id: Uuid) -> Self {
        self.source_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn transfer_account(mut self, account_id: Uuid) -> Self {
        self.transfer_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    #[must_use]
    pub fn auto_apply(mut self, enabled: bool) -> Self {
        self.auto_apply_enabled = enabled;
        self
    }

    #[must_use]
    pub fn amount_flexible(mut self, flexible: bool) -> Self {
        self.is_amount_flexible = flexible;
        self
    }

    #[must_use]
    pub fn failed_attempts(mut self, attempts: u32) -> Self {
        self.failed_attempts = attempts;
        self
    }

    #[must_use]
    pub fn max_failed_attempts(mut self, max: u32) -> Self {
        self.max_failed_attempts = max;
        self
    }
}
