//! Next-occurrence calculation.

use chrono::{DateTime, Months, Utc};

use crate::{EngineError, ResultEngine};

/// Adds `interval_months` to `date`, clamping to the last day of the target
/// month: Jan 31 + 1 month is Feb 28 (Feb 29 in a leap year), never Mar 2.
pub fn next_occurrence(date: DateTime<Utc>, interval_months: u32) -> ResultEngine<DateTime<Utc>> {
    date.checked_add_months(Months::new(interval_months))
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "next occurrence out of range: {date} + {interval_months} months"
            ))
        })
}
