//! Access policy: the 30-day window rule.
//!
//! Access is active for 30 calendar days starting on, and including, the
//! payment day. Only calendar dates take part in the decision; time of day is
//! dropped before comparing.

use crate::record::AccessRecord;
use chrono::{Days, NaiveDate};

/// Length of the access window in calendar days.
pub const ACCESS_WINDOW_DAYS: u64 = 30;

/// Result of evaluating an identity's access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// No record, or the record has no usable payment date.
    None,
    /// Inside the window.
    Active {
        last_paid_date: NaiveDate,
        expires_on: NaiveDate,
    },
    /// Outside the window.
    Expired { last_paid_date: NaiveDate },
}

impl AccessStatus {
    /// Short lowercase label, as used in status documents.
    pub fn label(&self) -> &'static str {
        match self {
            AccessStatus::None => "none",
            AccessStatus::Active { .. } => "active",
            AccessStatus::Expired { .. } => "expired",
        }
    }
}

/// The day access lapses for a payment made on `paid_on`.
pub fn expires_on(paid_on: NaiveDate) -> NaiveDate {
    paid_on
        .checked_add_days(Days::new(ACCESS_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

/// Whole calendar days between the payment date and `today`.
///
/// The distance is absolute: a payment date in the future counts the same as
/// one equally far in the past.
pub fn elapsed_days(paid_on: NaiveDate, today: NaiveDate) -> u64 {
    (today - paid_on).num_days().unsigned_abs()
}

/// Classify access for an optional record as of `today`.
pub fn evaluate(record: Option<&AccessRecord>, today: NaiveDate) -> AccessStatus {
    let Some(last_paid_date) = record.and_then(AccessRecord::last_paid) else {
        return AccessStatus::None;
    };

    if elapsed_days(last_paid_date, today) < ACCESS_WINDOW_DAYS {
        AccessStatus::Active {
            last_paid_date,
            expires_on: expires_on(last_paid_date),
        }
    } else {
        AccessStatus::Expired { last_paid_date }
    }
}
