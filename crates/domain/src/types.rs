//! Common data types used throughout the application

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TallySyncError};

pub mod billing;
pub mod sales;
pub mod sync;

pub use billing::{CanonicalBillingRecord, RawBillingRecord, RawBillingResponse};
pub use sales::{Customer, NewSalesRecord, SalesRecord, SalesRecordPatch};
pub use sync::{
    AppliedChange, FieldChange, MatchedPair, RecordUpdate, SalesField, StagedComparison,
    SyncAction, SyncComparison, SyncFailure, SyncOptions, SyncReport, SyncStatus,
};

/// Inclusive calendar-date range used for both the billing fetch and the
/// sales fetch of a single reconciliation run.
///
/// A single value flows through the whole run so the two sides can never be
/// queried with diverging ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, validating that `start <= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TallySyncError::InvalidInput(format!(
                "date window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// True when `date` falls inside the window (inclusive bounds).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_inverted_window() {
        let result = DateWindow::new(day(2024, 3, 2), day(2024, 3, 1));
        assert!(matches!(result, Err(TallySyncError::InvalidInput(_))));
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = DateWindow::new(day(2024, 3, 1), day(2024, 3, 31)).unwrap();
        assert!(window.contains(day(2024, 3, 1)));
        assert!(window.contains(day(2024, 3, 31)));
        assert!(!window.contains(day(2024, 4, 1)));
    }
}
