//! Comparison and reporting types for one reconciliation cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::billing::CanonicalBillingRecord;
use super::sales::SalesRecord;

/// Mirrored sales-row field compared by the diff algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesField {
    Quantity,
    UnitPrice,
    TotalPrice,
    Date,
    ProductName,
    CustomerId,
}

impl std::fmt::Display for SalesField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Quantity => "quantity",
            Self::UnitPrice => "unit_price",
            Self::TotalPrice => "total_price",
            Self::Date => "date",
            Self::ProductName => "product_name",
            Self::CustomerId => "customer_id",
        };
        f.write_str(name)
    }
}

/// One detected field drift.
///
/// `current` carries the unrounded billing-side value (display-formatted);
/// `previous` the stored sales-side value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: SalesField,
    pub previous: String,
    pub current: String,
}

/// A matched pair whose mirrored fields drifted beyond tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    pub billing: CanonicalBillingRecord,
    pub sales: SalesRecord,
    pub changes: Vec<FieldChange>,
}

/// A matched pair with no drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub billing: CanonicalBillingRecord,
    pub sales: SalesRecord,
}

/// Result of one comparison pass.
///
/// Invariant: `to_create`, `to_update`, and `unchanged` partition the ids of
/// the fetched billing set (records with a usable id); `to_delete` holds the
/// sales rows whose financial id matched nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncComparison {
    pub to_create: Vec<CanonicalBillingRecord>,
    pub to_update: Vec<RecordUpdate>,
    pub to_delete: Vec<SalesRecord>,
    pub unchanged: Vec<MatchedPair>,
    /// Billing records excluded because they carried no natural key.
    pub missing_id_count: usize,
}

impl SyncComparison {
    /// True when any mutation bucket is non-empty.
    pub fn has_pending(&self) -> bool {
        !self.to_create.is_empty() || !self.to_update.is_empty() || !self.to_delete.is_empty()
    }
}

/// A comparison persisted for a later apply step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedComparison {
    pub comparison: SyncComparison,
    pub reviewed_at: DateTime<Utc>,
}

/// Modes for one synchronizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Report only; no writes reach the store.
    pub dry_run: bool,
    /// Whether orphaned sales rows are actually deleted or only reported.
    pub delete_orphaned: bool,
    /// Skip re-fetch/re-compare and apply exactly the staged comparison.
    pub use_pending_only: bool,
}

/// Kind of write applied (or skipped) for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One successfully applied item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub action: SyncAction,
    /// Billing-record id for creates/updates, sales-row id for deletes.
    pub record_id: String,
    pub sales_record_id: Option<String>,
}

/// One item that failed during the apply phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub action: SyncAction,
    pub record_id: String,
    pub message: String,
}

/// Outcome of one synchronizer invocation.
///
/// In dry-run mode the counts are the would-be bucket sizes; otherwise they
/// count successful applies. A partial sync is visible here rather than
/// all-or-nothing: failures sit alongside whatever did succeed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
    pub applied: Vec<AppliedChange>,
    pub failures: Vec<SyncFailure>,
    pub duration_ms: u64,
    pub dry_run: bool,
}

/// Convenience reshaping of a dry-run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub in_sync: bool,
    pub to_create: usize,
    pub to_update: usize,
    pub to_delete: usize,
    pub unchanged: usize,
}
