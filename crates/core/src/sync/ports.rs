//! Port interfaces for the reconciliation engine

use async_trait::async_trait;
use tallysync_domain::{
    Customer, DateWindow, NewSalesRecord, RawBillingResponse, Result, SalesRecord,
    SalesRecordPatch,
};

/// Trait for fetching raw billing records from the legacy source
#[async_trait]
pub trait BillingSource: Send + Sync {
    /// Fetch the raw billing payload for a date window.
    ///
    /// A malformed or empty payload is represented by a response with no
    /// records, not by an error; errors mean the source was unreachable.
    async fn fetch_records(&self, window: &DateWindow) -> Result<RawBillingResponse>;
}

/// Trait for reading and writing mirrored sales rows
#[async_trait]
pub trait SalesRecordRepository: Send + Sync {
    /// All rows for the organization whose date falls inside the window
    /// (inclusive bounds, day granularity).
    async fn list_for_window(
        &self,
        organization_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<SalesRecord>>;

    /// Insert a new row, returning the stored row with its assigned id.
    async fn insert(&self, record: &NewSalesRecord) -> Result<SalesRecord>;

    /// Apply a sparse patch to the row with the given store-assigned id.
    async fn update(&self, id: &str, patch: &SalesRecordPatch) -> Result<SalesRecord>;

    /// Delete the row with the given store-assigned id.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Trait for resolving local customers and organization memberships
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Look up a customer by exact business name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>>;

    /// Create a customer with the given business name.
    async fn create(&self, name: &str) -> Result<Customer>;

    /// Ensure a membership link row exists for `(customer, organization)`.
    /// Upsert semantics: creating an existing link is a no-op.
    async fn ensure_membership(&self, customer_id: &str, organization_id: &str) -> Result<()>;
}

/// Session-scoped key/value storage used by the staging store.
///
/// Mirrors the usual scoped-storage contract: entries live for the session
/// and are gone afterwards. Implementations may fail on quota exhaustion;
/// callers treat staging as best-effort.
pub trait SessionStore: Send + Sync {
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn remove_item(&self, key: &str) -> Result<()>;
}
