//! # TallySync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The record normalizer, comparator, and staging store
//! - The synchronizer service
//!
//! ## Architecture Principles
//! - Only depends on `tallysync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod sync;

// Re-export specific items to avoid ambiguity
pub use sync::comparator::{compare, derive_product_name, CustomerIndex};
pub use sync::normalizer::normalize_response;
pub use sync::ports::{BillingSource, CustomerDirectory, SalesRecordRepository, SessionStore};
pub use sync::staging::SyncStagingStore;
pub use sync::SyncService;
