//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

/// Customer name used when the legacy source omits one
pub const UNKNOWN_CUSTOMER_NAME: &str = "Unknown Customer";
/// Project name used when the legacy source omits one
pub const UNKNOWN_PROJECT_NAME: &str = "Unknown Project";

/// Session-storage key prefix for staged comparisons
pub const STAGING_KEY_PREFIX: &str = "tallysync.staged";

/// Decimal places used when comparing mirrored money/quantity fields
pub const MONEY_SCALE: u32 = 2;

/// Upper bound for failure messages recorded in a sync report
pub const MAX_FAILURE_MESSAGE_LEN: usize = 256;

/// Relational store table names
pub const SALES_TABLE: &str = "customer_sales";
pub const CUSTOMERS_TABLE: &str = "customers";
pub const MEMBERSHIPS_TABLE: &str = "customer_organizations";
