//! Billing-side types: the loosely-typed legacy payload and its canonical
//! in-memory shape.
//!
//! The legacy practice-management backend returns field-keyed records with
//! dozens of inconsistent optional fields; numbers may arrive as strings and
//! flags as `"1"`/`"0"`. Nothing downstream of the normalizer accepts the
//! raw shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw paginated response from the legacy billing source.
///
/// A missing `Records` array is the legacy system's way of signalling
/// "nothing to report"; the normalizer treats it as an empty result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBillingResponse {
    #[serde(default, rename = "Records")]
    pub records: Option<Vec<RawBillingRecord>>,
    #[serde(default, rename = "TotalCount")]
    pub total_count: Option<Value>,
}

/// One raw billing record as emitted by the legacy backend.
///
/// Every field is an untyped [`Value`] because the source does not commit to
/// types: hours and rates show up both as numbers and as numeric strings,
/// and the billed flag as `"1"`, `1`, or a boolean.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBillingRecord {
    #[serde(default, rename = "RecordID")]
    pub record_id: Option<Value>,
    #[serde(default, rename = "ClientID")]
    pub client_id: Option<Value>,
    #[serde(default, rename = "ClientName")]
    pub client_name: Option<Value>,
    #[serde(default, rename = "MatterID")]
    pub matter_id: Option<Value>,
    #[serde(default, rename = "MatterName")]
    pub matter_name: Option<Value>,
    #[serde(default, rename = "BillableHours")]
    pub billable_hours: Option<Value>,
    #[serde(default, rename = "HourlyRate")]
    pub hourly_rate: Option<Value>,
    #[serde(default, rename = "ClientDefaultRate")]
    pub client_default_rate: Option<Value>,
    #[serde(default, rename = "StartDate")]
    pub start_date: Option<Value>,
    #[serde(default, rename = "Billed")]
    pub billed: Option<Value>,
    /// Whatever else the legacy system happens to send along.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One unit of billable work in canonical form.
///
/// Created fresh on every fetch, never mutated in place. `amount` is always
/// `hours * rate` at normalization time; once staged for sync it is treated
/// as authoritative over recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBillingRecord {
    /// Stable identifier from the source system; natural key for matching.
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub project_id: String,
    pub project_name: String,
    pub hours: f64,
    pub rate: f64,
    pub amount: f64,
    pub date: NaiveDate,
    pub billed: bool,
}
