//! Record normalizer: raw legacy payload -> canonical billing records.
//!
//! This is the single point that maps the legacy system's duck-typed record
//! shape into the strict [`CanonicalBillingRecord`]; nothing downstream
//! accepts the raw shape. Pure transform, no side effects.

use chrono::NaiveDate;
use serde_json::Value;
use tallysync_domain::constants::{UNKNOWN_CUSTOMER_NAME, UNKNOWN_PROJECT_NAME};
use tallysync_domain::{CanonicalBillingRecord, RawBillingRecord, RawBillingResponse};
use tracing::warn;

/// Convert one raw paginated response into canonical billing records.
///
/// A malformed top-level response (missing records array) yields an empty
/// result rather than an error - callers treat empty as "nothing to sync".
/// Records whose start date cannot be parsed are dropped with a warning.
pub fn normalize_response(response: &RawBillingResponse) -> Vec<CanonicalBillingRecord> {
    let Some(records) = &response.records else {
        warn!("billing response carried no records array; treating as empty");
        return Vec::new();
    };

    records.iter().filter_map(normalize_record).collect()
}

fn normalize_record(raw: &RawBillingRecord) -> Option<CanonicalBillingRecord> {
    let id = text_field(&raw.record_id);

    let Some(date) = parse_day(&raw.start_date) else {
        warn!(record_id = %id, "dropping billing record with unparseable start date");
        return None;
    };

    let hours = number_field(&raw.billable_hours);
    // Record-level rate wins; the customer-level default covers records the
    // legacy system left unrated.
    let rate = value_as_f64(raw.hourly_rate.as_ref())
        .or_else(|| value_as_f64(raw.client_default_rate.as_ref()))
        .unwrap_or(0.0);

    Some(CanonicalBillingRecord {
        id,
        customer_id: text_field(&raw.client_id),
        customer_name: name_field(&raw.client_name, UNKNOWN_CUSTOMER_NAME),
        project_id: text_field(&raw.matter_id),
        project_name: name_field(&raw.matter_name, UNKNOWN_PROJECT_NAME),
        hours,
        rate,
        amount: hours * rate,
        date,
        billed: flag_is_set(&raw.billed),
    })
}

/// Extract a trimmed string; empty when absent or non-scalar.
fn text_field(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Extract a display name, falling back when absent or blank.
fn name_field(value: &Option<Value>, fallback: &str) -> String {
    let text = text_field(value);
    if text.is_empty() { fallback.to_string() } else { text }
}

/// Extract a number; the legacy system sends both numbers and numeric
/// strings. Missing or unparseable values default to 0.
fn number_field(value: &Option<Value>) -> f64 {
    value_as_f64(value.as_ref()).unwrap_or(0.0)
}

fn value_as_f64(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Billed status: set iff the flag equals `"1"`, `1`, or `true`.
fn flag_is_set(value: &Option<Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.trim() == "1",
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Parse the calendar-date portion of a legacy timestamp.
///
/// Accepts `YYYY-MM-DD` with an optional trailing time component separated
/// by `T` or whitespace.
fn parse_day(value: &Option<Value>) -> Option<NaiveDate> {
    let text = text_field(value);
    let day_part = text.split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}
