//! Relational-store types: mirrored sales rows and customer records.
//!
//! These structs double as wire DTOs for the store's REST API, which speaks
//! camelCase.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mirrored sales row for one billing record.
///
/// Exactly one row should exist per distinct `financial_id` within an
/// organization once in sync; more than one, or none while a billing record
/// exists, is a sync discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    /// Store-assigned row id.
    pub id: String,
    /// Foreign key back to the originating billing record id
    /// (case-insensitive match).
    pub financial_id: String,
    /// Local customer identity, distinct from the source customer id.
    pub customer_id: String,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub date: NaiveDate,
    pub organization_id: String,
}

/// Insert body for a new sales row (id is store-assigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesRecord {
    pub financial_id: String,
    pub customer_id: String,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub date: NaiveDate,
    pub organization_id: String,
}

/// Sparse update body; only changed fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl SalesRecordPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.product_name.is_none()
            && self.quantity.is_none()
            && self.unit_price.is_none()
            && self.total_price.is_none()
            && self.date.is_none()
    }
}

/// Local customer record in the relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
}
