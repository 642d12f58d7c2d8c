//! Comparator: the core diff algorithm.
//!
//! Given the canonical billing set and the mirrored sales set for one date
//! window, computes the three-way diff (create/update/delete) plus the
//! unchanged pairs. Deterministic and pure: output order follows input
//! order, and no external store is consulted - customer ids are resolved
//! up front by the synchronizer and passed in as a [`CustomerIndex`].

use std::collections::HashMap;

use tallysync_domain::constants::MONEY_SCALE;
use tallysync_domain::{
    CanonicalBillingRecord, FieldChange, MatchedPair, RecordUpdate, SalesField, SalesRecord,
    SyncComparison,
};
use tracing::warn;

/// Lookup-only map from exact customer business name to local customer id.
///
/// Built by the synchronizer before comparison so that dry runs never write:
/// customer creation is deferred to the apply phase. A name absent from the
/// index means no local customer exists yet.
#[derive(Debug, Clone, Default)]
pub struct CustomerIndex {
    ids_by_name: HashMap<String, String>,
}

impl CustomerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved `(name, customer id)` pair.
    pub fn insert(&mut self, name: impl Into<String>, customer_id: impl Into<String>) {
        self.ids_by_name.insert(name.into(), customer_id.into());
    }

    /// Local customer id for an exact business name, if one exists.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.ids_by_name.get(name).map(String::as_str)
    }
}

/// Compute the three-way diff between billing and sales records fetched for
/// the same window.
///
/// Sales rows are indexed by lowercased financial id because source
/// identifiers vary in case between systems. Billing records without a
/// natural key are excluded from every bucket and counted, not failed on.
pub fn compare(
    billing_records: &[CanonicalBillingRecord],
    sales_records: &[SalesRecord],
    customers: &CustomerIndex,
) -> SyncComparison {
    let mut by_financial_id: HashMap<String, &SalesRecord> = HashMap::new();
    for sales in sales_records {
        by_financial_id.insert(sales.financial_id.to_lowercase(), sales);
    }

    let mut comparison = SyncComparison::default();

    for billing in billing_records {
        if billing.id.trim().is_empty() {
            warn!(
                customer = %billing.customer_name,
                date = %billing.date,
                "billing record has no natural key; excluded from comparison"
            );
            comparison.missing_id_count += 1;
            continue;
        }

        match by_financial_id.remove(&billing.id.to_lowercase()) {
            None => comparison.to_create.push(billing.clone()),
            Some(sales) => {
                let changes = field_changes(billing, sales, customers);
                if changes.is_empty() {
                    comparison
                        .unchanged
                        .push(MatchedPair { billing: billing.clone(), sales: sales.clone() });
                } else {
                    comparison.to_update.push(RecordUpdate {
                        billing: billing.clone(),
                        sales: sales.clone(),
                        changes,
                    });
                }
            }
        }
    }

    // Whatever was never matched is orphaned. Preserve the input order of
    // the sales slice rather than the map's iteration order.
    for sales in sales_records {
        if by_financial_id.contains_key(&sales.financial_id.to_lowercase()) {
            comparison.to_delete.push(sales.clone());
        }
    }

    comparison
}

/// Field-level change set for one matched pair.
fn field_changes(
    billing: &CanonicalBillingRecord,
    sales: &SalesRecord,
    customers: &CustomerIndex,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if cents(sales.quantity) != cents(billing.hours) {
        changes.push(numeric_change(SalesField::Quantity, sales.quantity, billing.hours));
    }
    if cents(sales.unit_price) != cents(billing.rate) {
        changes.push(numeric_change(SalesField::UnitPrice, sales.unit_price, billing.rate));
    }
    if cents(sales.total_price) != cents(billing.amount) {
        changes.push(numeric_change(SalesField::TotalPrice, sales.total_price, billing.amount));
    }
    if sales.date != billing.date {
        changes.push(FieldChange {
            field: SalesField::Date,
            previous: sales.date.to_string(),
            current: billing.date.to_string(),
        });
    }

    let product_name = derive_product_name(&billing.customer_name, &billing.project_name);
    if sales.product_name != product_name {
        changes.push(FieldChange {
            field: SalesField::ProductName,
            previous: sales.product_name.clone(),
            current: product_name,
        });
    }

    // Exact-equality comparison against the lookup-only index. An
    // unresolvable name (no local customer yet) is still a drift; the apply
    // phase creates the customer and fills in the id.
    match customers.resolve(&billing.customer_name) {
        Some(expected) if expected == sales.customer_id => {}
        resolved => changes.push(FieldChange {
            field: SalesField::CustomerId,
            previous: sales.customer_id.clone(),
            current: resolved.unwrap_or_default().to_string(),
        }),
    }

    changes
}

/// Round a mirrored money/quantity value to an integer at [`MONEY_SCALE`]
/// decimals, half away from zero. Comparing integers avoids float equality.
fn cents(value: f64) -> i64 {
    (value * 10f64.powi(MONEY_SCALE as i32)).round() as i64
}

fn numeric_change(field: SalesField, previous: f64, current: f64) -> FieldChange {
    // `current` deliberately carries the unrounded billing-side value.
    FieldChange { field, previous: previous.to_string(), current: current.to_string() }
}

/// Derive the internal product short-code from customer and project names.
///
/// The customer name is stripped down to only its uppercase letters and
/// digits, joined by a colon with the first whitespace-delimited word of the
/// project name: `("Acme Corp 2", "Website Redesign")` -> `"AC2:Website"`.
/// The rule is terse by convention and must stay byte-stable across syncs.
pub fn derive_product_name(customer_name: &str, project_name: &str) -> String {
    let code: String = customer_name
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect();
    let first_word = project_name.split_whitespace().next().unwrap_or_default();
    format!("{code}:{first_word}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn billing(id: &str, hours: f64, rate: f64) -> CanonicalBillingRecord {
        CanonicalBillingRecord {
            id: id.to_string(),
            customer_id: "SRC-1".to_string(),
            customer_name: "Acme Corp 2".to_string(),
            project_id: "M-1".to_string(),
            project_name: "Website Redesign".to_string(),
            hours,
            rate,
            amount: hours * rate,
            date: day(1),
            billed: true,
        }
    }

    fn sales_for(record: &CanonicalBillingRecord, customer_id: &str) -> SalesRecord {
        SalesRecord {
            id: format!("row-{}", record.id),
            financial_id: record.id.clone(),
            customer_id: customer_id.to_string(),
            product_name: derive_product_name(&record.customer_name, &record.project_name),
            quantity: record.hours,
            unit_price: record.rate,
            total_price: record.amount,
            date: record.date,
            organization_id: "org-1".to_string(),
        }
    }

    fn index_with_acme() -> CustomerIndex {
        let mut index = CustomerIndex::new();
        index.insert("Acme Corp 2", "cust-1");
        index
    }

    #[test]
    fn partitions_billing_ids_without_overlap() {
        let b1 = billing("A1", 1.0, 100.0);
        let b2 = billing("A2", 2.0, 100.0);
        let b3 = billing("A3", 3.0, 100.0);
        let mut drifted = sales_for(&b2, "cust-1");
        drifted.quantity = 5.0;
        let orphan = SalesRecord {
            id: "row-orphan".to_string(),
            financial_id: "Z9".to_string(),
            ..sales_for(&b1, "cust-1")
        };

        let comparison = compare(
            &[b1.clone(), b2, b3.clone()],
            &[sales_for(&b1, "cust-1"), drifted, orphan],
            &index_with_acme(),
        );

        let mut seen: HashSet<String> = HashSet::new();
        for record in &comparison.to_create {
            assert!(seen.insert(record.id.clone()));
        }
        for update in &comparison.to_update {
            assert!(seen.insert(update.billing.id.clone()));
        }
        for pair in &comparison.unchanged {
            assert!(seen.insert(pair.billing.id.clone()));
        }
        let expected: HashSet<String> =
            ["A1", "A2", "A3"].iter().map(ToString::to_string).collect();
        assert_eq!(seen, expected);

        assert_eq!(comparison.to_create.len(), 1);
        assert_eq!(comparison.to_create[0].id, "A3");
        assert_eq!(comparison.to_delete.len(), 1);
        assert_eq!(comparison.to_delete[0].financial_id, "Z9");
    }

    #[test]
    fn matches_financial_ids_case_insensitively() {
        let record = billing("AbC-123", 1.0, 50.0);
        let mut sales = sales_for(&record, "cust-1");
        sales.financial_id = "abc-123".to_string();

        let comparison = compare(&[record], &[sales], &index_with_acme());

        assert!(comparison.to_create.is_empty());
        assert!(comparison.to_delete.is_empty());
        assert_eq!(comparison.unchanged.len(), 1);
    }

    #[test]
    fn rounds_to_two_decimals_before_comparing() {
        let mut within = billing("R1", 3.004, 100.0);
        within.amount = 300.0;
        let mut sales = sales_for(&within, "cust-1");
        sales.quantity = 3.00;

        let comparison = compare(&[within], &[sales.clone()], &index_with_acme());
        assert_eq!(comparison.unchanged.len(), 1);

        let mut beyond = billing("R1", 3.006, 100.0);
        beyond.amount = 300.0;
        let comparison = compare(&[beyond], &[sales], &index_with_acme());
        assert_eq!(comparison.to_update.len(), 1);
        let changes = &comparison.to_update[0].changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, SalesField::Quantity);
        // The change carries the unrounded billing-side value.
        assert_eq!(changes[0].current, "3.006");
    }

    #[test]
    fn date_compared_at_day_granularity() {
        let record = billing("D1", 1.0, 10.0);
        let mut sales = sales_for(&record, "cust-1");
        sales.date = day(2);

        let comparison = compare(&[record], &[sales], &index_with_acme());
        let changes = &comparison.to_update[0].changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, SalesField::Date);
        assert_eq!(changes[0].current, "2024-03-01");
    }

    #[test]
    fn recomputed_product_name_drift_is_detected() {
        let record = billing("P1", 1.0, 10.0);
        let mut sales = sales_for(&record, "cust-1");
        sales.product_name = "stale".to_string();

        let comparison = compare(&[record], &[sales], &index_with_acme());
        let changes = &comparison.to_update[0].changes;
        assert_eq!(changes[0].field, SalesField::ProductName);
        assert_eq!(changes[0].current, "AC2:Website");
    }

    #[test]
    fn customer_id_drift_against_resolved_index() {
        let record = billing("C1", 1.0, 10.0);
        let sales = sales_for(&record, "cust-OLD");

        let comparison = compare(&[record], &[sales], &index_with_acme());
        let changes = &comparison.to_update[0].changes;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, SalesField::CustomerId);
        assert_eq!(changes[0].previous, "cust-OLD");
        assert_eq!(changes[0].current, "cust-1");
    }

    #[test]
    fn unresolvable_customer_counts_as_drift() {
        let record = billing("C2", 1.0, 10.0);
        let sales = sales_for(&record, "cust-1");

        let comparison = compare(&[record], &[sales], &CustomerIndex::new());
        let changes = &comparison.to_update[0].changes;
        assert_eq!(changes[0].field, SalesField::CustomerId);
        assert!(changes[0].current.is_empty());
    }

    #[test]
    fn missing_id_is_excluded_and_counted() {
        let mut keyless = billing("", 1.0, 10.0);
        keyless.id = "  ".to_string();
        let keyed = billing("K1", 1.0, 10.0);

        let comparison = compare(&[keyless, keyed], &[], &index_with_acme());

        assert_eq!(comparison.missing_id_count, 1);
        assert_eq!(comparison.to_create.len(), 1);
        assert_eq!(comparison.to_create[0].id, "K1");
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let records = vec![billing("A", 1.0, 10.0), billing("B", 2.0, 20.0)];
        let sales = vec![sales_for(&records[1], "cust-1")];

        let first = compare(&records, &sales, &index_with_acme());
        let second = compare(&records, &sales, &index_with_acme());
        assert_eq!(first, second);
    }

    #[test]
    fn derives_product_short_codes() {
        assert_eq!(derive_product_name("Acme Corp 2", "Website Redesign"), "AC2:Website");
        assert_eq!(derive_product_name("Bright-Co Ltd. 9", "Mobile App Revamp"), "BCL9:Mobile");
        assert_eq!(derive_product_name("lowercase only", "Solo"), ":Solo");
        assert_eq!(derive_product_name("ACME", ""), "ACME:");
    }
}
