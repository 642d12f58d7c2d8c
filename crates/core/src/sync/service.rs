//! Synchronizer: drives one full reconciliation cycle.
//!
//! fetch -> normalize -> compare -> stage -> (optionally) apply. Fetch- and
//! compare-phase errors abort the run; apply-phase errors are isolated per
//! item and accumulated, so a partial sync is visible and actionable rather
//! than all-or-nothing.

use std::sync::Arc;
use std::time::Instant;

use tallysync_domain::constants::MAX_FAILURE_MESSAGE_LEN;
use tallysync_domain::{
    AppliedChange, CanonicalBillingRecord, Customer, DateWindow, NewSalesRecord, RecordUpdate,
    Result, SalesField, SalesRecord, SalesRecordPatch, SyncAction, SyncComparison, SyncFailure,
    SyncOptions, SyncReport, SyncStatus,
};
use tracing::{debug, info, instrument, warn};

use super::comparator::{compare, derive_product_name, CustomerIndex};
use super::normalizer::normalize_response;
use super::ports::{BillingSource, CustomerDirectory, SalesRecordRepository};
use super::staging::SyncStagingStore;

/// Reconciliation service over injected collaborator ports.
pub struct SyncService {
    billing: Arc<dyn BillingSource>,
    sales: Arc<dyn SalesRecordRepository>,
    customers: Arc<dyn CustomerDirectory>,
    staging: SyncStagingStore,
}

impl SyncService {
    /// Create a new synchronizer.
    pub fn new(
        billing: Arc<dyn BillingSource>,
        sales: Arc<dyn SalesRecordRepository>,
        customers: Arc<dyn CustomerDirectory>,
        staging: SyncStagingStore,
    ) -> Self {
        Self { billing, sales, customers, staging }
    }

    /// Run one reconciliation cycle for `(organization, window)`.
    ///
    /// Callers must not run two cycles for the same key concurrently: the
    /// staging store is last-write-wins and the comparator assumes a stable
    /// snapshot of both sides.
    #[instrument(skip(self), fields(organization_id, window = %window))]
    pub async fn synchronize(
        &self,
        organization_id: &str,
        window: &DateWindow,
        options: SyncOptions,
    ) -> Result<SyncReport> {
        let started = Instant::now();

        let comparison = if options.use_pending_only {
            match self.staging.get(organization_id, window) {
                Some(staged) => {
                    debug!(reviewed_at = %staged.reviewed_at, "applying staged comparison");
                    staged.comparison
                }
                None => {
                    info!("no staged comparison; nothing to apply");
                    return Ok(SyncReport {
                        dry_run: options.dry_run,
                        duration_ms: elapsed_ms(started),
                        ..SyncReport::default()
                    });
                }
            }
        } else {
            let comparison = self.derive_comparison(organization_id, window).await?;
            // Best-effort: a later apply-only invocation can reuse this.
            self.staging.store(organization_id, window, &comparison);
            comparison
        };

        info!(
            to_create = comparison.to_create.len(),
            to_update = comparison.to_update.len(),
            to_delete = comparison.to_delete.len(),
            unchanged = comparison.unchanged.len(),
            missing_id = comparison.missing_id_count,
            dry_run = options.dry_run,
            "comparison complete"
        );

        if options.dry_run {
            return Ok(SyncReport {
                created: comparison.to_create.len(),
                updated: comparison.to_update.len(),
                deleted: comparison.to_delete.len(),
                unchanged: comparison.unchanged.len(),
                duration_ms: elapsed_ms(started),
                dry_run: true,
                ..SyncReport::default()
            });
        }

        let mut report = self.apply(organization_id, &comparison, options).await;
        report.unchanged = comparison.unchanged.len();
        report.duration_ms = elapsed_ms(started);

        // The staged diff has been consumed; a stale copy must not be
        // replayed by a later apply-only call.
        self.staging.clear(organization_id, window);

        Ok(report)
    }

    /// Dry-run convenience wrapper reshaping the report into a status.
    pub async fn get_sync_status(
        &self,
        organization_id: &str,
        window: &DateWindow,
    ) -> Result<SyncStatus> {
        let options = SyncOptions { dry_run: true, ..SyncOptions::default() };
        let report = self.synchronize(organization_id, window, options).await?;

        Ok(SyncStatus {
            in_sync: report.created == 0 && report.updated == 0 && report.deleted == 0,
            to_create: report.created,
            to_update: report.updated,
            to_delete: report.deleted,
            unchanged: report.unchanged,
        })
    }

    /// Fetch both sides and run the comparator. Errors here abort the run.
    async fn derive_comparison(
        &self,
        organization_id: &str,
        window: &DateWindow,
    ) -> Result<SyncComparison> {
        let raw = self.billing.fetch_records(window).await?;
        let billing_records = normalize_response(&raw);
        let sales_records = self.sales.list_for_window(organization_id, window).await?;
        let index = self.build_customer_index(&billing_records).await?;

        Ok(compare(&billing_records, &sales_records, &index))
    }

    /// Lookup-only customer resolution for the comparator. Creation is
    /// deferred to the apply phase so dry runs never write.
    async fn build_customer_index(
        &self,
        billing_records: &[CanonicalBillingRecord],
    ) -> Result<CustomerIndex> {
        let mut index = CustomerIndex::new();
        let mut seen: Vec<&str> = Vec::new();

        for record in billing_records {
            let name = record.customer_name.as_str();
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            if let Some(customer) = self.customers.find_by_name(name).await? {
                index.insert(name, customer.id);
            }
        }

        Ok(index)
    }

    /// Apply the comparison: creates, then updates, then deletes. Per-item
    /// errors are recorded and do not stop the remaining items.
    async fn apply(
        &self,
        organization_id: &str,
        comparison: &SyncComparison,
        options: SyncOptions,
    ) -> SyncReport {
        let mut report = SyncReport::default();

        for record in &comparison.to_create {
            match self.apply_create(organization_id, record).await {
                Ok(row) => {
                    report.created += 1;
                    report.applied.push(AppliedChange {
                        action: SyncAction::Create,
                        record_id: record.id.clone(),
                        sales_record_id: Some(row.id),
                    });
                }
                Err(err) => record_failure(&mut report, SyncAction::Create, &record.id, &err),
            }
        }

        for update in &comparison.to_update {
            match self.apply_update(organization_id, update).await {
                Ok(row) => {
                    report.updated += 1;
                    report.applied.push(AppliedChange {
                        action: SyncAction::Update,
                        record_id: update.billing.id.clone(),
                        sales_record_id: Some(row.id),
                    });
                }
                Err(err) => {
                    record_failure(&mut report, SyncAction::Update, &update.billing.id, &err);
                }
            }
        }

        if options.delete_orphaned {
            for sales in &comparison.to_delete {
                match self.sales.delete(&sales.id).await {
                    Ok(()) => {
                        report.deleted += 1;
                        report.applied.push(AppliedChange {
                            action: SyncAction::Delete,
                            record_id: sales.id.clone(),
                            sales_record_id: Some(sales.id.clone()),
                        });
                    }
                    Err(err) => record_failure(&mut report, SyncAction::Delete, &sales.id, &err),
                }
            }
        } else if !comparison.to_delete.is_empty() {
            debug!(
                orphans = comparison.to_delete.len(),
                "orphaned sales records reported but not deleted"
            );
        }

        report
    }

    async fn apply_create(
        &self,
        organization_id: &str,
        record: &CanonicalBillingRecord,
    ) -> Result<SalesRecord> {
        let customer = self.resolve_customer(organization_id, &record.customer_name).await?;

        self.sales
            .insert(&NewSalesRecord {
                financial_id: record.id.clone(),
                customer_id: customer.id,
                product_name: derive_product_name(&record.customer_name, &record.project_name),
                quantity: record.hours,
                unit_price: record.rate,
                total_price: record.amount,
                date: record.date,
                organization_id: organization_id.to_string(),
            })
            .await
    }

    async fn apply_update(
        &self,
        organization_id: &str,
        update: &RecordUpdate,
    ) -> Result<SalesRecord> {
        let billing = &update.billing;
        let mut patch = SalesRecordPatch::default();

        for change in &update.changes {
            match change.field {
                SalesField::Quantity => patch.quantity = Some(billing.hours),
                SalesField::UnitPrice => patch.unit_price = Some(billing.rate),
                SalesField::TotalPrice => patch.total_price = Some(billing.amount),
                SalesField::Date => patch.date = Some(billing.date),
                SalesField::ProductName => {
                    patch.product_name = Some(derive_product_name(
                        &billing.customer_name,
                        &billing.project_name,
                    ));
                }
                SalesField::CustomerId => {
                    let customer =
                        self.resolve_customer(organization_id, &billing.customer_name).await?;
                    patch.customer_id = Some(customer.id);
                }
            }
        }

        self.sales.update(&update.sales.id, &patch).await
    }

    /// Idempotent lookup-by-name, create-if-absent, then ensure the
    /// organization-membership link exists.
    async fn resolve_customer(&self, organization_id: &str, name: &str) -> Result<Customer> {
        let customer = match self.customers.find_by_name(name).await? {
            Some(existing) => existing,
            None => {
                debug!(customer = %name, "creating missing local customer");
                self.customers.create(name).await?
            }
        };

        self.customers.ensure_membership(&customer.id, organization_id).await?;
        Ok(customer)
    }
}

fn record_failure(
    report: &mut SyncReport,
    action: SyncAction,
    record_id: &str,
    err: &tallysync_domain::TallySyncError,
) {
    warn!(%action, record_id, error = %err, "sync item failed; continuing");
    report.failures.push(SyncFailure {
        action,
        record_id: record_id.to_string(),
        message: truncate_reason(&err.to_string()),
    });
}

fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_FAILURE_MESSAGE_LEN {
        return reason.to_string();
    }

    let mut truncated =
        reason.chars().take(MAX_FAILURE_MESSAGE_LEN.saturating_sub(3)).collect::<String>();
    truncated.push_str("...");
    truncated
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
