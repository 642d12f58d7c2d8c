/// Sales-row repository over the hosted table API
use std::sync::Arc;

use async_trait::async_trait;
use tallysync_core::SalesRecordRepository;
use tallysync_domain::constants::SALES_TABLE;
use tallysync_domain::{DateWindow, NewSalesRecord, Result, SalesRecord, SalesRecordPatch};

use super::client::{FilterOp, QueryFilter, StoreClient};

/// [`SalesRecordRepository`] backed by the `customer_sales` table.
pub struct SalesRecordStore {
    client: Arc<StoreClient>,
}

impl SalesRecordStore {
    pub fn new(client: Arc<StoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SalesRecordRepository for SalesRecordStore {
    async fn list_for_window(
        &self,
        organization_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<SalesRecord>> {
        // Inclusive bounds at day granularity, matching the comparator.
        let filters = [
            QueryFilter::eq("organizationId", organization_id),
            QueryFilter::new("date", FilterOp::Gte, window.start.to_string()),
            QueryFilter::new("date", FilterOp::Lte, window.end.to_string()),
        ];

        self.client.query(SALES_TABLE, &filters).await
    }

    async fn insert(&self, record: &NewSalesRecord) -> Result<SalesRecord> {
        self.client.insert(SALES_TABLE, record).await
    }

    async fn update(&self, id: &str, patch: &SalesRecordPatch) -> Result<SalesRecord> {
        self.client.update(SALES_TABLE, patch, &[QueryFilter::eq("id", id)]).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.remove(SALES_TABLE, &[QueryFilter::eq("id", id)]).await
    }
}
