/// Customer directory over the hosted table API
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tallysync_core::CustomerDirectory;
use tallysync_domain::constants::{CUSTOMERS_TABLE, MEMBERSHIPS_TABLE};
use tallysync_domain::{Customer, Result};
use tracing::debug;

use super::client::{QueryFilter, StoreClient};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCustomer<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMembership<'a> {
    customer_id: &'a str,
    organization_id: &'a str,
}

/// [`CustomerDirectory`] backed by the `customers` and
/// `customer_organizations` tables.
pub struct CustomerStore {
    client: Arc<StoreClient>,
}

impl CustomerStore {
    pub fn new(client: Arc<StoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CustomerDirectory for CustomerStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Customer>> {
        let matches: Vec<Customer> =
            self.client.query(CUSTOMERS_TABLE, &[QueryFilter::eq("name", name)]).await?;
        Ok(matches.into_iter().next())
    }

    async fn create(&self, name: &str) -> Result<Customer> {
        debug!(customer = %name, "creating customer");
        self.client.insert(CUSTOMERS_TABLE, &NewCustomer { name }).await
    }

    async fn ensure_membership(&self, customer_id: &str, organization_id: &str) -> Result<()> {
        let criteria = [
            QueryFilter::eq("customerId", customer_id),
            QueryFilter::eq("organizationId", organization_id),
        ];
        let existing: Vec<serde_json::Value> =
            self.client.query(MEMBERSHIPS_TABLE, &criteria).await?;
        if !existing.is_empty() {
            return Ok(());
        }

        let link = NewMembership { customer_id, organization_id };
        let _: serde_json::Value = self.client.insert(MEMBERSHIPS_TABLE, &link).await?;
        Ok(())
    }
}
