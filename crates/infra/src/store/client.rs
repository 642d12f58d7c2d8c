/// REST client for the hosted relational-table API
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tallysync_domain::{Result, StoreConfig, TallySyncError};
use tracing::debug;

use crate::http::HttpClient;

/// A single column predicate in a query or match-criteria list.
#[derive(Debug, Clone, Serialize)]
pub struct QueryFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl QueryFilter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self { column: column.into(), op, value: value.into() }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// Uniform response envelope used by every table endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    filters: &'a [QueryFilter],
}

#[derive(Serialize)]
struct MutationBody<'a, P: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    row: Option<&'a P>,
    #[serde(skip_serializing_if = "Option::is_none")]
    patch: Option<&'a P>,
    #[serde(rename = "matchCriteria", skip_serializing_if = "Option::is_none")]
    match_criteria: Option<&'a [QueryFilter]>,
}

/// Client for the store's `query`/`insert`/`update`/`remove` operations.
///
/// Every endpoint returns the `{success, data, error}` envelope; an envelope
/// with `success:false` surfaces as [`TallySyncError::Database`] carrying the
/// store's error message.
pub struct StoreClient {
    base_url: String,
    http_client: HttpClient,
    api_key: Option<String>,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .max_attempts(config.max_retries.max(1))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            api_key: config.api_key.clone(),
        })
    }

    /// Rows from `table` matching all `filters`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[QueryFilter],
    ) -> Result<Vec<T>> {
        let data = self
            .execute::<_, Vec<T>>(table, "query", &QueryBody { filters })
            .await?;
        Ok(data.unwrap_or_default())
    }

    /// Insert `row` into `table`, returning the stored row.
    pub async fn insert<T: DeserializeOwned>(
        &self,
        table: &str,
        row: &impl Serialize,
    ) -> Result<T> {
        let body = MutationBody { row: Some(row), patch: None, match_criteria: None };
        self.execute(table, "insert", &body).await?.ok_or_else(|| {
            TallySyncError::Database(format!("store insert into {table} returned no row"))
        })
    }

    /// Apply `patch` to the rows of `table` matching `criteria`, returning
    /// the first post-update row.
    pub async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        patch: &impl Serialize,
        criteria: &[QueryFilter],
    ) -> Result<T> {
        let body =
            MutationBody { row: None, patch: Some(patch), match_criteria: Some(criteria) };
        self.execute(table, "update", &body).await?.ok_or_else(|| {
            TallySyncError::NotFound(format!("store update matched no row in {table}"))
        })
    }

    /// Remove the rows of `table` matching `criteria`.
    pub async fn remove(&self, table: &str, criteria: &[QueryFilter]) -> Result<()> {
        let body: MutationBody<'_, Value> =
            MutationBody { row: None, patch: None, match_criteria: Some(criteria) };
        self.execute::<_, Value>(table, "remove", &body).await?;
        Ok(())
    }

    async fn execute<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        operation: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let endpoint = format!("{}/api/tables/{table}/{operation}", self.base_url);
        debug!(table, operation, "store request");

        let mut builder = self.http_client.request(Method::POST, &endpoint).json(body);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = self.http_client.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TallySyncError::Database(format!(
                "store {operation} on {table} returned {status}"
            )));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|err| {
            TallySyncError::Database(format!(
                "store {operation} on {table} returned a malformed envelope: {err}"
            ))
        })?;

        if !envelope.success {
            let reason = envelope.error.unwrap_or_else(|| "unspecified store error".to_string());
            return Err(TallySyncError::Database(format!(
                "store {operation} on {table} failed: {reason}"
            )));
        }

        Ok(envelope.data)
    }
}
