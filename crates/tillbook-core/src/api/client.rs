//! HTTP client for the aggregation backend.
//!
//! This module provides the `BackendClient` struct, which implements the
//! `Backend` contract against an Apps Script web-app endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiError, Backend, Submitted};
use crate::models::{
    CashBalanceSnapshot, EntriesTable, EntryKind, ExpenseEntry, MonthlySummary, SalesEntry,
    SheetKind,
};
use crate::utils::MonthKey;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) reads.
/// Writes are never retried.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Writes go out as text/plain so that browser-facing deployments of the
/// backend accept them without a CORS preflight.
const WRITE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Every read answers with this envelope; which payload fields are present
/// depends on the query.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    balance: Option<CashBalanceSnapshot>,
    #[serde(default)]
    summary: Option<MonthlySummary>,
    #[serde(default)]
    headers: Vec<Value>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
    #[serde(default)]
    error: Option<String>,
}

impl QueryResponse {
    fn into_table(self) -> EntriesTable {
        let headers = self
            .headers
            .into_iter()
            .map(|h| match h {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        EntriesTable {
            headers,
            rows: self.rows,
        }
    }
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: EntryKind,
    entry: &'a T,
}

/// Backend client bound to one endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    endpoint: String,
}

impl BackendClient {
    /// Create a client for `endpoint` with the default timeout
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        Self::with_timeout(endpoint, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ApiError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(ApiError::NotConfigured);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Issue a read query and decode the response envelope.
    async fn query(&self, params: &[(&str, &str)]) -> Result<QueryResponse, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(&self.endpoint)
                .query(params)
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response.text().await?;
                    return serde_json::from_str(&text).map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    /// POST a write. The response body is not inspected: a 2xx only means
    /// the request was accepted for processing.
    async fn write<T: Serialize + Sync>(
        &self,
        kind: EntryKind,
        entry: &T,
    ) -> Result<Submitted, ApiError> {
        let body = serde_json::to_string(&WriteRequest { kind, entry })?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, WRITE_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        Self::check_response(response).await?;
        debug!(kind = %kind, "Write dispatched");
        Ok(Submitted::now(kind))
    }

    /// Confirm the endpoint is a live deployment: a bare GET must answer
    /// `{success: true}`.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        let parsed: QueryResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        if parsed.success {
            Ok(())
        } else {
            Err(ApiError::Backend(
                parsed
                    .error
                    .unwrap_or_else(|| "Apps Script returned an error. Please check the deployment.".to_string()),
            ))
        }
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn submit_sales(&self, entry: &SalesEntry) -> Result<Submitted, ApiError> {
        self.write(EntryKind::Sales, entry).await
    }

    async fn submit_expense(&self, entry: &ExpenseEntry) -> Result<Submitted, ApiError> {
        self.write(EntryKind::Expense, entry).await
    }

    async fn submit_adjustments(&self, entry: &Value) -> Result<Submitted, ApiError> {
        self.write(EntryKind::Adjustments, entry).await
    }

    async fn fetch_cash_balance(&self, date: NaiveDate) -> Option<CashBalanceSnapshot> {
        let date = date.format("%Y-%m-%d").to_string();
        match self.query(&[("type", "cashBalance"), ("date", &date)]).await {
            Ok(response) if response.success => response.balance,
            Ok(_) => {
                debug!(date = %date, "No cash balance for date");
                None
            }
            Err(e) => {
                warn!(date = %date, error = %e, "Failed to get cash balance, using zeroed snapshot");
                Some(CashBalanceSnapshot::zeroed())
            }
        }
    }

    async fn fetch_monthly_summary(&self, month: &MonthKey) -> Option<MonthlySummary> {
        let label = month.wire_label();
        match self.query(&[("type", "monthlySummary"), ("month", &label)]).await {
            Ok(response) if response.success => response.summary,
            Ok(_) => None,
            Err(e) => {
                warn!(month = %label, error = %e, "Failed to get monthly summary");
                None
            }
        }
    }

    async fn fetch_entries(
        &self,
        sheet: SheetKind,
        month: &MonthKey,
    ) -> Result<EntriesTable, ApiError> {
        let label = month.wire_label();
        let response = self
            .query(&[("type", "entries"), ("sheet", sheet.as_str()), ("month", &label)])
            .await?;

        if response.success {
            Ok(response.into_table())
        } else {
            Err(ApiError::Backend(
                response
                    .error
                    .unwrap_or_else(|| "Unknown error fetching entries".to_string()),
            ))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
