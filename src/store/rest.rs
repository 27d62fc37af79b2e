//! REST transport for PostgREST-style table APIs (Supabase and friends)
//!
//! - insert: `POST {url}/rest/v1/{table}` with `Prefer: return=representation`
//! - select: `GET {url}/rest/v1/{table}?select=*&col=eq.value&order=col.asc`

use async_trait::async_trait;
use serde_json::Value;
use super::{RawResponse, Row, SelectQuery, Table, Transport, TransportError, TransportResult};

/// HTTP transport authenticated with a service key
pub struct RestTransport {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestTransport {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint for a table
    pub fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn request(&self, method: reqwest::Method, table: Table) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn into_raw(response: reqwest::Response) -> TransportResult {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        Ok(raw_response(status, text))
    }
}

/// Keep status and body together; the body is JSON when it parses.
///
/// Below 400 the body is `data`, otherwise it is `error`.
pub fn raw_response(status: u16, text: String) -> RawResponse {
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };

    if status >= 400 {
        RawResponse::Status { status, data: None, error: Some(body) }
    } else {
        RawResponse::Status { status, data: Some(body), error: None }
    }
}

/// Query-string pairs for a select
pub fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{}", filter_literal(value))));
    }
    if let Some(column) = &query.order_by {
        params.push(("order".to_string(), format!("{}.asc", column)));
    }
    params
}

fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn insert(&self, table: Table, rows: &[Row]) -> TransportResult {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await
            .map_err(|e| TransportError(format!("POST {} failed: {}", table, e)))?;

        Self::into_raw(response).await
    }

    async fn select(&self, table: Table, query: &SelectQuery) -> TransportResult {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(&select_params(query))
            .send()
            .await
            .map_err(|e| TransportError(format!("GET {} failed: {}", table, e)))?;

        Self::into_raw(response).await
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
