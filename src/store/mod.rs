//! Remote Store Client - table access over an HTTP database API
//!
//! The system of record is a relational store reached only through a REST
//! table API with tables:
//! - classes(id, name)
//! - topics(id, class_id, title, ord)
//! - notes(id, topic_id, content, ord)
//! - raw_resp(id, class_id, raw_text)
//!
//! A [`Transport`] performs one request and hands back the response in
//! whatever shape it arrived in; [`response::normalize`] turns every shape
//! into rows or a [`StoreError`], and [`StoreClient`] is what the rest of
//! the crate talks to.

pub mod schema;
pub mod response;
pub mod transport;
pub mod client;
pub mod rest;
pub mod memory;

pub use schema::{Table, columns};
pub use response::{RawResponse, normalize};
pub use transport::{Transport, TransportError, TransportResult};
pub use client::StoreClient;
pub use rest::RestTransport;
pub use memory::{MemoryTransport, ResponseShape, StoreCall, CallKind};

use serde_json::Value;

/// One table row as returned by the remote API
pub type Row = serde_json::Map<String, Value>;

/// A remote table operation that did not succeed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The API answered with an error status code
    #[error("{context} failed: HTTP {status}: {message}")]
    Status {
        context: String,
        status: u16,
        message: String,
    },

    /// The response carried an error payload
    #[error("{context} failed: store error: {message}")]
    Payload { context: String, message: String },

    /// The response body was not rows
    #[error("{context} failed: malformed response: {message}")]
    Malformed { context: String, message: String },

    /// The request never produced a response
    #[error("{context} failed: transport error: {message}")]
    Transport { context: String, message: String },
}

/// Equality filters plus optional ascending ordering for a `select`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<String>,
}

impl SelectQuery {
    /// Select every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    /// Order ascending by a column
    pub fn order_by(mut self, column: &str) -> Self {
        self.order_by = Some(column.to_string());
        self
    }

    /// Check whether a row passes every filter
    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }
}

/// Build a row from `(column, value)` pairs
pub fn row<I, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (&'static str, V)>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_query_matches() {
        let query = SelectQuery::new().eq("class_id", 4).eq("title", "Limits");

        let hit = row([("class_id", json!(4)), ("title", json!("Limits"))]);
        let wrong_class = row([("class_id", json!(5)), ("title", json!("Limits"))]);
        let missing = row([("class_id", json!(4))]);

        assert!(query.matches(&hit));
        assert!(!query.matches(&wrong_class));
        assert!(!query.matches(&missing));
        assert!(SelectQuery::new().matches(&missing));
    }

    #[test]
    fn test_store_error_display_names_context() {
        let err = StoreError::Status {
            context: "insert into topics".into(),
            status: 409,
            message: "duplicate key".into(),
        };
        assert_eq!(err.to_string(), "insert into topics failed: HTTP 409: duplicate key");
    }
}
