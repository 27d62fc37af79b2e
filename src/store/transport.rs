//! Transport seam between the store client and a concrete table API

use async_trait::async_trait;
use super::{RawResponse, Row, SelectQuery, Table};

/// A request that never produced a response (connection refused, TLS, timeout)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

pub type TransportResult = std::result::Result<RawResponse, TransportError>;

/// Executes single table operations and returns the response untouched.
///
/// Implementations must not interpret the response; classification
/// happens in [`super::normalize`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Insert rows and return the inserted rows with their generated ids
    async fn insert(&self, table: Table, rows: &[Row]) -> TransportResult;

    /// Select rows matching the query
    async fn select(&self, table: Table, query: &SelectQuery) -> TransportResult;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
