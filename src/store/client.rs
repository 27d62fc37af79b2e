//! Store client used by the hierarchy writer and reader

use std::sync::Arc;
use super::{normalize, Row, SelectQuery, StoreError, Table, Transport};

/// Table-level insert/select over any [`Transport`].
///
/// Cheap to clone; one client is built at startup and shared by every
/// request.
#[derive(Clone)]
pub struct StoreClient {
    transport: Arc<dyn Transport>,
}

impl StoreClient {
    /// Wrap a transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Wrap a shared transport (tests keep a handle to inspect it)
    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Insert rows, returning them as stored (with generated ids)
    pub async fn insert(&self, table: Table, rows: &[Row]) -> Result<Vec<Row>, StoreError> {
        let context = format!("insert into {}", table);
        tracing::debug!("{} ({} rows) via {}", context, rows.len(), self.transport.name());

        let raw = self
            .transport
            .insert(table, rows)
            .await
            .map_err(|e| StoreError::Transport {
                context: context.clone(),
                message: e.to_string(),
            })?;

        normalize(raw, &context)
    }

    /// Select rows by equality filters with optional ascending ordering
    pub async fn select(&self, table: Table, query: &SelectQuery) -> Result<Vec<Row>, StoreError> {
        let context = format!("select from {}", table);
        tracing::debug!("{} {:?} via {}", context, query, self.transport.name());

        let raw = self
            .transport
            .select(table, query)
            .await
            .map_err(|e| StoreError::Transport {
                context: context.clone(),
                message: e.to_string(),
            })?;

        normalize(raw, &context)
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("transport", &self.transport.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{row, MemoryTransport, ResponseShape, TransportError, TransportResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn insert(&self, _table: Table, _rows: &[Row]) -> TransportResult {
            Err(TransportError("connection refused".into()))
        }

        async fn select(&self, _table: Table, _query: &SelectQuery) -> TransportResult {
            Err(TransportError("connection refused".into()))
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn test_insert_returns_generated_ids() {
        let client = StoreClient::new(MemoryTransport::new());
        let rows = client
            .insert(Table::Classes, &[row([("name", json!("Biology"))])])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[0]["name"], json!("Biology"));
    }

    #[tokio::test]
    async fn test_failures_classified_in_every_shape() {
        for shape in [ResponseShape::Status, ResponseShape::DataError, ResponseShape::Plain] {
            let transport = MemoryTransport::new().with_shape(shape);
            transport.fail_inserts(Table::Notes);
            let client = StoreClient::new(transport);

            let err = client
                .insert(Table::Notes, &[row([("content", json!("x"))])])
                .await
                .unwrap_err();
            assert!(err.to_string().starts_with("insert into notes failed"), "{:?}", shape);
        }
    }

    #[tokio::test]
    async fn test_transport_fault_is_store_error() {
        let client = StoreClient::new(Unreachable);
        let err = client.select(Table::Classes, &SelectQuery::new()).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::Transport {
                context: "select from classes".into(),
                message: "connection refused".into(),
            }
        );
    }
}
