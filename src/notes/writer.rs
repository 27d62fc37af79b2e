//! Hierarchy writer - persists a document as class, topics and notes rows
//!
//! A write is three dependent remote inserts:
//!
//! 1. one `classes` row, whose generated id the topics need
//! 2. all `topics` rows in one bulk insert, `ord` = position in the document
//! 3. all `notes` rows in one bulk insert, `ord` = position within the topic
//!
//! The steps are separate API calls, so a write is not atomic. When a step
//! fails the remaining steps are skipped and the error is returned; rows
//! written by earlier steps stay in the store. Nothing is retried and
//! nothing is rolled back.

use std::collections::HashMap;
use serde_json::{json, Value};
use crate::document::HierarchyDocument;
use crate::store::{columns, row, Row, SelectQuery, StoreClient, Table};
use crate::{Error, Result};

/// Writes hierarchy documents through a [`StoreClient`]
#[derive(Debug, Clone)]
pub struct HierarchyWriter {
    store: StoreClient,
}

impl HierarchyWriter {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Validate an untyped document, then write it.
    ///
    /// Validation failures return before any remote call is made.
    pub async fn write_value(&self, value: &Value) -> Result<i64> {
        let doc = HierarchyDocument::from_value(value)?;
        self.write(&doc).await
    }

    /// Persist a document and return the new class id.
    ///
    /// See the module docs for partial-failure behavior.
    pub async fn write(&self, doc: &HierarchyDocument) -> Result<i64> {
        doc.validate()?;

        let class_id = self.insert_class(&doc.class_name).await?;

        let title_to_id = self.insert_topics(class_id, doc).await?;

        let mut notes_payload: Vec<Row> = Vec::with_capacity(doc.note_count());
        for topic in &doc.topics {
            let topic_id = match title_to_id.get(topic.title.as_str()) {
                Some(id) => *id,
                None => self.recover_topic_id(class_id, &topic.title).await?,
            };

            for (ord, note) in topic.notes.iter().enumerate() {
                notes_payload.push(row([
                    (columns::TOPIC_ID, json!(topic_id)),
                    (columns::CONTENT, json!(note)),
                    (columns::ORD, json!(ord)),
                ]));
            }
        }

        if !notes_payload.is_empty() {
            self.store.insert(Table::Notes, &notes_payload).await?;
        }

        tracing::info!(
            "Stored class '{}' (id {}) with {} topics and {} notes",
            doc.class_name,
            class_id,
            doc.topics.len(),
            notes_payload.len()
        );

        Ok(class_id)
    }

    /// Write the document, then keep a copy of the unstructured input.
    ///
    /// The audit insert is best-effort: whatever happens to it, the result
    /// is the result of [`Self::write`].
    pub async fn write_with_audit(&self, doc: &HierarchyDocument, raw_text: Option<&str>) -> Result<i64> {
        let class_id = self.write(doc).await?;

        if let Some(text) = raw_text.filter(|t| !t.is_empty()) {
            let audit = row([
                (columns::CLASS_ID, json!(class_id)),
                (columns::RAW_TEXT, json!(text)),
            ]);
            if let Err(e) = self.store.insert(Table::RawResp, &[audit]).await {
                tracing::warn!("Ignoring raw text audit failure for class {}: {}", class_id, e);
            }
        }

        Ok(class_id)
    }

    async fn insert_class(&self, name: &str) -> Result<i64> {
        let rows = self
            .store
            .insert(Table::Classes, &[row([(columns::NAME, json!(name))])])
            .await?;

        let first = rows
            .first()
            .ok_or_else(|| Error::Persistence("Unexpected response inserting class: no rows returned.".into()))?;

        first
            .get(columns::ID)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Persistence("Inserted class id not found.".into()))
    }

    /// Bulk insert the topics and map each returned title to its id
    async fn insert_topics(&self, class_id: i64, doc: &HierarchyDocument) -> Result<HashMap<String, i64>> {
        let payload: Vec<Row> = doc
            .topics
            .iter()
            .enumerate()
            .map(|(ord, topic)| {
                row([
                    (columns::CLASS_ID, json!(class_id)),
                    (columns::TITLE, json!(topic.title)),
                    (columns::ORD, json!(ord)),
                ])
            })
            .collect();

        if payload.is_empty() {
            return Ok(HashMap::new());
        }

        let inserted = self.store.insert(Table::Topics, &payload).await?;
        if inserted.is_empty() {
            return Err(Error::Persistence("No topics returned after insert.".into()));
        }

        Ok(inserted
            .iter()
            .filter_map(|r| {
                let title = r.get(columns::TITLE)?.as_str()?;
                let id = r.get(columns::ID)?.as_i64()?;
                Some((title.to_string(), id))
            })
            .collect())
    }

    /// Look a topic up by (class id, title) when the insert response left it out
    async fn recover_topic_id(&self, class_id: i64, title: &str) -> Result<i64> {
        tracing::warn!("Topic '{}' missing from insert response; selecting it", title);

        let query = SelectQuery::new()
            .eq(columns::CLASS_ID, class_id)
            .eq(columns::TITLE, title);
        let rows = self.store.select(Table::Topics, &query).await?;

        rows.first()
            .and_then(|r| r.get(columns::ID))
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Persistence(format!("Topic id for '{}' not found.", title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CallKind, MemoryTransport, RawResponse, Transport, TransportResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn writer_with(transport: Arc<MemoryTransport>) -> HierarchyWriter {
        HierarchyWriter::new(StoreClient::from_shared(transport))
    }

    fn algebra() -> HierarchyDocument {
        HierarchyDocument::new("Algebra")
            .with_topic("Linear Equations", ["solve for x", "graphing"])
            .with_topic("Quadratics", ["factoring"])
    }

    fn column<'a>(row: &'a Row, name: &str) -> &'a Value {
        &row[name]
    }

    #[tokio::test]
    async fn test_write_algebra() {
        let transport = Arc::new(MemoryTransport::new());
        let class_id = writer_with(transport.clone()).write(&algebra()).await.unwrap();

        let classes = transport.rows(Table::Classes);
        assert_eq!(classes.len(), 1);
        assert_eq!(column(&classes[0], "name"), &json!("Algebra"));
        assert_eq!(class_id, 1);

        let topics = transport.rows(Table::Topics);
        assert_eq!(topics.len(), 2);
        assert_eq!(column(&topics[0], "title"), &json!("Linear Equations"));
        assert_eq!(column(&topics[0], "ord"), &json!(0));
        assert_eq!(column(&topics[1], "title"), &json!("Quadratics"));
        assert_eq!(column(&topics[1], "ord"), &json!(1));
        assert!(topics.iter().all(|t| t["class_id"] == json!(class_id)));

        let notes = transport.rows(Table::Notes);
        let summary: Vec<_> = notes
            .iter()
            .map(|n| (n["topic_id"].as_i64().unwrap(), n["content"].as_str().unwrap(), n["ord"].as_i64().unwrap()))
            .collect();
        let linear = topics[0]["id"].as_i64().unwrap();
        let quad = topics[1]["id"].as_i64().unwrap();
        assert_eq!(
            summary,
            vec![(linear, "solve for x", 0), (linear, "graphing", 1), (quad, "factoring", 0)]
        );

        // class, topics, notes: three calls, no fallback select
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_topics_writes_only_class() {
        let transport = Arc::new(MemoryTransport::new());
        let class_id = writer_with(transport.clone())
            .write(&HierarchyDocument::new("Empty"))
            .await
            .unwrap();

        assert_eq!(class_id, 1);
        assert_eq!(transport.call_count(), 1);
        assert!(transport.rows(Table::Topics).is_empty());
        assert!(transport.rows(Table::Notes).is_empty());
    }

    #[tokio::test]
    async fn test_topics_without_notes_skip_notes_insert() {
        let transport = Arc::new(MemoryTransport::new());
        let doc = HierarchyDocument::new("Outline").with_topic("Intro", Vec::<String>::new());
        writer_with(transport.clone()).write(&doc).await.unwrap();

        assert_eq!(transport.rows(Table::Topics).len(), 1);
        assert!(transport.calls().iter().all(|c| c.table != Table::Notes));
    }

    #[tokio::test]
    async fn test_invalid_document_makes_no_calls() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = writer_with(transport.clone());

        for value in [json!({"Class": "A"}), json!({"Topics": {}}), json!({"Class": "A", "Topics": {"T": [1]}})] {
            let err = writer.write_value(&value).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_class_makes_no_calls() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = writer_with(transport.clone());

        let err = writer.write_value(&json!({"Class": "  ", "Topics": {}})).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = writer.write(&HierarchyDocument::new("").with_topic("T", ["a"])).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_titles_rejected_before_any_call() {
        let transport = Arc::new(MemoryTransport::new());
        let doc = HierarchyDocument::new("Dup").with_topic("T", ["a"]).with_topic("T", ["b"]);
        let err = writer_with(transport.clone()).write(&doc).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_select_recovers_omitted_topic() {
        let transport = Arc::new(MemoryTransport::new());
        transport.omit_from_response("Quadratics");

        let class_id = writer_with(transport.clone()).write(&algebra()).await.unwrap();

        let selects: Vec<_> = transport
            .calls()
            .into_iter()
            .filter(|c| c.kind == CallKind::Select)
            .collect();
        assert_eq!(selects.len(), 1);
        assert_eq!(selects[0].table, Table::Topics);
        assert_eq!(
            selects[0].query,
            Some(SelectQuery::new().eq("class_id", class_id).eq("title", "Quadratics"))
        );

        let quad_id = transport.rows(Table::Topics)[1]["id"].clone();
        let factoring = transport
            .rows(Table::Notes)
            .into_iter()
            .find(|n| n["content"] == json!("factoring"))
            .unwrap();
        assert_eq!(factoring["topic_id"], quad_id);
    }

    #[tokio::test]
    async fn test_unrecoverable_topic_names_title() {
        let transport = Arc::new(MemoryTransport::new());
        transport.discard_on_insert("Quadratics");

        let err = writer_with(transport.clone()).write(&algebra()).await.unwrap_err();
        match err {
            Error::Persistence(msg) => assert!(msg.contains("'Quadratics'"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(transport.calls().iter().any(|c| c.kind == CallKind::Select));
        assert!(transport.rows(Table::Notes).is_empty());
    }

    #[tokio::test]
    async fn test_topics_failure_leaves_class_behind() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail_inserts(Table::Topics);

        let err = writer_with(transport.clone()).write(&algebra()).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        // partial write is not rolled back
        assert_eq!(transport.rows(Table::Classes).len(), 1);
        assert!(transport.calls().iter().all(|c| c.table != Table::Notes));
    }

    #[tokio::test]
    async fn test_empty_topics_response_is_persistence_error() {
        let transport = Arc::new(MemoryTransport::new());
        transport.discard_on_insert("Linear Equations");
        transport.discard_on_insert("Quadratics");

        let err = writer_with(transport).write(&algebra()).await.unwrap_err();
        assert!(err.to_string().contains("No topics returned"));
    }

    struct ClassWithoutId;

    #[async_trait]
    impl Transport for ClassWithoutId {
        async fn insert(&self, _table: Table, _rows: &[Row]) -> TransportResult {
            Ok(RawResponse::Plain(json!([{"name": "Algebra"}])))
        }

        async fn select(&self, _table: Table, _query: &SelectQuery) -> TransportResult {
            Ok(RawResponse::Plain(json!([])))
        }

        fn name(&self) -> &'static str {
            "class-without-id"
        }
    }

    #[tokio::test]
    async fn test_missing_class_id_is_persistence_error() {
        let writer = HierarchyWriter::new(StoreClient::new(ClassWithoutId));
        let err = writer.write(&algebra()).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(ref m) if m.contains("class id")));
    }

    #[tokio::test]
    async fn test_audit_failure_is_swallowed() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail_inserts(Table::RawResp);

        let writer = writer_with(transport.clone());
        let class_id = writer.write_with_audit(&algebra(), Some("raw lecture text")).await.unwrap();

        assert_eq!(class_id, 1);
        assert_eq!(transport.rows(Table::Notes).len(), 3);
        assert!(transport.rows(Table::RawResp).is_empty());
    }

    #[tokio::test]
    async fn test_audit_row_written() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = writer_with(transport.clone());
        let class_id = writer.write_with_audit(&algebra(), Some("raw lecture text")).await.unwrap();

        let audit = transport.rows(Table::RawResp);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0]["class_id"], json!(class_id));
        assert_eq!(audit[0]["raw_text"], json!("raw lecture text"));
    }

    #[tokio::test]
    async fn test_audit_skipped_without_text() {
        let transport = Arc::new(MemoryTransport::new());
        let writer = writer_with(transport.clone());
        writer.write_with_audit(&algebra(), None).await.unwrap();
        writer.write_with_audit(&algebra(), Some("")).await.unwrap();

        assert!(transport.calls().iter().all(|c| c.table != Table::RawResp));
    }

    #[tokio::test]
    async fn test_audit_variant_propagates_write_failure() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail_inserts(Table::Notes);

        let writer = writer_with(transport.clone());
        let plain = writer.write(&algebra()).await.unwrap_err();
        let audited = writer.write_with_audit(&algebra(), Some("raw")).await.unwrap_err();

        assert_eq!(plain.to_string(), audited.to_string());
        assert!(transport.calls().iter().all(|c| c.table != Table::RawResp));
    }
}
