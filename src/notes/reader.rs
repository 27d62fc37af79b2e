//! Hierarchy reader - read-only projections over the stored tables

use crate::store::{columns, SelectQuery, StoreClient, Table};
use crate::Result;
use super::models::{decode_all, ClassHierarchy, ClassRow, NoteRow, TopicNotes, TopicRow};

/// Reads classes, topics and notes back out of the store
#[derive(Debug, Clone)]
pub struct HierarchyReader {
    store: StoreClient,
}

impl HierarchyReader {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// All classes, in whatever order the store returns them
    pub async fn list_classes(&self) -> Result<Vec<ClassRow>> {
        let rows = self.store.select(Table::Classes, &SelectQuery::new()).await?;
        decode_all(rows, "class")
    }

    /// Topics of a class, by stored position
    pub async fn list_topics(&self, class_id: i64) -> Result<Vec<TopicRow>> {
        let query = SelectQuery::new()
            .eq(columns::CLASS_ID, class_id)
            .order_by(columns::ORD);
        let rows = self.store.select(Table::Topics, &query).await?;
        decode_all(rows, "topic")
    }

    /// Notes of a topic, by stored position. Empty for unknown topics.
    pub async fn list_notes(&self, topic_id: i64) -> Result<Vec<NoteRow>> {
        let query = SelectQuery::new()
            .eq(columns::TOPIC_ID, topic_id)
            .order_by(columns::ORD);
        let rows = self.store.select(Table::Notes, &query).await?;
        decode_all(rows, "note")
    }

    pub async fn get_class(&self, class_id: i64) -> Result<Option<ClassRow>> {
        let query = SelectQuery::new().eq(columns::ID, class_id);
        let rows = self.store.select(Table::Classes, &query).await?;
        Ok(decode_all(rows, "class")?.into_iter().next())
    }

    /// One class with its topics and notes, or `None` if the class does not exist.
    ///
    /// Costs one class lookup, one topics select and one notes select per
    /// topic.
    pub async fn get_hierarchy(&self, class_id: i64) -> Result<Option<ClassHierarchy>> {
        let Some(class) = self.get_class(class_id).await? else {
            return Ok(None);
        };

        let mut topics = Vec::new();
        for topic in self.list_topics(class_id).await? {
            let notes = self.list_notes(topic.id).await?;
            topics.push((topic.id, TopicNotes { title: topic.title, notes }));
        }

        Ok(Some(ClassHierarchy {
            id: class.id,
            name: class.name,
            topics,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::HierarchyDocument;
    use crate::notes::HierarchyWriter;
    use crate::store::{MemoryTransport, ResponseShape};
    use crate::Error;
    use std::sync::Arc;

    fn pair(transport: Arc<MemoryTransport>) -> (HierarchyWriter, HierarchyReader) {
        let store = StoreClient::from_shared(transport);
        (HierarchyWriter::new(store.clone()), HierarchyReader::new(store))
    }

    fn algebra() -> HierarchyDocument {
        HierarchyDocument::new("Algebra")
            .with_topic("Linear Equations", ["solve for x", "graphing"])
            .with_topic("Quadratics", ["factoring"])
    }

    #[tokio::test]
    async fn test_hierarchy_round_trip() {
        let (writer, reader) = pair(Arc::new(MemoryTransport::new()));
        let class_id = writer.write(&algebra()).await.unwrap();

        let hierarchy = reader.get_hierarchy(class_id).await.unwrap().unwrap();
        assert_eq!(hierarchy.name, "Algebra");
        assert_eq!(hierarchy.topics.len(), 2);

        let (linear_id, linear) = &hierarchy.topics[0];
        assert_eq!(linear.title, "Linear Equations");
        let contents: Vec<_> = linear.notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["solve for x", "graphing"]);
        assert!(linear.notes.iter().all(|n| n.topic_id == *linear_id));

        let (_, quad) = &hierarchy.topics[1];
        assert_eq!(quad.title, "Quadratics");
        assert_eq!(quad.notes.len(), 1);
        assert_eq!(quad.notes[0].ord, 0);
    }

    #[tokio::test]
    async fn test_order_follows_document_across_classes() {
        let (writer, reader) = pair(Arc::new(MemoryTransport::new()));

        let titles = ["Zeta", "Alpha", "Mu", "Beta"];
        let mut doc = HierarchyDocument::new("Ordering");
        for title in titles {
            doc = doc.with_topic(title, [format!("{} 1", title), format!("{} 2", title)]);
        }

        writer.write(&algebra()).await.unwrap();
        let class_id = writer.write(&doc).await.unwrap();

        let topics = reader.list_topics(class_id).await.unwrap();
        let read_titles: Vec<_> = topics.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(read_titles, titles);
        assert_eq!(topics.iter().map(|t| t.ord).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let notes = reader.list_notes(topics[2].id).await.unwrap();
        let contents: Vec<_> = notes.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["Mu 1", "Mu 2"]);
    }

    #[tokio::test]
    async fn test_notes_for_unknown_topic_is_empty() {
        let (_, reader) = pair(Arc::new(MemoryTransport::new()));
        assert!(reader.list_notes(404).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_class_is_none() {
        let (writer, reader) = pair(Arc::new(MemoryTransport::new()));
        writer.write(&algebra()).await.unwrap();
        assert!(reader.get_hierarchy(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_classes_in_plain_shape() {
        let transport = Arc::new(MemoryTransport::new().with_shape(ResponseShape::Plain));
        let (writer, reader) = pair(transport);
        writer.write(&algebra()).await.unwrap();
        writer.write(&HierarchyDocument::new("Geometry")).await.unwrap();

        let names: Vec<_> = reader
            .list_classes()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Algebra", "Geometry"]);
    }

    #[tokio::test]
    async fn test_read_failure_surfaces() {
        let transport = Arc::new(MemoryTransport::new());
        transport.fail_selects(Table::Topics);
        let (writer, reader) = pair(transport);
        let class_id = writer.write(&HierarchyDocument::new("Broken")).await.unwrap();

        let err = reader.get_hierarchy(class_id).await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }
}
