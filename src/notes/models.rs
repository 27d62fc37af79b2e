//! Row types and the nested hierarchy view

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use crate::store::Row;
use crate::{Error, Result};

/// A row of `classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRow {
    pub id: i64,
    pub name: String,
}

/// A row of `topics`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRow {
    pub id: i64,
    pub class_id: i64,
    pub title: String,
    #[serde(default)]
    pub ord: i64,
}

/// A row of `notes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: i64,
    pub topic_id: i64,
    pub content: String,
    #[serde(default)]
    pub ord: i64,
}

/// A topic and its notes inside a [`ClassHierarchy`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicNotes {
    pub title: String,
    pub notes: Vec<NoteRow>,
}

/// One class with all of its topics and notes, in stored order.
///
/// Serializes as `{"id", "name", "topics": {"<topic id>": {"title", "notes"}}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassHierarchy {
    pub id: i64,
    pub name: String,
    pub topics: Vec<(i64, TopicNotes)>,
}

impl Serialize for ClassHierarchy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Topics<'a>(&'a [(i64, TopicNotes)]);

        impl Serialize for Topics<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (id, topic) in self.0 {
                    map.serialize_entry(&id.to_string(), topic)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("topics", &Topics(&self.topics))?;
        map.end()
    }
}

/// Decode a remote row into a typed row; unknown columns are ignored
pub fn decode<T: serde::de::DeserializeOwned>(row: Row, what: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| Error::Persistence(format!("unexpected {} row: {}", what, e)))
}

/// Decode every row, failing on the first unusable one
pub fn decode_all<T: serde::de::DeserializeOwned>(rows: Vec<Row>, what: &str) -> Result<Vec<T>> {
    rows.into_iter().map(|row| decode(row, what)).collect()
}
