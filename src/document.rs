//! Hierarchy documents - the `{Class, Topics}` shape exchanged between the
//! structuring step, the HTTP surface and the hierarchy writer.
//!
//! ```json
//! {"Class": "Algebra", "Topics": {"Linear Equations": ["solve for x", "graphing"]}}
//! ```
//!
//! Topic order is significant: it becomes the stored `ord` of each topic.

use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashSet;

/// One topic of a hierarchy document, with its notes in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicEntry {
    pub title: String,
    pub notes: Vec<String>,
}

/// A validated, normalized `{Class, Topics}` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyDocument {
    pub class_name: String,
    pub topics: Vec<TopicEntry>,
}

impl HierarchyDocument {
    /// Create a document with no topics
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            topics: Vec::new(),
        }
    }

    /// Append a topic (builder style)
    pub fn with_topic<I, S>(mut self, title: impl Into<String>, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.push(TopicEntry {
            title: title.into(),
            notes: notes.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Validate and normalize an untyped JSON document.
    ///
    /// Object key order is preserved, so topics keep the order in which they
    /// were submitted. Titles and notes are trimmed.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Validation("Notes must be a JSON object.".into()))?;

        let (Some(class), Some(topics)) = (obj.get("Class"), obj.get("Topics")) else {
            return Err(Error::Validation("Notes must have 'Class' and 'Topics'.".into()));
        };

        let class_name = class
            .as_str()
            .ok_or_else(|| Error::Validation("'Class' must be a string.".into()))?;

        let topics = topics
            .as_object()
            .ok_or_else(|| Error::Validation("'Topics' must be an object.".into()))?;

        let mut doc = HierarchyDocument::new(class_name);
        for (title, items) in topics {
            let items = items
                .as_array()
                .ok_or_else(|| Error::Validation(format!("Topic '{}' must have a list of notes.", title)))?;

            let notes = items
                .iter()
                .map(|n| {
                    n.as_str().map(str::to_string).ok_or_else(|| {
                        Error::Validation(format!("All notes in topic '{}' must be strings.", title))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            doc.topics.push(TopicEntry { title: title.clone(), notes });
        }

        let doc = doc.normalized();
        doc.validate()?;
        Ok(doc)
    }

    /// Check the invariants the writer relies on.
    ///
    /// The class name must not be blank, and topic titles must be unique
    /// within one document: the writer resolves generated topic ids by title.
    pub fn validate(&self) -> Result<()> {
        if self.class_name.trim().is_empty() {
            return Err(Error::Validation("'Class' must be a non-empty string.".into()));
        }

        let mut seen = HashSet::new();
        for topic in &self.topics {
            if !seen.insert(topic.title.as_str()) {
                return Err(Error::Validation(format!(
                    "Duplicate topic title '{}'.",
                    topic.title
                )));
            }
        }
        Ok(())
    }

    /// Trim the class name, every title and every note
    pub fn normalized(self) -> Self {
        let class_name = self.class_name.trim().to_string();

        let topics = self
            .topics
            .into_iter()
            .map(|t| TopicEntry {
                title: t.title.trim().to_string(),
                notes: t.notes.iter().map(|n| n.trim().to_string()).collect(),
            })
            .collect();

        Self { class_name, topics }
    }

    /// Total number of notes across all topics
    pub fn note_count(&self) -> usize {
        self.topics.iter().map(|t| t.notes.len()).sum()
    }

}

/// The optional `raw_text` field sent alongside a document for the audit copy
pub fn raw_text(value: &Value) -> Result<Option<&str>> {
    match value.get("raw_text") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(_) => Err(Error::Validation("'raw_text' must be a string.".into())),
    }
}

impl Serialize for HierarchyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Topics<'a>(&'a [TopicEntry]);

        impl Serialize for Topics<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for topic in self.0 {
                    map.serialize_entry(&topic.title, &topic.notes)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("Class", &self.class_name)?;
        map.serialize_entry("Topics", &Topics(&self.topics))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for HierarchyDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        HierarchyDocument::from_value(&value).map_err(serde::de::Error::custom)
    }
}
