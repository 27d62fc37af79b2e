//! Remote table definitions
//!
//! The store is reached through a REST table API; these are the tables and
//! columns this crate reads and writes. Ids are assigned by the server.
//!
//! - classes(id, name)
//! - topics(id, class_id, title, ord)
//! - notes(id, topic_id, content, ord)
//! - raw_resp(id, class_id, raw_text)

/// Tables the hierarchy is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Classes,
    Topics,
    Notes,
    /// Audit copy of the unstructured input
    RawResp,
}

impl Table {
    /// Get the remote table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Classes => "classes",
            Table::Topics => "topics",
            Table::Notes => "notes",
            Table::RawResp => "raw_resp",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column names shared by the writer, the reader and the transports
pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const CLASS_ID: &str = "class_id";
    pub const TOPIC_ID: &str = "topic_id";
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
    pub const ORD: &str = "ord";
    pub const RAW_TEXT: &str = "raw_text";
}
