//! # Classnotes - structured notes from course documents
//!
//! Turns an uploaded document into a `Class -> Topics -> Notes` hierarchy and
//! keeps it in a relational store that is only reachable through a REST
//! table API.
//!
//! Classnotes provides:
//! - Text extraction for PDF, DOCX and plain text uploads
//! - LLM-backed restructuring of free text into a hierarchy document
//! - A best-effort, multi-step hierarchy writer over three remote tables
//! - Read projections for classes, topics, notes and full hierarchies
//! - An HTTP front door and a CLI over all of the above

pub mod document;
pub mod store;
pub mod notes;
pub mod extract;
pub mod structuring;
pub mod config;
pub mod server;
pub mod ui;

// Re-exports for convenient access
pub use document::{HierarchyDocument, TopicEntry};
pub use store::{StoreClient, StoreError};
pub use notes::{HierarchyReader, HierarchyWriter, ClassHierarchy};
pub use structuring::{Structurer, OpenAiStructurer};

/// Result type alias for Classnotes operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Classnotes operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed hierarchy document; a client error, never retried.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote table API reported a failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A remote call succeeded but returned something the writer or reader cannot use.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The model answered with text that is not the expected JSON document.
    #[error("Structuring error: {message}")]
    Structuring { message: String, raw: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the failure was caused by the caller's input rather than by a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Extraction(_))
    }
}
