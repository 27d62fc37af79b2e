//! Hierarchy persistence - writing and reading `class -> topics -> notes`

pub mod models;
pub mod writer;
pub mod reader;

pub use models::{ClassHierarchy, ClassRow, NoteRow, TopicNotes, TopicRow};
pub use writer::HierarchyWriter;
pub use reader::HierarchyReader;
