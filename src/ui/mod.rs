pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, muted, section, status, success, topic_block, warn};
pub use progress::Spinner;
pub use table::{class_table, note_table, topic_table};
pub use theme::{theme, Theme};
