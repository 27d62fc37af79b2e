pub struct Icons;

impl Icons {
    pub const BOOK: &str = "📚";
    pub const TOPIC: &str = "📌";
    pub const NOTE: &str = "📝";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
}
