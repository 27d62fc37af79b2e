use tabled::{settings::Style, Table, Tabled};
use crate::notes::{ClassRow, NoteRow, TopicRow};

#[derive(Tabled)]
struct ClassLine {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Class")]
    name: String,
}

#[derive(Tabled)]
struct TopicLine {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "#")]
    ord: i64,
    #[tabled(rename = "Topic")]
    title: String,
}

#[derive(Tabled)]
struct NoteLine {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "#")]
    ord: i64,
    #[tabled(rename = "Note")]
    content: String,
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn class_table(classes: &[ClassRow]) -> String {
    render(
        classes
            .iter()
            .map(|c| ClassLine { id: c.id, name: c.name.clone() })
            .collect(),
    )
}

pub fn topic_table(topics: &[TopicRow]) -> String {
    render(
        topics
            .iter()
            .map(|t| TopicLine { id: t.id, ord: t.ord, title: t.title.clone() })
            .collect(),
    )
}

pub fn note_table(notes: &[NoteRow]) -> String {
    render(
        notes
            .iter()
            .map(|n| NoteLine { id: n.id, ord: n.ord, content: n.content.clone() })
            .collect(),
    )
}
