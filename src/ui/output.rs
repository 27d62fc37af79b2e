use crate::notes::NoteRow;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::BOOK, text.style(theme().class_heading.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().label.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().saved.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("{} {}", Icons::TOPIC, title.style(theme().topic.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().hint.clone()).to_string()
}

/// Topic heading followed by its notes as a bulleted list
pub fn topic_block(title: &str, notes: &[NoteRow]) {
    println!("{} {}", Icons::TOPIC, title.style(theme().topic.clone()));
    if notes.is_empty() {
        println!("   {}", muted("(no notes)"));
    }
    for note in notes {
        println!("   • {}", note.content);
    }
}
