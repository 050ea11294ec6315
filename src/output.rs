//! CLI output formatting.
//!
//! Each view has a `format_*` function returning `Vec<String>` for
//! testability and, where the CLI needs it, a `print_*` wrapper that writes to
//! stdout. Format functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Summary
//!
//! ```text
//! Available books: 66
//! Available chaps: 1189
//! Available verses: 31102
//! ```
//!
//! ## Book table
//!
//! ```text
//! 001 Gen   Genesis (50 chapters, 1533 verses)
//! 002 Exod  Exodus (40 chapters, 1213 verses)
//! ```

use crate::model::{Collection, Passage, Summary};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

pub fn format_summary(summary: &Summary) -> Vec<String> {
    summary.to_string().lines().map(String::from).collect()
}

pub fn print_summary(summary: &Summary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

/// One line per book: index, short name, title, and counts.
pub fn format_book_table(collection: &Collection) -> Vec<String> {
    let width = collection
        .iter()
        .map(|b| b.short_name().chars().count())
        .max()
        .unwrap_or(0);
    collection
        .iter()
        .enumerate()
        .map(|(i, book)| {
            format!(
                "{} {:<width$}  {} ({} chapters, {} verses)",
                format_index(i + 1),
                book.short_name(),
                book.title(),
                book.chapter_count(),
                book.verse_count(),
            )
        })
        .collect()
}

pub fn print_book_table(collection: &Collection) {
    for line in format_book_table(collection) {
        println!("{}", line);
    }
}

/// All short names on a single line.
pub fn format_book_keys(collection: &Collection) -> String {
    collection.keys().join(" ")
}

/// A looked-up passage. Books and chapters list their children.
pub fn format_passage(passage: &Passage<'_>) -> Vec<String> {
    match passage {
        Passage::Verse(verse) => vec![verse.to_string()],
        Passage::Chapter(chapter) => chapter.verses().map(|v| v.to_string()).collect(),
        Passage::Book(book) => {
            let mut lines = vec![book.to_string()];
            lines.extend(book.chapters().map(|c| {
                format!("    chapter {} ({} verses)", c.id(), c.verse_count())
            }));
            lines
        }
    }
}

pub fn format_help() -> Vec<String> {
    vec![
        "Available commands:".to_string(),
        "   + help: Display this help".to_string(),
        "   + books : List available books".to_string(),
        "   + <book> [chapter [verse]] : Show a passage, e.g. Gen 1 1".to_string(),
        "   + quit or exit: Quit bible reader".to_string(),
    ]
}
