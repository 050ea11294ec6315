//! Shared test utilities for the versebook test suite.
//!
//! Provides in-memory source rows, a small ready-made collection, fixture
//! setup, and extractors for comparing collections.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let collection = parse_source(&verse_rows(), &book_rows(), Some(&abbreviation_rows()), policy)?;
//! assert_eq!(chapter_ids(collection.book("Gen")?), vec!["1", "2"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::model::{Book, Chapter, Collection, Verse};
use crate::source::{AbbreviationRow, BookRow, VerseRow};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/web/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/web");
    for entry in std::fs::read_dir(&fixtures).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
    }
    tmp
}

// =========================================================================
// Source rows
// =========================================================================

pub fn verse_row(book_id: &str, chapter_id: &str, verse_id: &str, text: &str) -> VerseRow {
    VerseRow {
        id: format!("{book_id:0>2}{chapter_id:0>3}{verse_id:0>3}"),
        book_id: book_id.to_string(),
        chapter_id: chapter_id.to_string(),
        verse_id: verse_id.to_string(),
        text: text.to_string(),
    }
}

/// Genesis 1:1, 1:2, 2:1 and Exodus 1:1.
pub fn verse_rows() -> Vec<VerseRow> {
    vec![
        verse_row("1", "1", "1", "In the beginning{or, At first} God created the heavens and the earth."),
        verse_row("1", "1", "2", "The earth was formless and empty."),
        verse_row("1", "2", "1", "Thus the heavens and the earth were finished."),
        verse_row("2", "1", "1", "Now these are the names of the sons of Israel."),
    ]
}

fn book_row(id: &str, title: &str) -> BookRow {
    BookRow {
        id: id.to_string(),
        title: title.to_string(),
        column_info: "OT".to_string(),
        genre_id: "1".to_string(),
    }
}

/// Genesis (1), Exodus (2), Deuteronomy (5).
pub fn book_rows() -> Vec<BookRow> {
    vec![
        book_row("1", "Genesis"),
        book_row("2", "Exodus"),
        book_row("5", "Deuteronomy"),
    ]
}

fn abbreviation(id: &str, local_name: &str, book_id: &str, is_standard: bool) -> AbbreviationRow {
    AbbreviationRow {
        id: id.to_string(),
        local_name: local_name.to_string(),
        book_id: book_id.to_string(),
        is_standard,
    }
}

/// Canonical names: 1 → Gen, 2 → Exod, 5 → Dt. `Deu` is a local name for 5.
pub fn abbreviation_rows() -> Vec<AbbreviationRow> {
    vec![
        abbreviation("1", "Gen", "1", true),
        abbreviation("2", "Ge", "1", false),
        abbreviation("3", "Exod", "2", true),
        abbreviation("4", "Ex", "2", false),
        abbreviation("5", "Dt", "5", true),
        abbreviation("6", "Deu", "5", false),
    ]
}

// =========================================================================
// Ready-made collection
// =========================================================================

/// Genesis (chapters 1 and 2) and Exodus (chapter 1), four verses in total.
pub fn sample_collection() -> Collection {
    let mut collection = Collection::new();
    for (id, short_name, title) in [("1", "Gen", "Genesis"), ("2", "Exod", "Exodus")] {
        let book = Book::new(id, short_name)
            .unwrap()
            .with_title(title)
            .with_english_title(title);
        collection.add_book(book).unwrap();
    }
    for row in verse_rows() {
        let book = collection.book_by_id_mut(&row.book_id).unwrap();
        let key = book.short_name().to_string();
        book.chapter_or_insert(&row.chapter_id)
            .add_verse(Verse::new(
                row.verse_id,
                crate::annotations::strip_annotations(&row.text),
                row.chapter_id.clone(),
                key,
            ))
            .unwrap();
    }
    collection
}

// =========================================================================
// Extractors
// =========================================================================

/// Chapter ids of a book in reading order.
pub fn chapter_ids(book: &Book) -> Vec<&str> {
    book.chapters().map(Chapter::id).collect()
}

/// Every verse text of a book in reading order.
pub fn verse_texts(book: &Book) -> Vec<&str> {
    book.chapters()
        .flat_map(Chapter::verses)
        .map(Verse::text)
        .collect()
}
