//! Rebuild a [`Collection`] from exported JSON.

use crate::model::{Book, Chapter, Collection, CollisionPolicy, ModelError, Verse};
use crate::types::{BookRecord, ChapterRecord};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Build a collection from a parsed JSON array of book records.
///
/// Every book must carry a `chapters` list and every chapter a `verses` list.
pub fn load_from_json(
    data: &serde_json::Value,
    policy: CollisionPolicy,
) -> Result<Collection, LoadError> {
    let books = data
        .as_array()
        .ok_or_else(|| LoadError::MalformedInput("expected a JSON array of books".into()))?;

    let mut collection = Collection::with_policy(policy);
    for (index, value) in books.iter().enumerate() {
        require_key(value, "chapters", || format!("book #{index}"))?;
        if let Some(chapters) = value.get("chapters").and_then(|c| c.as_array()) {
            for (c, chapter) in chapters.iter().enumerate() {
                require_key(chapter, "verses", || format!("book #{index} chapter #{c}"))?;
            }
        }
        let record = BookRecord::deserialize(value)
            .map_err(|e| LoadError::MalformedInput(format!("book #{index}: {e}")))?;
        collection.add_book(book_from_record(record, policy)?)?;
    }

    let summary = collection.summary();
    tracing::info!(
        books = summary.books,
        chapters = summary.chapters,
        verses = summary.verses,
        "loaded collection from JSON"
    );
    Ok(collection)
}

/// Read and load a JSON file written by the JSON export.
pub fn load_from_json_file(
    path: &Path,
    policy: CollisionPolicy,
) -> Result<Collection, LoadError> {
    let content = fs::read_to_string(path)?;
    let data: serde_json::Value = serde_json::from_str(&content)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(load_from_json(&data, policy)?.with_name(name))
}

fn require_key(
    value: &serde_json::Value,
    key: &str,
    context: impl FnOnce() -> String,
) -> Result<(), LoadError> {
    if value.get(key).is_none() {
        return Err(LoadError::MalformedInput(format!(
            "{} is missing required key `{key}`",
            context()
        )));
    }
    Ok(())
}

fn book_from_record(record: BookRecord, policy: CollisionPolicy) -> Result<Book, LoadError> {
    let mut book = Book::new(&record.id, record.short_name)?
        .with_title(record.title)
        .with_english_title(record.title_eng)
        .with_filename(record.filename);
    book.set_policy(policy);
    for chapter in record.chapters {
        let chapter = chapter_from_record(chapter, book.short_name(), policy)?;
        book.add_chapter(chapter)?;
    }
    Ok(book)
}

fn chapter_from_record(
    record: ChapterRecord,
    book_key: &str,
    policy: CollisionPolicy,
) -> Result<Chapter, LoadError> {
    let mut chapter = Chapter::new(record.id.clone()).with_title(record.title);
    chapter.set_policy(policy.verses);
    for verse in record.verses {
        chapter.add_verse(Verse::new(verse.id, verse.text, &record.id, book_key))?;
    }
    Ok(chapter)
}

impl Collection {
    /// Load with the default collision policy.
    pub fn load_from_json(data: &serde_json::Value) -> Result<Self, LoadError> {
        load_from_json(data, CollisionPolicy::default())
    }

    /// Load a JSON file with the default collision policy.
    pub fn load_from_json_file(path: &Path) -> Result<Self, LoadError> {
        load_from_json_file(path, CollisionPolicy::default())
    }
}
