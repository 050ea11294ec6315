//! Wire records shared by JSON/YAML export and JSON load.
//!
//! Field names are the on-disk contract of exported files and must not change:
//!
//! ```json
//! [{"ID": "1", "filename": "", "title": "Genesis", "title_eng": "Genesis",
//!   "short_name": "Gen",
//!   "chapters": [{"ID": "1", "title": "", "verses": [{"ID": "1", "text": "..."}]}]}]
//! ```
//!
//! Ids are written as strings. On load, numbers and `null` are accepted too.

use crate::model::{Book, Chapter, Verse};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "ID", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title_eng: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_name: String,
    pub chapters: Vec<ChapterRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    #[serde(rename = "ID", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    pub verses: Vec<VerseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseRecord {
    #[serde(rename = "ID", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
}

impl From<&Verse> for VerseRecord {
    fn from(verse: &Verse) -> Self {
        Self {
            id: verse.id().to_string(),
            text: verse.text().to_string(),
        }
    }
}

impl From<&Chapter> for ChapterRecord {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id().to_string(),
            title: chapter.title().to_string(),
            verses: chapter.verses().map(VerseRecord::from).collect(),
        }
    }
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id().to_string(),
            filename: book.filename().to_string(),
            title: book.title().to_string(),
            title_eng: book.english_title().to_string(),
            short_name: book.short_name().to_string(),
            chapters: book.chapters().map(ChapterRecord::from).collect(),
        }
    }
}

/// Accept a string, a number, or `null` (as empty) for a text field.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(n)) => n.to_string(),
        None => String::new(),
    })
}
