//! Build a [`Collection`] from raw edition tables.
//!
//! ```text
//! abbreviations ──► BookMap
//! books ──────────► Book shells, keyed by canonical short name (table order)
//! verses ─────────► chapters created on first sight, verses appended in file order
//! ```
//!
//! Verse text is stored with inline `{...}` notes stripped.

use crate::annotations::strip_annotations;
use crate::bookmap::BookMap;
use crate::config::Config;
use crate::model::{Book, Collection, CollisionPolicy, ModelError, Verse};
use crate::source::{self, AbbreviationRow, BookRow, SourceError, VerseRow};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("An abbreviation table is required to assign book short names")]
    MissingAbbreviationTable,
    #[error("No canonical short name for book id {0}")]
    UnmappedBook(String),
    #[error("Source file not found: {0}")]
    SourceMissing(PathBuf),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Assemble a collection from verse, book, and abbreviation rows.
///
/// Pure: the result depends only on the inputs. Fails without an
/// abbreviation table, for a book id with no canonical short name, and for a
/// verse whose book id is not in the books table.
pub fn parse_source<'a>(
    verses: impl IntoIterator<Item = &'a VerseRow>,
    books: impl IntoIterator<Item = &'a BookRow>,
    abbreviations: Option<&[AbbreviationRow]>,
    policy: CollisionPolicy,
) -> Result<Collection, ParseError> {
    let abbreviations = abbreviations.ok_or(ParseError::MissingAbbreviationTable)?;
    let book_map = BookMap::new(abbreviations);

    let mut collection = Collection::with_policy(policy);
    for row in books {
        let book_id = crate::model::normalize_book_id(&row.id)?;
        let short_name = book_map
            .standard_name_for(&book_id)
            .or_else(|| book_map.standard_name_for(&row.id))
            .ok_or_else(|| ParseError::UnmappedBook(row.id.clone()))?;
        let book = Book::new(&book_id, short_name)?
            .with_title(&row.title)
            .with_english_title(&row.title);
        collection.add_book(book)?;
    }

    for row in verses {
        let book = collection.book_by_id_mut(&row.book_id)?;
        let book_key = book.short_name().to_string();
        let chapter = book.chapter_or_insert(&row.chapter_id);
        chapter.add_verse(Verse::new(
            &row.verse_id,
            strip_annotations(&row.text),
            &row.chapter_id,
            book_key,
        ))?;
    }

    let summary = collection.summary();
    tracing::info!(
        books = summary.books,
        chapters = summary.chapters,
        verses = summary.verses,
        "parsed collection"
    );
    Ok(collection)
}

/// Read the raw tables from disk and parse them.
///
/// The verses and books files must exist. Without an abbreviations file the
/// parse fails with [`ParseError::MissingAbbreviationTable`].
pub fn parse_files(
    verses_path: &Path,
    books_path: &Path,
    abbreviations_path: Option<&Path>,
    config: &Config,
) -> Result<Collection, ParseError> {
    for path in [verses_path, books_path] {
        if !path.is_file() {
            return Err(ParseError::SourceMissing(path.to_path_buf()));
        }
    }
    let abbreviations = match abbreviations_path {
        Some(path) if !path.is_file() => {
            return Err(ParseError::SourceMissing(path.to_path_buf()));
        }
        Some(path) => Some(source::read_abbreviations(path, &config.source)?),
        None => None,
    };
    let verses = source::read_verses(verses_path, &config.source)?;
    let books = source::read_books(books_path, &config.source)?;

    let name = verses_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(parse_source(&verses, &books, abbreviations.as_deref(), config.keys)?.with_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KeyPolicy;
    use crate::test_helpers::{
        abbreviation_rows, book_rows, setup_fixtures, verse_row, verse_rows,
    };

    fn parse(verses: &[VerseRow]) -> Result<Collection, ParseError> {
        parse_source(
            verses,
            &book_rows(),
            Some(abbreviation_rows().as_slice()),
            CollisionPolicy::default(),
        )
    }

    #[test]
    fn one_book_per_books_row_in_table_order() {
        let collection = parse(&verse_rows()).unwrap();
        assert_eq!(collection.len(), book_rows().len());
        assert_eq!(collection.keys(), vec!["Gen", "Exod", "Dt"]);
    }

    #[test]
    fn every_verse_row_becomes_a_verse() {
        let rows = verse_rows();
        let collection = parse(&rows).unwrap();
        assert_eq!(collection.summary().verses, rows.len());
    }

    #[test]
    fn chapters_created_lazily_in_first_seen_order() {
        let collection = parse(&verse_rows()).unwrap();
        let genesis = collection.book("Gen").unwrap();
        let ids: Vec<&str> = genesis.chapters().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(genesis.chapter(1).unwrap().verse_count(), 2);
        assert_eq!(genesis.chapter(1).unwrap().book_id(), Some("1"));
    }

    #[test]
    fn books_without_verses_are_empty() {
        let collection = parse(&verse_rows()).unwrap();
        assert_eq!(collection.book("Dt").unwrap().chapter_count(), 0);
    }

    #[test]
    fn annotations_stripped_from_text() {
        let rows = vec![verse_row("1", "1", "1", "God created{or, made} the {note}heavens")];
        let collection = parse(&rows).unwrap();
        assert_eq!(
            collection.verse("Gen", 1, 1).unwrap().text(),
            "God created the heavens"
        );
    }

    #[test]
    fn string_and_numeric_lookups_agree() {
        let collection = parse(&verse_rows()).unwrap();
        assert_eq!(
            collection.verse("Gen", "1", "1").unwrap(),
            collection.verse("Gen", 1, 1).unwrap()
        );
        assert_eq!(collection.verse("Gen", 1, 1).unwrap().book_key(), "Gen");
    }

    #[test]
    fn missing_abbreviation_table_is_an_error() {
        let result = parse_source(
            &verse_rows(),
            &book_rows(),
            None,
            CollisionPolicy::default(),
        );
        assert!(matches!(result, Err(ParseError::MissingAbbreviationTable)));
    }

    #[test]
    fn unmapped_book_is_an_error() {
        let mut books = book_rows();
        books.push(BookRow {
            id: "40".into(),
            title: "Matthew".into(),
            column_info: String::new(),
            genre_id: String::new(),
        });
        let result = parse_source(
            &verse_rows(),
            &books,
            Some(abbreviation_rows().as_slice()),
            CollisionPolicy::default(),
        );
        assert!(matches!(result, Err(ParseError::UnmappedBook(id)) if id == "40"));
    }

    #[test]
    fn verse_for_unknown_book_is_not_found() {
        let rows = vec![verse_row("66", "1", "1", "Amen")];
        let result = parse(&rows);
        assert!(matches!(
            result,
            Err(ParseError::Model(ModelError::NotFound { kind: "book", .. }))
        ));
    }

    #[test]
    fn duplicate_verse_policy_applies() {
        let rows = vec![
            verse_row("1", "1", "1", "first"),
            verse_row("1", "1", "1", "second"),
        ];
        let collection = parse(&rows).unwrap();
        assert_eq!(collection.verse("Gen", 1, 1).unwrap().text(), "second");
        assert_eq!(collection.summary().verses, 1);

        let strict = CollisionPolicy {
            verses: KeyPolicy::Reject,
            ..CollisionPolicy::default()
        };
        let result = parse_source(&rows, &book_rows(), Some(abbreviation_rows().as_slice()), strict);
        assert!(matches!(
            result,
            Err(ParseError::Model(ModelError::DuplicateKey { .. }))
        ));
    }

    #[test]
    fn parse_is_repeatable() {
        let a = parse(&verse_rows()).unwrap();
        let b = parse(&verse_rows()).unwrap();
        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.keys(), b.keys());
    }

    // =========================================================================
    // File-level parsing
    // =========================================================================

    #[test]
    fn parse_fixture_files() {
        let tmp = setup_fixtures();
        let dir = tmp.path();
        let collection = parse_files(
            &dir.join("verses.csv"),
            &dir.join("books.csv"),
            Some(&dir.join("abbreviations.csv")),
            &Config::default(),
        )
        .unwrap();

        assert_eq!(collection.name(), Some("verses"));
        assert_eq!(collection.keys(), vec!["Gen", "Exod"]);
        assert_eq!(collection.summary().verses, 6);
        assert_eq!(
            collection.verse("Gen", 1, 1).unwrap().text(),
            "In the beginning, God created the heavens and the earth."
        );
    }

    #[test]
    fn parse_files_requires_existing_inputs() {
        let tmp = setup_fixtures();
        let dir = tmp.path();
        let result = parse_files(
            &dir.join("missing.csv"),
            &dir.join("books.csv"),
            Some(&dir.join("abbreviations.csv")),
            &Config::default(),
        );
        assert!(matches!(result, Err(ParseError::SourceMissing(_))));
    }

    #[test]
    fn parse_files_without_abbreviations() {
        let tmp = setup_fixtures();
        let dir = tmp.path();
        let result = parse_files(
            &dir.join("verses.csv"),
            &dir.join("books.csv"),
            None,
            &Config::default(),
        );
        assert!(matches!(result, Err(ParseError::MissingAbbreviationTable)));
    }
}
