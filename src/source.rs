//! Tabular source readers.
//!
//! Raw editions ship as delimited text tables:
//!
//! | Table | Columns |
//! |---|---|
//! | verses | `id, bookID, chapID, verseID, text` |
//! | books | `id, title, col, genreID` |
//! | abbreviations | `id, text, bookID, is_standard` |
//! | genres | `id, genre` |
//!
//! Reading is done with the `csv` crate: fields may be wrapped in double
//! quotes (a doubled `""` is a literal quote), so verse text can contain the
//! delimiter and line breaks. Empty lines are skipped, and the first record is
//! skipped when the source has a header row.

use crate::config::SourceConfig;
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(char),
    #[error("Line {line}: missing field `{field}`")]
    MissingField { line: u64, field: &'static str },
}

/// One record of a delimited table.
#[derive(Debug, Clone)]
pub struct Record {
    /// 1-based line on which the record starts.
    pub line: u64,
    pub fields: StringRecord,
}

impl Record {
    fn field(&self, index: usize, name: &'static str) -> Result<&str, SourceError> {
        self.raw_field(index, name).map(str::trim)
    }

    /// Like [`Record::field`] but without trimming; used for verse text.
    fn raw_field(&self, index: usize, name: &'static str) -> Result<&str, SourceError> {
        self.fields.get(index).ok_or(SourceError::MissingField {
            line: self.line,
            field: name,
        })
    }
}

/// Read delimited content into records.
///
/// Rows may have differing field counts; missing columns are reported by the
/// typed row conversions.
pub fn read_records(content: &str, config: &SourceConfig) -> Result<Vec<Record>, SourceError> {
    if !config.delimiter.is_ascii() {
        return Err(SourceError::InvalidDelimiter(config.delimiter));
    }
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter as u8)
        .has_headers(config.has_header)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .map(|result| -> Result<Record, SourceError> {
            let fields = result?;
            let line = fields.position().map_or(0, |pos| pos.line());
            Ok(Record { line, fields })
        })
        .collect()
}

// ============================================================================
// Typed rows
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct VerseRow {
    pub id: String,
    pub book_id: String,
    pub chapter_id: String,
    pub verse_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookRow {
    pub id: String,
    pub title: String,
    pub column_info: String,
    pub genre_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbbreviationRow {
    pub id: String,
    pub local_name: String,
    pub book_id: String,
    /// Whether this abbreviation is the canonical short name for its book.
    pub is_standard: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreRow {
    pub id: String,
    pub genre: String,
}

impl TryFrom<&Record> for VerseRow {
    type Error = SourceError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.field(0, "id")?.to_string(),
            book_id: record.field(1, "bookID")?.to_string(),
            chapter_id: record.field(2, "chapID")?.to_string(),
            verse_id: record.field(3, "verseID")?.to_string(),
            text: record.raw_field(4, "text")?.to_string(),
        })
    }
}

impl TryFrom<&Record> for BookRow {
    type Error = SourceError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.field(0, "id")?.to_string(),
            title: record.field(1, "title")?.to_string(),
            column_info: record.field(2, "col").unwrap_or_default().to_string(),
            genre_id: record.field(3, "genreID").unwrap_or_default().to_string(),
        })
    }
}

impl TryFrom<&Record> for AbbreviationRow {
    type Error = SourceError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let flag = record.field(3, "is_standard")?;
        Ok(Self {
            id: record.field(0, "id")?.to_string(),
            local_name: record.field(1, "text")?.to_string(),
            book_id: record.field(2, "bookID")?.to_string(),
            is_standard: flag == "1" || flag.eq_ignore_ascii_case("true"),
        })
    }
}

impl TryFrom<&Record> for GenreRow {
    type Error = SourceError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.field(0, "id")?.to_string(),
            genre: record.field(1, "genre")?.to_string(),
        })
    }
}

/// Convert every record of `content` into typed rows, failing on the first bad one.
pub fn parse_rows<T>(content: &str, config: &SourceConfig) -> Result<Vec<T>, SourceError>
where
    T: for<'r> TryFrom<&'r Record, Error = SourceError>,
{
    read_records(content, config)?
        .iter()
        .map(T::try_from)
        .collect()
}

fn read_table<T>(path: &Path, config: &SourceConfig) -> Result<Vec<T>, SourceError>
where
    T: for<'r> TryFrom<&'r Record, Error = SourceError>,
{
    let content = fs::read_to_string(path)?;
    let rows = parse_rows(&content, config)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "read table");
    Ok(rows)
}

pub fn read_verses(path: &Path, config: &SourceConfig) -> Result<Vec<VerseRow>, SourceError> {
    read_table(path, config)
}

pub fn read_books(path: &Path, config: &SourceConfig) -> Result<Vec<BookRow>, SourceError> {
    read_table(path, config)
}

pub fn read_abbreviations(
    path: &Path,
    config: &SourceConfig,
) -> Result<Vec<AbbreviationRow>, SourceError> {
    read_table(path, config)
}

pub fn read_genres(path: &Path, config: &SourceConfig) -> Result<Vec<GenreRow>, SourceError> {
    read_table(path, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn csv() -> SourceConfig {
        SourceConfig::default()
    }

    fn no_header() -> SourceConfig {
        SourceConfig {
            has_header: false,
            ..SourceConfig::default()
        }
    }

    fn fields(record: &Record) -> Vec<&str> {
        record.fields.iter().collect()
    }

    #[test]
    fn quoted_field_with_delimiter() {
        let records = read_records("1,\"In the beginning, God\",x\n", &no_header()).unwrap();
        assert_eq!(fields(&records[0]), vec!["1", "In the beginning, God", "x"]);
    }

    #[test]
    fn doubled_quote_is_literal() {
        let records =
            read_records("\"He said \"\"Let there be light\"\"\",2\n", &no_header()).unwrap();
        assert_eq!(
            fields(&records[0]),
            vec![r#"He said "Let there be light""#, "2"]
        );
    }

    #[test]
    fn empty_fields_kept() {
        let records = read_records("a,,b,\n", &no_header()).unwrap();
        assert_eq!(fields(&records[0]), vec!["a", "", "b", ""]);
    }

    #[test]
    fn tab_delimited() {
        let config = SourceConfig {
            delimiter: '\t',
            has_header: false,
        };
        let records = read_records("1\tGen\t1\n", &config).unwrap();
        assert_eq!(fields(&records[0]), vec!["1", "Gen", "1"]);
    }

    #[test]
    fn non_ascii_delimiter_rejected() {
        let config = SourceConfig {
            delimiter: '§',
            has_header: false,
        };
        assert!(matches!(
            read_records("a§b\n", &config),
            Err(SourceError::InvalidDelimiter('§'))
        ));
    }

    #[test]
    fn quoted_verse_text_may_span_lines() {
        let content = "id,bookID,chapID,verseID,text\n\
                       1001001,1,1,1,\"In the beginning,\nGod created\"\n\
                       1001002,1,1,2,The earth was formless.\n";
        let rows: Vec<VerseRow> = parse_rows(content, &csv()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "In the beginning,\nGod created");
        assert_eq!(rows[1].verse_id, "2");
    }

    #[test]
    fn read_records_skips_header_and_blank_lines() {
        let content = "id,title\n1,Genesis\n\n2,Exodus\r\n";
        let records = read_records(content, &csv()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(fields(&records[1]), vec!["2", "Exodus"]);
    }

    #[test]
    fn read_records_without_header() {
        let records = read_records("1,Genesis\n", &no_header()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 1);
    }

    #[test]
    fn verse_row_from_record() {
        let rows: Vec<VerseRow> =
            parse_rows("id,b,c,v,t\n1001001,1,1,1,\"In the beginning, God\"\n", &csv()).unwrap();
        assert_eq!(
            rows,
            vec![VerseRow {
                id: "1001001".into(),
                book_id: "1".into(),
                chapter_id: "1".into(),
                verse_id: "1".into(),
                text: "In the beginning, God".into(),
            }]
        );
    }

    #[test]
    fn missing_field_reports_line() {
        let result: Result<Vec<VerseRow>, _> = parse_rows("h\n1,1,1\n", &csv());
        assert!(matches!(
            result,
            Err(SourceError::MissingField {
                line: 2,
                field: "verseID"
            })
        ));
    }

    #[test]
    fn book_row_optional_columns() {
        let rows: Vec<BookRow> = parse_rows("h\n1,Genesis\n", &csv()).unwrap();
        assert_eq!(rows[0].title, "Genesis");
        assert_eq!(rows[0].genre_id, "");
    }

    #[test]
    fn abbreviation_flag_parsing() {
        let rows: Vec<AbbreviationRow> =
            parse_rows("h\n1,Gen,1,1\n2,Ge,1,0\n3,Exod,2,true\n", &csv()).unwrap();
        let flags: Vec<bool> = rows.iter().map(|r| r.is_standard).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn read_files_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("genres.csv");
        fs::write(&path, "id,genre\n1,Law\n2,History\n").unwrap();

        let genres = read_genres(&path, &csv()).unwrap();
        assert_eq!(
            genres,
            vec![
                GenreRow {
                    id: "1".into(),
                    genre: "Law".into()
                },
                GenreRow {
                    id: "2".into(),
                    genre: "History".into()
                },
            ]
        );
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = read_books(&tmp.path().join("nope.csv"), &csv());
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
