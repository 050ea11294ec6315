//! Line-oriented source formats.
//!
//! Some editions are distributed as plain text where each book starts with a
//! header line and each verse sits on its own line. The [`LineFormat`] trait
//! is the seam for such layouts: the data model never sees the line syntax,
//! and a new layout only needs its own implementation.
//!
//! [`LegacyLineFormat`] understands the one layout in use today:
//!
//! ```text
//! =1 Genesis 創世記 - Genesis
//! =19 Psalms 詩篇 (口語) - Psalms
//! Gen 1:1 Genesis 1:1 はじめに神は天と地とを創造された。
//! ```

use crate::model::{Book, Verse};
use regex::Regex;
use std::sync::LazyLock;

static HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^=(?P<id>\d+) (?P<bookname>\w+) (?P<title>\w+(?: \(\w+\))?) - (?P<title_eng>[\w ]+)",
    )
    .expect("valid header regex")
});

static VERSE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<book_key>\w+) (?P<cid>\d+):(?P<vid>\d+) (?P<bookname>\w+) (?P<cid2>\d+):(?P<vid2>\d+) (?P<text>.*)",
    )
    .expect("valid verse regex")
});

/// Parses the header and verse lines of one plain-text layout.
pub trait LineFormat {
    /// A book shell (no chapters, no short name) from a header line.
    fn parse_header_line(&self, line: &str) -> Option<Book>;

    /// A verse from a verse line.
    fn parse_verse_line(&self, line: &str) -> Option<Verse>;
}

/// `=<id> <bookname> <title>[ (<variant>)] - <english title>` headers and
/// `<key> <c>:<v> <bookname> <c>:<v> <text>` verses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyLineFormat;

impl LineFormat for LegacyLineFormat {
    fn parse_header_line(&self, line: &str) -> Option<Book> {
        let caps = HEADER_LINE.captures(line)?;
        let book = Book::new(&caps["id"], "")
            .ok()?
            .with_filename(&caps["bookname"])
            .with_title(&caps["title"])
            .with_english_title(caps["title_eng"].trim_end());
        Some(book)
    }

    fn parse_verse_line(&self, line: &str) -> Option<Verse> {
        let caps = VERSE_LINE.captures(line)?;
        Some(Verse::new(
            &caps["vid"],
            caps["text"].trim_end(),
            &caps["cid"],
            &caps["book_key"],
        ))
    }
}
