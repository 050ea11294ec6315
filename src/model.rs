//! Text collection data model.
//!
//! A [`Collection`] is a build-once, read-many tree:
//!
//! ```text
//! Collection ── Book (short name + numeric id)
//!                └── Chapter (id)
//!                     └── Verse (id, text)
//! ```
//!
//! Every level keeps its children in insertion (reading) order and indexes
//! them by key. Containers are append-only; nothing is ever removed.
//!
//! ## Keys
//!
//! Chapter and verse ids are strings. Lookups accept anything that implements
//! `Display`, so `book.chapter(1)` and `book.chapter("1")` resolve to the same
//! entry. Book ids must be integer-valued and are normalised on construction
//! (`"01"` becomes `"1"`).
//!
//! ## Back-references
//!
//! A chapter does not hold a pointer to its book. When a chapter is attached
//! with [`Book::add_chapter`] it records the owning book's id, and
//! [`Collection::book_of`] resolves that id through the collection index.
//!
//! ## Key collisions
//!
//! What happens when a key is inserted twice is governed by a
//! [`CollisionPolicy`], one [`KeyPolicy`] per level. Defaults reject duplicate
//! books and chapters and overwrite duplicate verses in place.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Duplicate {kind} key: {key}")]
    DuplicateKey { kind: &'static str, key: String },
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// What to do when a key that already exists is inserted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyPolicy {
    /// Fail with [`ModelError::DuplicateKey`].
    #[default]
    Reject,
    /// Replace the existing entry, keeping its position.
    Overwrite,
    /// Ignore the newcomer.
    KeepFirst,
}

/// Key collision policy for each level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionPolicy {
    pub books: KeyPolicy,
    pub chapters: KeyPolicy,
    pub verses: KeyPolicy,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            books: KeyPolicy::Reject,
            chapters: KeyPolicy::Reject,
            verses: KeyPolicy::Overwrite,
        }
    }
}

/// Normalise a book id to its integer form.
///
/// Leading zeros and surrounding whitespace are dropped. Anything that is not
/// a non-negative integer is rejected.
pub fn normalize_book_id(id: &str) -> Result<String, ModelError> {
    id.trim()
        .parse::<u64>()
        .map(|n| n.to_string())
        .map_err(|_| ModelError::InvalidArgument(format!("book id must be an integer: {id:?}")))
}

// ============================================================================
// Ordered keyed storage
// ============================================================================

/// Insertion-ordered items with a key → position index.
#[derive(Debug, Clone)]
struct Ordered<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Ordered<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Ordered<T> {
    /// Insert under `key` according to `policy`, returning the item's position.
    fn insert(
        &mut self,
        key: String,
        item: T,
        policy: KeyPolicy,
        kind: &'static str,
    ) -> Result<usize, ModelError> {
        match self.index.get(&key).copied() {
            None => {
                let pos = self.items.len();
                self.items.push(item);
                self.index.insert(key, pos);
                Ok(pos)
            }
            Some(pos) => match policy {
                KeyPolicy::Reject => Err(ModelError::DuplicateKey { kind, key }),
                KeyPolicy::Overwrite => {
                    tracing::warn!(kind, key = %key, "overwriting duplicate key");
                    self.items[pos] = item;
                    Ok(pos)
                }
                KeyPolicy::KeepFirst => {
                    tracing::debug!(kind, key = %key, "keeping first entry for duplicate key");
                    Ok(pos)
                }
            },
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.position(key).map(|pos| &self.items[pos])
    }
}

// ============================================================================
// Verse
// ============================================================================

/// A single verse. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    id: String,
    text: String,
    chapter_id: String,
    book_key: String,
}

impl Verse {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        chapter_id: impl Into<String>,
        book_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            chapter_id: chapter_id.into(),
            book_key: book_key.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    /// Short name of the book this verse belongs to.
    pub fn book_key(&self) -> &str {
        &self.book_key
    }
}

impl fmt::Display for Verse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} {}:{}] {}",
            self.book_key, self.chapter_id, self.id, self.text
        )
    }
}

// ============================================================================
// Chapter
// ============================================================================

#[derive(Debug, Clone)]
pub struct Chapter {
    id: String,
    title: String,
    book_id: Option<String>,
    verses: Ordered<Verse>,
    policy: KeyPolicy,
}

impl Chapter {
    /// Create an empty chapter. Duplicate verse ids overwrite by default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            book_id: None,
            verses: Ordered::default(),
            policy: CollisionPolicy::default().verses,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Chapter title; empty when the source has none.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Id of the owning book, set when the chapter is attached to one.
    pub fn book_id(&self) -> Option<&str> {
        self.book_id.as_deref()
    }

    /// Append a verse, indexed by its id.
    ///
    /// On a duplicate id the chapter's verse policy applies. Under the default
    /// (`Overwrite`) the earlier verse is replaced in place, not appended.
    pub fn add_verse(&mut self, verse: Verse) -> Result<(), ModelError> {
        let key = verse.id.clone();
        self.verses.insert(key, verse, self.policy, "verse")?;
        Ok(())
    }

    pub fn verse(&self, id: impl fmt::Display) -> Result<&Verse, ModelError> {
        let key = id.to_string();
        self.verses.get(&key).ok_or(ModelError::NotFound {
            kind: "verse",
            key,
        })
    }

    pub fn contains(&self, id: impl fmt::Display) -> bool {
        self.verses.position(&id.to_string()).is_some()
    }

    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.verses.items.iter()
    }

    pub fn verse_count(&self) -> usize {
        self.verses.items.len()
    }

    pub fn set_policy(&mut self, policy: KeyPolicy) {
        self.policy = policy;
    }
}

/// `chapter <id>`. Use [`Collection::book_of`] for the owning book's title.
impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chapter {}", self.id)
    }
}

// ============================================================================
// Book
// ============================================================================

#[derive(Debug, Clone)]
pub struct Book {
    id: String,
    title: String,
    english_title: String,
    short_name: String,
    filename: String,
    chapters: Ordered<Chapter>,
    policy: CollisionPolicy,
}

impl Book {
    /// Create an empty book. Fails if `id` is not integer-valued.
    pub fn new(id: &str, short_name: impl Into<String>) -> Result<Self, ModelError> {
        Ok(Self {
            id: normalize_book_id(id)?,
            title: String::new(),
            english_title: String::new(),
            short_name: short_name.into(),
            filename: String::new(),
            chapters: Ordered::default(),
            policy: CollisionPolicy::default(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_english_title(mut self, english_title: impl Into<String>) -> Self {
        self.english_title = english_title.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = short_name.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The id as an integer. Always succeeds for a constructed book.
    pub fn number(&self) -> u64 {
        self.id.parse().unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn english_title(&self) -> &str {
        &self.english_title
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Source file stem or legacy book name, when known.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Attach a chapter, recording this book as its owner.
    ///
    /// Duplicate chapter ids are rejected unless the book's chapter policy
    /// says otherwise.
    pub fn add_chapter(&mut self, mut chapter: Chapter) -> Result<&mut Chapter, ModelError> {
        chapter.book_id = Some(self.id.clone());
        chapter.set_policy(self.policy.verses);
        let key = chapter.id.clone();
        let pos = self
            .chapters
            .insert(key, chapter, self.policy.chapters, "chapter")?;
        Ok(&mut self.chapters.items[pos])
    }

    /// Return the chapter with `id`, creating and attaching an empty one if
    /// it does not exist yet.
    pub fn chapter_or_insert(&mut self, id: &str) -> &mut Chapter {
        let pos = match self.chapters.position(id) {
            Some(pos) => pos,
            None => {
                tracing::debug!(book = %self.short_name, chapter = id, "creating chapter");
                let mut chapter = Chapter::new(id);
                chapter.book_id = Some(self.id.clone());
                chapter.set_policy(self.policy.verses);
                self.chapters.items.push(chapter);
                let pos = self.chapters.items.len() - 1;
                self.chapters.index.insert(id.to_string(), pos);
                pos
            }
        };
        &mut self.chapters.items[pos]
    }

    pub fn chapter(&self, id: impl fmt::Display) -> Result<&Chapter, ModelError> {
        let key = id.to_string();
        self.chapters.get(&key).ok_or(ModelError::NotFound {
            kind: "chapter",
            key,
        })
    }

    pub fn contains(&self, id: impl fmt::Display) -> bool {
        self.chapters.position(&id.to_string()).is_some()
    }

    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.items.iter()
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.items.len()
    }

    pub fn verse_count(&self) -> usize {
        self.chapters().map(Chapter::verse_count).sum()
    }

    /// Apply a collision policy to this book and the chapters it already holds.
    pub fn set_policy(&mut self, policy: CollisionPolicy) {
        self.policy = policy;
        for chapter in &mut self.chapters.items {
            chapter.set_policy(policy.verses);
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)
    }
}

// ============================================================================
// Coordinates and lookups
// ============================================================================

/// A `(book, chapter?, verse?)` reference such as `Gen 1 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Coordinates {
    pub book: String,
    pub chapter: Option<String>,
    pub verse: Option<String>,
}

impl Coordinates {
    pub fn book(book: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            chapter: None,
            verse: None,
        }
    }

    pub fn chapter(book: impl Into<String>, chapter: impl fmt::Display) -> Self {
        Self {
            book: book.into(),
            chapter: Some(chapter.to_string()),
            verse: None,
        }
    }

    pub fn verse(
        book: impl Into<String>,
        chapter: impl fmt::Display,
        verse: impl fmt::Display,
    ) -> Self {
        Self {
            book: book.into(),
            chapter: Some(chapter.to_string()),
            verse: Some(verse.to_string()),
        }
    }
}

impl FromStr for Coordinates {
    type Err = ModelError;

    /// Parse whitespace-separated `book [chapter [verse]]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [book] => Ok(Self::book(*book)),
            [book, chapter] => Ok(Self::chapter(*book, chapter)),
            [book, chapter, verse] => Ok(Self::verse(*book, chapter, verse)),
            [] => Err(ModelError::InvalidArgument("book key cannot be empty".into())),
            _ => Err(ModelError::InvalidArgument(format!(
                "expected `book [chapter [verse]]`, got {s:?}"
            ))),
        }
    }
}

/// Result of a hierarchical lookup.
#[derive(Debug, Clone, Copy)]
pub enum Passage<'a> {
    Book(&'a Book),
    Chapter(&'a Chapter),
    Verse(&'a Verse),
}

impl fmt::Display for Passage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Passage::Book(book) => book.fmt(f),
            Passage::Chapter(chapter) => chapter.fmt(f),
            Passage::Verse(verse) => verse.fmt(f),
        }
    }
}

/// Book, chapter, and verse totals for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Available books: {}", self.books)?;
        writeln!(f, "Available chaps: {}", self.chapters)?;
        write!(f, "Available verses: {}", self.verses)
    }
}

// ============================================================================
// Collection
// ============================================================================

/// An ordered set of books indexed by short name and by id.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    name: Option<String>,
    books: Vec<Book>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
    policy: CollisionPolicy,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Append a book, indexing it under both its short name and its id.
    ///
    /// A collision on either key is resolved by the book policy. A book whose
    /// short name and id collide with two *different* existing books is always
    /// rejected, since no single entry could be replaced or kept.
    pub fn add_book(&mut self, mut book: Book) -> Result<&mut Book, ModelError> {
        book.set_policy(self.policy);
        let by_name = self.by_name.get(book.short_name()).copied();
        let by_id = self.by_id.get(book.id()).copied();

        let existing = match (by_name, by_id) {
            (None, None) => None,
            (Some(a), Some(b)) if a != b => {
                return Err(ModelError::DuplicateKey {
                    kind: "book",
                    key: format!("{} (id {})", book.short_name(), book.id()),
                });
            }
            (Some(pos), _) | (None, Some(pos)) => Some(pos),
        };

        let pos = match existing {
            None => {
                let pos = self.books.len();
                self.by_name.insert(book.short_name().to_string(), pos);
                self.by_id.insert(book.id().to_string(), pos);
                self.books.push(book);
                pos
            }
            Some(pos) => match self.policy.books {
                KeyPolicy::Reject => {
                    let key = if by_name.is_some() {
                        book.short_name().to_string()
                    } else {
                        book.id().to_string()
                    };
                    return Err(ModelError::DuplicateKey { kind: "book", key });
                }
                KeyPolicy::KeepFirst => pos,
                KeyPolicy::Overwrite => {
                    tracing::warn!(book = %book.short_name(), id = %book.id(), "overwriting duplicate book");
                    let old = std::mem::replace(&mut self.books[pos], book);
                    self.by_name.remove(old.short_name());
                    self.by_id.remove(old.id());
                    self.by_name
                        .insert(self.books[pos].short_name().to_string(), pos);
                    self.by_id.insert(self.books[pos].id().to_string(), pos);
                    pos
                }
            },
        };
        Ok(&mut self.books[pos])
    }

    pub fn book(&self, short_name: &str) -> Result<&Book, ModelError> {
        self.by_name
            .get(short_name)
            .map(|&pos| &self.books[pos])
            .ok_or_else(|| ModelError::NotFound {
                kind: "book",
                key: short_name.to_string(),
            })
    }

    /// Find a book by its numeric id; `"01"`, `"1"` and `1` are equivalent.
    pub fn book_by_id(&self, id: impl fmt::Display) -> Result<&Book, ModelError> {
        let pos = self.position_by_id(&id.to_string())?;
        Ok(&self.books[pos])
    }

    pub(crate) fn book_by_id_mut(&mut self, id: &str) -> Result<&mut Book, ModelError> {
        let pos = self.position_by_id(id)?;
        Ok(&mut self.books[pos])
    }

    fn position_by_id(&self, id: &str) -> Result<usize, ModelError> {
        let key = normalize_book_id(id)?;
        self.by_id
            .get(&key)
            .copied()
            .ok_or(ModelError::NotFound { kind: "book", key })
    }

    /// Resolve a chapter's owner through this collection.
    pub fn book_of(&self, chapter: &Chapter) -> Option<&Book> {
        chapter.book_id().and_then(|id| self.book_by_id(id).ok())
    }

    /// Hierarchical lookup by book short name, then chapter, then verse.
    pub fn lookup(&self, coords: &Coordinates) -> Result<Passage<'_>, ModelError> {
        if coords.book.trim().is_empty() {
            return Err(ModelError::InvalidArgument(
                "book key cannot be empty".into(),
            ));
        }
        let book = self.book(&coords.book)?;
        match (&coords.chapter, &coords.verse) {
            (None, None) => Ok(Passage::Book(book)),
            (Some(chapter), None) => Ok(Passage::Chapter(book.chapter(chapter)?)),
            (Some(chapter), Some(verse)) => Ok(Passage::Verse(book.chapter(chapter)?.verse(verse)?)),
            (None, Some(_)) => Err(ModelError::InvalidArgument(
                "verse given without a chapter".into(),
            )),
        }
    }

    /// Shorthand for a full `(book, chapter, verse)` lookup.
    pub fn verse(
        &self,
        book: &str,
        chapter: impl fmt::Display,
        verse: impl fmt::Display,
    ) -> Result<&Verse, ModelError> {
        self.book(book)?.chapter(chapter)?.verse(verse)
    }

    pub fn contains(&self, short_name: &str) -> bool {
        self.by_name.contains_key(short_name)
    }

    /// All book short names in collection order.
    pub fn keys(&self) -> Vec<&str> {
        self.books.iter().map(Book::short_name).collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            books: self.books.len(),
            chapters: self.books.iter().map(Book::chapter_count).sum(),
            verses: self.books.iter().map(Book::verse_count).sum(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Book;
    type IntoIter = std::slice::Iter<'a, Book>;

    fn into_iter(self) -> Self::IntoIter {
        self.books.iter()
    }
}
