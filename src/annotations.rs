//! Inline editorial notes in verse text.
//!
//! Raw sources embed notes in braces, either attached to the word they gloss
//! (`created{or, made}`) or standing alone (`{note}`). Both functions here are
//! plain string transforms.

use regex::Regex;
use std::sync::LazyLock;

static NOTE_WITH_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<word>[^\s{}]*)\{(?P<comment>[^}]*)\}").expect("valid note regex")
});

static NOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}").expect("valid note regex"));

/// A note attached to a word, e.g. `created{cmt1}` → `("created", "cmt1")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub word: String,
    pub comment: String,
}

impl Annotation {
    pub fn new(word: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            comment: comment.into(),
        }
    }
}

/// Remove every `{...}` span, leaving surrounding text (and whitespace) as is.
pub fn strip_annotations(text: &str) -> String {
    NOTE.replace_all(text, "").into_owned()
}

/// Notes attached to a word, in order. Bare `{...}` notes are skipped.
pub fn extract_annotations(text: &str) -> Vec<Annotation> {
    NOTE_WITH_WORD
        .captures_iter(text)
        .filter(|caps| !caps["word"].is_empty())
        .map(|caps| Annotation::new(&caps["word"], &caps["comment"]))
        .collect()
}
