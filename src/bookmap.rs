//! Translation between a source's local book abbreviations and canonical
//! short names.
//!
//! The map is built once from an abbreviation table, where each row ties a
//! local abbreviation to a standard book id and flags whether that row is the
//! canonical name for the book:
//!
//! ```text
//! id  text  bookID  is_standard
//! 1   Gen   1       1
//! 2   Ge    1       0
//! 3   Deut  5       1
//! ```
//!
//! Canonical names are resolved in two tiers. A small fixed table covers the
//! legacy abbreviations whose canonical form cannot be reached through the
//! table (`Deu` → `Deut`); everything else chases abbreviation → book id →
//! canonical row.

use crate::source::AbbreviationRow;
use std::collections::HashMap;

/// Legacy abbreviations whose canonical form is not reachable by a table chase.
const NAME_OVERRIDES: &[(&str, &str)] = &[
    ("Deu", "Deut"),
    ("Ruth", "Rth"),
    ("1Sm", "1 Sam"),
    ("2Sm", "2 Sam"),
    ("Est", "Esth"),
    ("Eccl", "Eccles"),
    ("SSol", "Song"),
    ("Jonah", "Jnh"),
    ("Nahum", "Nah"),
    ("Mat", "Matt"),
    ("Mark", "Mrk"),
    ("Luke", "Luk"),
    ("Phi", "Phil"),
    ("Phmn", "Philem"),
];

#[derive(Debug, Clone, Default)]
pub struct BookMap {
    name_to_id: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl BookMap {
    /// Build the map from abbreviation rows. Later rows win on repeated keys.
    pub fn new<'a>(rows: impl IntoIterator<Item = &'a AbbreviationRow>) -> Self {
        let mut name_to_id = HashMap::new();
        let mut id_to_name = HashMap::new();
        for row in rows {
            name_to_id.insert(row.local_name.clone(), row.book_id.clone());
            if row.is_standard {
                id_to_name.insert(row.book_id.clone(), row.local_name.clone());
            }
        }
        let overrides = NAME_OVERRIDES
            .iter()
            .map(|(local, standard)| (local.to_string(), standard.to_string()))
            .collect();

        tracing::debug!(
            abbreviations = name_to_id.len(),
            canonical = id_to_name.len(),
            "built book map"
        );
        Self {
            name_to_id,
            id_to_name,
            overrides,
        }
    }

    /// Standard book id for a local abbreviation.
    pub fn standard_id_for(&self, local: &str) -> Option<&str> {
        self.name_to_id.get(local).map(String::as_str)
    }

    /// Canonical short name for a standard book id.
    pub fn standard_name_for(&self, book_id: &str) -> Option<&str> {
        self.id_to_name.get(book_id).map(String::as_str)
    }

    /// Resolve a local abbreviation to its canonical short name.
    pub fn normalize_name(&self, local: &str) -> Option<&str> {
        if let Some(name) = self.overrides.get(local) {
            return Some(name.as_str());
        }
        self.standard_id_for(local)
            .and_then(|id| self.standard_name_for(id))
    }

    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_id.is_empty()
    }
}
