//! # versebook
//!
//! An in-memory scripture collection: books made of chapters made of verses,
//! each addressable by key, with a parser for raw edition tables and
//! JSON/YAML/plain-text export.
//!
//! # Data Flow
//!
//! ```text
//! verses.csv ┐
//! books.csv  ├─ parse ──► Collection ── export ──► collection.json / .yaml / .txt
//! abbrevs.csv┘               ▲
//!                            └──── load ◄── collection.json
//! ```
//!
//! Parsing and loading produce the same [`model::Collection`]; exporting it
//! as JSON and loading the result back yields an equal hierarchy.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | `Collection` → `Book` → `Chapter` → `Verse`, ordered keyed containers, lookups |
//! | [`bookmap`] | Local book names ↔ canonical ids and short names |
//! | [`annotations`] | Strip or extract inline `{...}` translator notes |
//! | [`source`] | Delimited raw tables: verses, books, abbreviations, genres |
//! | [`parse`] | Raw tables → `Collection` |
//! | [`header`] | Line-oriented header and verse formats |
//! | [`types`] | Serialized wire records shared by export and load |
//! | [`export`] | Pluggable encoders: JSON, YAML (feature `yaml`), plain text |
//! | [`load`] | Exported JSON → `Collection` |
//! | [`config`] | `versebook.toml` loading, merging, and validation |
//! | [`query`] | Interactive reader commands |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Insertion Order Is Reading Order
//!
//! Every level keeps children in the order they were first added, alongside a
//! key index. Export, iteration, and display all follow that order, so a
//! collection parsed from a table round-trips in table order.
//!
//! ## Duplicate Keys Are a Policy
//!
//! What happens when a key is inserted twice is set per level in
//! [`model::CollisionPolicy`]. The defaults reject duplicate books and
//! chapters and let a later verse replace an earlier one in place.
//!
//! ## Optional Encoders
//!
//! Export formats are registered at runtime in an [`export::ExportRegistry`].
//! A build without the `yaml` feature simply has no YAML encoder; asking for
//! YAML logs an error and returns a typed failure instead of panicking.

pub mod annotations;
pub mod bookmap;
pub mod config;
pub mod export;
pub mod header;
pub mod load;
pub mod model;
pub mod output;
pub mod parse;
pub mod query;
pub mod source;
pub mod types;

pub use model::{Book, Chapter, Collection, Verse};

#[cfg(test)]
pub(crate) mod test_helpers;
