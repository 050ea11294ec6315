//! Collection export.
//!
//! Each output format is produced by an [`Encoder`]. Encoders are registered
//! in an [`ExportRegistry`] when the program starts, so whether a format is
//! available is a property of the registry rather than something checked
//! while exporting:
//!
//! | Format | Token | Encoder | Output |
//! |---|---|---|---|
//! | JSON | `json` | [`JsonEncoder`] | array of book records, see [`crate::types`] |
//! | YAML | `yaml` | `YamlEncoder` (`yaml` feature) | same shape, block style |
//! | Text | `txt` | [`TextEncoder`] | one verse text per line |
//!
//! An encoder renders the whole collection into memory before anything is
//! written, so a failed export leaves the sink untouched.

use crate::model::Collection;
use crate::types::BookRecord;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Format {0} is not supported")]
    UnsupportedFormat(String),
    #[error("No {0} encoder is available in this build")]
    FeatureUnavailable(Format),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "yaml")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Yaml,
    Text,
}

impl Format {
    pub fn token(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Text => "txt",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Format {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "txt" | "text" | "plaintext" => Ok(Format::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Renders a collection into one output format.
pub trait Encoder: Send + Sync {
    fn format(&self) -> Format;

    fn encode(&self, collection: &Collection) -> Result<Vec<u8>, ExportError>;
}

fn records(collection: &Collection) -> Vec<BookRecord> {
    collection.iter().map(BookRecord::from).collect()
}

/// JSON array of book records. Non-ASCII text is written as-is.
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    /// Spaces per nesting level; `0` writes compact JSON.
    pub indent: usize,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl Encoder for JsonEncoder {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode(&self, collection: &Collection) -> Result<Vec<u8>, ExportError> {
        let books = records(collection);
        if self.indent == 0 {
            return Ok(serde_json::to_vec(&books)?);
        }
        let indent = vec![b' '; self.indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(&books, &mut ser)?;
        Ok(buf)
    }
}

/// Block-style YAML with the same shape as the JSON export.
#[cfg(feature = "yaml")]
#[derive(Debug, Clone, Default)]
pub struct YamlEncoder;

#[cfg(feature = "yaml")]
impl Encoder for YamlEncoder {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn encode(&self, collection: &Collection) -> Result<Vec<u8>, ExportError> {
        Ok(serde_yaml::to_string(&records(collection))?.into_bytes())
    }
}

/// Verse texts only, one per line, in book → chapter → verse order.
#[derive(Debug, Clone, Default)]
pub struct TextEncoder;

impl Encoder for TextEncoder {
    fn format(&self) -> Format {
        Format::Text
    }

    fn encode(&self, collection: &Collection) -> Result<Vec<u8>, ExportError> {
        let mut out = String::new();
        for verse in collection
            .iter()
            .flat_map(|book| book.chapters())
            .flat_map(|chapter| chapter.verses())
        {
            out.push_str(verse.text());
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

/// The set of encoders available to this program.
#[derive(Default)]
pub struct ExportRegistry {
    encoders: HashMap<Format, Box<dyn Encoder>>,
}

impl ExportRegistry {
    /// A registry with no encoders.
    pub fn empty() -> Self {
        Self::default()
    }

    /// JSON and text, plus YAML when built with the `yaml` feature.
    pub fn with_defaults(json_indent: usize) -> Self {
        let mut registry = Self::empty();
        registry.register(JsonEncoder {
            indent: json_indent,
        });
        registry.register(TextEncoder);
        #[cfg(feature = "yaml")]
        registry.register(YamlEncoder);
        registry
    }

    /// Add or replace the encoder for its format.
    pub fn register(&mut self, encoder: impl Encoder + 'static) {
        self.encoders.insert(encoder.format(), Box::new(encoder));
    }

    pub fn supports(&self, format: Format) -> bool {
        self.encoders.contains_key(&format)
    }

    /// Write `collection` to `sink` in `format`.
    ///
    /// A format without a registered encoder is logged and reported as
    /// [`ExportError::FeatureUnavailable`]; nothing is written.
    pub fn export(
        &self,
        collection: &Collection,
        sink: &mut impl Write,
        format: Format,
    ) -> Result<(), ExportError> {
        let Some(encoder) = self.encoders.get(&format) else {
            tracing::error!(%format, "no encoder registered, export skipped");
            return Err(ExportError::FeatureUnavailable(format));
        };
        let bytes = encoder.encode(collection)?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        tracing::info!(%format, bytes = bytes.len(), books = collection.len(), "exported collection");
        Ok(())
    }
}

impl Collection {
    /// Export with the default encoders. `format` is a token such as `"json"`.
    pub fn export(&self, sink: &mut impl Write, format: &str) -> Result<(), ExportError> {
        let format: Format = format.parse()?;
        ExportRegistry::with_defaults(JsonEncoder::default().indent).export(self, sink, format)
    }
}
