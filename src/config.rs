//! Tool configuration.
//!
//! Settings live in an optional `versebook.toml` in the working directory (or
//! the directory given with `--config`). The file is sparse: user values are
//! merged on top of the stock defaults, so it only needs the keys it changes.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [keys]
//! books = "reject"       # reject | overwrite | keep-first
//! chapters = "reject"
//! verses = "overwrite"
//!
//! [source]
//! delimiter = ","        # field separator of raw tables
//! has_header = true      # skip the first line of each table
//!
//! [export]
//! format = "json"        # json | yaml | txt
//! indent = 2             # JSON indentation width
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::export::Format;
use crate::model::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "versebook.toml";

/// Largest accepted JSON indentation width.
const MAX_INDENT: usize = 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Duplicate key handling per hierarchy level.
    pub keys: CollisionPolicy,
    /// Raw table layout.
    pub source: SourceConfig,
    /// Export defaults.
    pub export: ExportConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.delimiter.is_ascii() || matches!(self.source.delimiter, '"' | '\n' | '\r') {
            return Err(ConfigError::Validation(
                "source.delimiter must be an ASCII character other than a quote or line break"
                    .into(),
            ));
        }
        if self.export.indent > MAX_INDENT {
            return Err(ConfigError::Validation(format!(
                "export.indent must be 0-{MAX_INDENT}"
            )));
        }
        if self.export.format.parse::<Format>().is_err() {
            return Err(ConfigError::Validation(format!(
                "export.format must be one of json, yaml, txt (got {:?})",
                self.export.format
            )));
        }
        Ok(())
    }
}

/// Layout of the delimited source tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub delimiter: char,
    pub has_header: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            has_header: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Format used when the CLI is not given `--format`.
    pub format: String,
    pub indent: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            indent: 2,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `versebook.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `versebook.toml` in `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

/// A fully-commented stock `versebook.toml`. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# versebook configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Duplicate keys
# ---------------------------------------------------------------------------
# What happens when a key is inserted twice at each level:
#   "reject"     - fail the parse/load with a duplicate key error
#   "overwrite"  - replace the earlier entry, keeping its position
#   "keep-first" - ignore the later entry
[keys]
books = "reject"
chapters = "reject"
verses = "overwrite"

# ---------------------------------------------------------------------------
# Raw source tables
# ---------------------------------------------------------------------------
[source]
# Field separator, a single ASCII character. Use "\t" for tab-separated tables.
delimiter = ","

# Skip the first line of every table.
has_header = true

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Default output format: "json", "yaml" or "txt".
format = "json"

# JSON indentation width (0 = compact, max 16).
indent = 2
"##
}
