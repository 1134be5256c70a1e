//! Error types for loading datasets and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or validating a dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax or shape error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML syntax or shape error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// File extension is neither JSON nor YAML.
    #[error("Unsupported file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// An item has an empty identifier.
    #[error("Item with empty id (name: {name:?})")]
    EmptyId {
        /// Name of the offending item.
        name: String,
    },

    /// Two items share an identifier.
    #[error("Duplicate item id: {0}")]
    DuplicateId(String),

    /// An item's value is negative or not finite.
    #[error("Invalid value for '{id}': {value}")]
    InvalidValue {
        /// Item id.
        id: String,
        /// Offending value.
        value: f64,
    },
}

/// Errors raised while reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (or JSON, which is valid YAML) parse error.
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field holds a value outside its domain.
    #[error("Invalid value for '{field}': {message}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
