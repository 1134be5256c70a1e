//! Dataset files: a named list of items for one heat map view.

use crate::error::DataError;
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Which heat map a dataset feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    /// Sectors with their constituents as children.
    #[default]
    Sectors,
    /// Positions held, weighted by position value.
    Portfolio,
    /// Watched symbols, weighted by price.
    Watchlist,
}

/// A loaded set of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset name.
    #[serde(default)]
    pub name: String,
    /// View kind.
    #[serde(default)]
    pub view: ViewKind,
    /// Top-level items.
    pub items: Vec<Item>,
}

/// Files may hold a full dataset or just the item array.
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetFile {
    Full(Dataset),
    Bare(Vec<Item>),
}

impl From<DatasetFile> for Dataset {
    fn from(file: DatasetFile) -> Self {
        match file {
            DatasetFile::Full(dataset) => dataset,
            DatasetFile::Bare(items) => Self {
                items,
                ..Self::default()
            },
        }
    }
}

/// Counts and totals over a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    /// Top-level item count.
    pub top_level: usize,
    /// Items in the whole tree.
    pub total_items: usize,
    /// Items with children.
    pub groups: usize,
    /// Sum of top-level values.
    pub total_value: f64,
    /// Top-level items with a non-negative change.
    pub gainers: usize,
    /// Top-level items with a negative change.
    pub losers: usize,
    /// Items with zero weight (not drawn).
    pub zero_weight: usize,
}

impl Dataset {
    /// Create a dataset from items.
    #[must_use]
    pub fn new(name: &str, view: ViewKind, items: Vec<Item>) -> Self {
        Self {
            name: name.to_string(),
            view,
            items,
        }
    }

    /// Parse from a JSON string (dataset object or bare array).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or fails validation.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let file: DatasetFile = serde_json::from_str(json)?;
        let dataset = Self::from(file);
        dataset.validate()?;
        Ok(dataset)
    }

    /// Parse from a YAML string (dataset mapping or bare sequence).
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self, DataError> {
        let file: DatasetFile = serde_yaml_ng::from_str(yaml)?;
        let dataset = Self::from(file);
        dataset.validate()?;
        Ok(dataset)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure, unknown extension, parse failure or
    /// validation failure.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, DataError> = match ext.as_deref() {
            Some("json") => Self::from_json,
            Some("yaml" | "yml") => Self::from_yaml,
            _ => return Err(DataError::UnsupportedFormat(path.to_path_buf())),
        };
        let content = std::fs::read_to_string(path)?;
        let mut dataset = parse(&content)?;
        if dataset.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                dataset.name = stem.to_string();
            }
        }
        debug!(
            path = %path.display(),
            items = dataset.items.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check ids are non-empty and unique and values are finite and
    /// non-negative, across the whole tree.
    ///
    /// # Errors
    ///
    /// Returns the first violation found (depth-first, input order).
    pub fn validate(&self) -> Result<(), DataError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&Item> = self.items.iter().rev().collect();
        while let Some(item) = stack.pop() {
            let quote = item.quote();
            if quote.id.is_empty() {
                return Err(DataError::EmptyId {
                    name: quote.name.clone(),
                });
            }
            if !seen.insert(quote.id.as_str()) {
                return Err(DataError::DuplicateId(quote.id.clone()));
            }
            if !quote.value.is_finite() || quote.value < 0.0 {
                return Err(DataError::InvalidValue {
                    id: quote.id.clone(),
                    value: quote.value,
                });
            }
            stack.extend(item.children().iter().rev());
        }
        Ok(())
    }

    /// Summarize the dataset.
    #[must_use]
    pub fn summary(&self) -> DatasetSummary {
        let mut summary = DatasetSummary {
            top_level: self.items.len(),
            ..DatasetSummary::default()
        };
        for item in &self.items {
            summary.total_value += item.value();
            if item.change() >= 0.0 {
                summary.gainers += 1;
            } else {
                summary.losers += 1;
            }
        }
        let mut stack: Vec<&Item> = self.items.iter().collect();
        while let Some(item) = stack.pop() {
            summary.total_items += 1;
            if item.is_group() {
                summary.groups += 1;
            }
            if !item.is_weighted() {
                summary.zero_weight += 1;
            }
            stack.extend(item.children());
        }
        summary
    }
}
