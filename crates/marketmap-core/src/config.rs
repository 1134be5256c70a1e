//! Heat map configuration loaded from YAML (or JSON).

use crate::error::ConfigError;
use crate::geometry::Size;
use crate::heat::{ColorScheme, HeatScale};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds for showing text on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPolicy {
    /// A tile must be strictly larger than this to show its name.
    pub min_label: Size,
    /// A tile must be strictly larger than this to show its change.
    pub min_change: Size,
    /// Names longer than this many characters are truncated.
    pub max_name_chars: usize,
    /// Characters kept before the ellipsis when truncating.
    pub truncated_chars: usize,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            min_label: Size::new(40.0, 30.0),
            min_change: Size::new(30.0, 20.0),
            max_name_chars: 10,
            truncated_chars: 8,
        }
    }
}

/// Heat map configuration.
///
/// Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Container width.
    pub width: f64,
    /// Container height.
    pub height: f64,
    /// Color palette.
    pub scheme: ColorScheme,
    /// Absolute percent change at which colors are fully opaque.
    pub saturation: f64,
    /// Levels of children drawn below the visible level (0 = flat).
    pub max_depth: usize,
    /// Inset applied inside a group before laying out its children.
    pub padding: f64,
    /// Band reserved at the top of a group for its title.
    pub header: f64,
    /// Label thresholds.
    pub labels: LabelPolicy,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            scheme: ColorScheme::GreenRed,
            saturation: 5.0,
            max_depth: 0,
            padding: 0.0,
            header: 0.0,
            labels: LabelPolicy::default(),
        }
    }
}

impl HeatmapConfig {
    /// Parse a configuration from YAML (JSON is accepted as YAML).
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid or a field is out of range.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure, parse failure or invalid fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Container size.
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Color scale built from `scheme` and `saturation`.
    #[must_use]
    pub fn heat_scale(&self) -> HeatScale {
        HeatScale::new(self.scheme).with_saturation(self.saturation)
    }

    /// Check field domains.
    ///
    /// # Errors
    ///
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |field: &'static str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidField {
                    field,
                    message: format!("must be a positive number, got {v}"),
                })
            }
        };
        let non_negative = |field: &'static str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidField {
                    field,
                    message: format!("must be zero or positive, got {v}"),
                })
            }
        };
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("saturation", self.saturation)?;
        non_negative("padding", self.padding)?;
        non_negative("header", self.header)?;
        if self.labels.truncated_chars > self.labels.max_name_chars {
            return Err(ConfigError::InvalidField {
                field: "labels.truncated_chars",
                message: format!(
                    "must not exceed max_name_chars ({})",
                    self.labels.max_name_chars
                ),
            });
        }
        Ok(())
    }
}
