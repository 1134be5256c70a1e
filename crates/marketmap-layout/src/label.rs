//! Which text fits on a tile.

use marketmap_core::{LabelPolicy, Quote, Rect};
use serde::Serialize;

/// Text to draw on a tile. `None` means the tile is too small for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLabels {
    /// Possibly truncated name.
    pub name: Option<String>,
    /// Signed percent change, e.g. `+1.80%`.
    pub change: Option<String>,
    /// Name font size.
    pub font_size: f64,
    /// Change font size.
    pub change_font_size: f64,
}

/// Fit labels for `quote` into `rect`.
#[must_use]
pub fn fit_labels(quote: &Quote, rect: Rect, policy: &LabelPolicy) -> TileLabels {
    let size = rect.size();
    let font_size = rect.short_side().max(0.0) / 6.0;
    TileLabels {
        name: size
            .exceeds(&policy.min_label)
            .then(|| truncate_name(&quote.name, policy)),
        change: size
            .exceeds(&policy.min_change)
            .then(|| format_change(quote.change)),
        font_size,
        change_font_size: font_size * 0.6,
    }
}

/// Shorten names over `max_name_chars` to `truncated_chars` plus `...`.
#[must_use]
pub fn truncate_name(name: &str, policy: &LabelPolicy) -> String {
    if name.chars().count() > policy.max_name_chars {
        let mut short: String = name.chars().take(policy.truncated_chars).collect();
        short.push_str("...");
        short
    } else {
        name.to_string()
    }
}

/// Format a percent change with two decimals and an explicit sign.
#[must_use]
pub fn format_change(change: f64) -> String {
    // Also folds -0.0 into 0.0.
    let change = if change.is_finite() && change != 0.0 {
        change
    } else {
        0.0
    };
    if change >= 0.0 {
        format!("+{change:.2}%")
    } else {
        format!("{change:.2}%")
    }
}
