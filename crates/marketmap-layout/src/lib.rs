#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
//! Squarified treemap layout for market heat maps.
//!
//! The engine ([`compute_layout`], [`TreemapLayoutEngine`]) is a pure
//! function of `(items, width, height)`: it partitions the container into
//! one rectangle per positively weighted item, with area proportional to
//! weight and aspect ratios kept close to 1. Degenerate input yields an empty
//! layout rather than an error.
//!
//! Around it:
//!
//! - **Nested layout**: [`compute_nested_layout`] subdivides groups among
//!   their children.
//! - **Drill-down**: [`Drilldown`] tracks which level of the tree is shown.
//! - **Memoization**: [`LayoutCache`] reuses layouts across frames.
//! - **Tiles**: [`Heatmap`] combines all of the above with colors and
//!   labels into renderer-ready [`Tile`]s.

mod cache;
mod drilldown;
mod heatmap;
mod label;
mod nested;
mod squarify;

pub use cache::{CacheKey, LayoutCache};
pub use drilldown::Drilldown;
pub use heatmap::{Heatmap, Tile};
pub use label::{fit_labels, format_change, truncate_name, TileLabels};
pub use nested::{compute_nested_layout, nested_in, nested_with, NestedOptions, NestedRect};
pub use squarify::{compute_layout, layout_in, squarify, worst_ratio, LayoutRect, TreemapLayoutEngine};
