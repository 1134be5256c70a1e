//! Core types for the marketmap heat map.
//!
//! This crate provides the foundational types used by the layout engine:
//! - Geometric primitives: [`Size`], [`Rect`]
//! - Color representation: [`Color`] and the change-to-color [`HeatScale`]
//! - The item model: [`Item`] (leaf or group) carrying a [`Quote`]
//! - Loading: [`Dataset`] files and [`HeatmapConfig`]

mod color;
mod config;
mod dataset;
mod error;
mod geometry;
mod heat;
mod item;

pub use color::{Color, ColorParseError};
pub use config::{HeatmapConfig, LabelPolicy};
pub use dataset::{Dataset, DatasetSummary, ViewKind};
pub use error::{ConfigError, DataError};
pub use geometry::{Rect, Size};
pub use heat::{ColorScheme, HeatScale, MIN_ALPHA};
pub use item::{Item, Quote};
