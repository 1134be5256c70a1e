//! Mapping price changes to tile colors.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Palette pair used for gainers and losers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    /// Green for gains, red for losses.
    #[default]
    GreenRed,
    /// Blue for gains, orange for losses (color-blind friendly).
    BlueOrange,
}

impl ColorScheme {
    /// Base color for non-negative changes.
    #[must_use]
    pub fn gain(self) -> Color {
        match self {
            Self::GreenRed => Color::rgb8(34, 197, 94),
            Self::BlueOrange => Color::rgb8(59, 130, 246),
        }
    }

    /// Base color for negative changes.
    #[must_use]
    pub fn loss(self) -> Color {
        match self {
            Self::GreenRed => Color::rgb8(239, 68, 68),
            Self::BlueOrange => Color::rgb8(249, 115, 22),
        }
    }
}

/// Alpha of a tile with no change at all.
pub const MIN_ALPHA: f32 = 0.25;

/// Color scale from percentage change to a translucent gain/loss color.
///
/// Intensity grows linearly with `|change|` and saturates at `saturation`
/// percent; alpha goes from [`MIN_ALPHA`] to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatScale {
    /// Palette.
    #[serde(default)]
    pub scheme: ColorScheme,
    /// Absolute change (percent) at which the color is fully opaque.
    #[serde(default = "default_saturation")]
    pub saturation: f64,
}

fn default_saturation() -> f64 {
    5.0
}

impl Default for HeatScale {
    fn default() -> Self {
        Self::new(ColorScheme::default())
    }
}

impl HeatScale {
    /// Scale with the default 5% saturation.
    #[must_use]
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            saturation: default_saturation(),
        }
    }

    /// Set the saturation point.
    #[must_use]
    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation = saturation;
        self
    }

    /// Intensity in [0, 1] for a change.
    #[must_use]
    pub fn intensity(&self, change: f64) -> f64 {
        if !change.is_finite() {
            return 0.0;
        }
        if self.saturation <= 0.0 || !self.saturation.is_finite() {
            return if change == 0.0 { 0.0 } else { 1.0 };
        }
        (change.abs() / self.saturation).min(1.0)
    }

    /// Color for a percentage change.
    #[must_use]
    pub fn color(&self, change: f64) -> Color {
        let change = if change.is_finite() { change } else { 0.0 };
        let base = if change >= 0.0 {
            self.scheme.gain()
        } else {
            self.scheme.loss()
        };
        let alpha = MIN_ALPHA + self.intensity(change) as f32 * (1.0 - MIN_ALPHA);
        base.with_alpha(alpha)
    }
}
