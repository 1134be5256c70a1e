//! Heat map: dataset + configuration + drill-down focus + cached layout.

use crate::cache::LayoutCache;
use crate::drilldown::Drilldown;
use crate::label::{fit_labels, TileLabels};
use crate::nested::{nested_with, NestedOptions};
use marketmap_core::{Color, Dataset, HeatmapConfig, Rect, Size};
use serde::Serialize;
use tracing::debug;

/// Everything a renderer needs to draw one rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// Item id.
    pub id: String,
    /// Item name.
    pub name: String,
    /// Ticker symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Position and size.
    pub rect: Rect,
    /// 0 for items of the visible level.
    pub depth: usize,
    /// Item weight.
    pub value: f64,
    /// Percent change.
    pub change: f64,
    /// Absolute change.
    pub change_amount: f64,
    /// Fraction of the container covered by this tile.
    pub area_share: f64,
    /// Whether the tile can be drilled into.
    pub is_group: bool,
    /// Fill color.
    pub color: Color,
    /// Fill color as CSS.
    pub fill: String,
    /// Text that fits on the tile.
    pub labels: TileLabels,
}

/// A heat map over one dataset.
#[derive(Debug)]
pub struct Heatmap {
    dataset: Dataset,
    config: HeatmapConfig,
    drill: Drilldown,
    cache: LayoutCache,
}

impl Heatmap {
    /// Create a heat map focused on the root level.
    #[must_use]
    pub fn new(dataset: Dataset, config: HeatmapConfig) -> Self {
        Self {
            dataset,
            config,
            drill: Drilldown::new(),
            cache: LayoutCache::new(),
        }
    }

    /// The dataset.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    /// The drill-down focus.
    #[must_use]
    pub const fn drilldown(&self) -> &Drilldown {
        &self.drill
    }

    /// Layout cache statistics and state.
    #[must_use]
    pub const fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    /// Replace the data, keeping as much of the focus path as still exists.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.drill.truncate_to_valid(&self.dataset.items);
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: HeatmapConfig) {
        self.config = config;
    }

    /// Change the container size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
    }

    /// Drill into a visible group. Returns `false` if `id` cannot be entered.
    pub fn enter(&mut self, id: &str) -> bool {
        self.drill.enter(&self.dataset.items, id)
    }

    /// Go up one level.
    pub fn back(&mut self) -> bool {
        self.drill.back()
    }

    /// Return to the root level.
    pub fn reset(&mut self) {
        self.drill.reset();
    }

    /// Heading for the current level, e.g. `Market > Technology`.
    #[must_use]
    pub fn title(&self) -> String {
        let root = if self.dataset.name.is_empty() {
            "Market"
        } else {
            self.dataset.name.as_str()
        };
        std::iter::once(root)
            .chain(self.drill.breadcrumbs(&self.dataset.items))
            .collect::<Vec<_>>()
            .join(" > ")
    }

    /// Lay out the visible level and return one tile per rectangle.
    ///
    /// Each call counts as one frame for cache eviction. An empty result
    /// means there is nothing to draw; show a "no data" placeholder.
    pub fn tiles(&mut self) -> Vec<Tile> {
        let Self {
            dataset,
            config,
            drill,
            cache,
        } = self;

        let visible = drill.visible(&dataset.items);
        let bounds = Rect::from_size(Size::new(config.width, config.height));
        let container_area = bounds.area();
        let options = NestedOptions {
            max_depth: config.max_depth,
            padding: config.padding,
            header: config.header,
        };
        let scale = config.heat_scale();

        let tiles: Vec<Tile> = nested_with(visible, bounds, &options, |level, area| {
            cache.layout(level, area)
        })
        .into_iter()
        .map(|placed| {
            let quote = placed.item.quote();
            let color = scale.color(quote.change);
            Tile {
                id: quote.id.clone(),
                name: quote.name.clone(),
                symbol: quote.symbol.clone(),
                rect: placed.rect,
                depth: placed.depth,
                value: quote.value,
                change: quote.change,
                change_amount: quote.change_amount,
                area_share: placed.rect.area() / container_area,
                is_group: placed.item.is_group(),
                color,
                fill: color.to_css(),
                labels: fit_labels(quote, placed.rect, &config.labels),
            }
        })
        .collect();

        cache.advance_frame();
        debug!(
            tiles = tiles.len(),
            focus = drill.path().len(),
            hits = cache.hits(),
            misses = cache.misses(),
            "heat map frame"
        );
        tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketmap_core::{ColorScheme, Item, Quote, ViewKind};

    fn dataset() -> Dataset {
        Dataset::new(
            "S&P",
            ViewKind::Sectors,
            vec![
                Item::group(
                    Quote::new("technology", 15.0)
                        .with_name("Technology")
                        .with_change(2.5, 0.375),
                    vec![
                        Item::Leaf(Quote::new("AAPL", 3.0).with_name("Apple").with_change(1.8, 0.054)),
                        Item::Leaf(Quote::new("MSFT", 2.8).with_name("Microsoft").with_change(2.1, 0.058)),
                    ],
                ),
                Item::group(
                    Quote::new("utilities", 1.5)
                        .with_name("Utilities")
                        .with_change(-1.2, -0.018),
                    vec![Item::leaf("NEE", 0.4)],
                ),
            ],
        )
    }

    #[test]
    fn test_root_tiles() {
        let mut map = Heatmap::new(dataset(), HeatmapConfig::default());
        let tiles = map.tiles();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].id, "technology");
        assert!(tiles[0].is_group);
        let share: f64 = tiles.iter().map(|t| t.area_share).sum();
        assert!((share - 1.0).abs() < 1e-9);
        assert_eq!(tiles[0].labels.name.as_deref(), Some("Technology"));
        assert_eq!(tiles[1].labels.change.as_deref(), Some("-1.20%"));
        assert_eq!(tiles[1].color.to_hex(), "#ef4444");
        assert!(tiles[1].fill.starts_with("rgba(239, 68, 68,"));
    }

    #[test]
    fn test_drill_into_sector() {
        let mut map = Heatmap::new(dataset(), HeatmapConfig::default());
        assert!(map.enter("technology"));
        assert_eq!(map.title(), "S&P > Technology");
        let tiles = map.tiles();
        let ids: Vec<&str> = tiles.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["AAPL", "MSFT"]);
        assert!(!map.enter("AAPL"));
        assert!(map.back());
        assert_eq!(map.title(), "S&P");
    }

    #[test]
    fn test_nested_tiles() {
        let config = HeatmapConfig {
            max_depth: 1,
            ..HeatmapConfig::default()
        };
        let mut map = Heatmap::new(dataset(), config);
        let tiles = map.tiles();
        assert_eq!(tiles.len(), 5);
        assert_eq!(tiles.iter().filter(|t| t.depth == 1).count(), 3);
    }

    #[test]
    fn test_repeated_frames_hit_cache() {
        let mut map = Heatmap::new(dataset(), HeatmapConfig::default());
        let first = map.tiles();
        let second = map.tiles();
        assert_eq!(first, second);
        assert_eq!(map.cache().misses(), 1);
        assert_eq!(map.cache().hits(), 1);
    }

    #[test]
    fn test_resize_and_scheme() {
        let mut map = Heatmap::new(dataset(), HeatmapConfig::default());
        map.resize(200.0, 100.0);
        map.set_config(HeatmapConfig {
            scheme: ColorScheme::BlueOrange,
            ..map.config().clone()
        });
        let tiles = map.tiles();
        let right = tiles.iter().map(|t| t.rect.right()).fold(0.0, f64::max);
        assert!((right - 200.0).abs() < 1e-9);
        assert_eq!(tiles[0].color.to_hex(), "#3b82f6");
    }

    #[test]
    fn test_refresh_keeps_valid_focus() {
        let mut map = Heatmap::new(dataset(), HeatmapConfig::default());
        map.enter("utilities");
        map.set_dataset(dataset());
        assert_eq!(map.drilldown().path(), ["utilities".to_string()]);
        map.set_dataset(Dataset::new("S&P", ViewKind::Sectors, vec![Item::leaf("cash", 1.0)]));
        assert!(map.drilldown().is_root());
        map.reset();
        assert_eq!(map.tiles().len(), 1);
    }

    #[test]
    fn test_empty_dataset_has_no_tiles() {
        let mut map = Heatmap::new(Dataset::default(), HeatmapConfig::default());
        assert!(map.tiles().is_empty());
        assert_eq!(map.title(), "Market");
        assert_eq!(map.dataset().items.len(), 0);
    }
}
