//! Squarified treemap layout (Bruls, Huizing, van Wijk).
//!
//! Items are sorted by value, descending, and packed greedily into rows laid
//! along the shorter side of the free rectangle. A row keeps growing while
//! the worst aspect ratio among its members does not get worse; it is then
//! committed as a strip and the free rectangle shrinks by that strip.
//!
//! Orientation: when the free rectangle is wider than tall, or square, the
//! row is a vertical strip on its left edge (members stacked top to bottom).
//! Otherwise the row is a horizontal strip on its top edge (members left to
//! right).
//!
//! Rectangle edges are derived from cumulative sums and the last member of
//! every row (and the last row itself) snaps to the far edge, so the output
//! tiles the container exactly up to one rounding step per edge. There is
//! no minimum-size clamp; renderers decide what is too small to draw.

use marketmap_core::{Item, Rect, Size};
use serde::Serialize;
use tracing::{debug, trace};

/// Computed rectangle for an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRect<'a> {
    /// The item this rectangle was computed for.
    pub item: &'a Item,
    /// Position and size in container coordinates.
    pub rect: Rect,
}

/// Stateless squarified treemap engine.
///
/// Holds no data: every call is independent, so one engine can be shared
/// freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreemapLayoutEngine;

impl TreemapLayoutEngine {
    /// Create an engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Lay out `items` in a `width` × `height` container at the origin.
    #[must_use]
    pub fn compute<'a>(&self, items: &'a [Item], width: f64, height: f64) -> Vec<LayoutRect<'a>> {
        compute_layout(items, width, height)
    }

    /// Lay out `items` inside `bounds`.
    #[must_use]
    pub fn compute_in<'a>(&self, items: &'a [Item], bounds: Rect) -> Vec<LayoutRect<'a>> {
        layout_in(items, bounds)
    }
}

/// Lay out `items` in a `width` × `height` container at the origin.
///
/// Returns one rectangle per item with a finite, positive value, in layout
/// order (largest first; input order breaks ties). Degenerate input (no
/// weighted items, non-positive or non-finite container) yields an empty
/// `Vec`. Every returned coordinate is finite.
#[must_use]
pub fn compute_layout(items: &[Item], width: f64, height: f64) -> Vec<LayoutRect<'_>> {
    layout_in(items, Rect::from_size(Size::new(width, height)))
}

/// Lay out `items` inside `bounds`. See [`compute_layout`].
#[must_use]
pub fn layout_in(items: &[Item], bounds: Rect) -> Vec<LayoutRect<'_>> {
    let weights: Vec<f64> = items.iter().map(Item::value).collect();
    squarify(&weights, bounds)
        .into_iter()
        .map(|(idx, rect)| LayoutRect {
            item: &items[idx],
            rect,
        })
        .collect()
}

/// Squarify raw weights into `bounds`.
///
/// Returns `(index into weights, rect)` pairs in layout order. Weights that
/// are zero, negative or not finite are skipped.
#[must_use]
pub fn squarify(weights: &[f64], bounds: Rect) -> Vec<(usize, Rect)> {
    if !bounds.size().is_drawable() || !bounds.area().is_finite() {
        trace!(?bounds, "degenerate container");
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..weights.len())
        .filter(|&i| weights[i].is_finite() && weights[i] > 0.0)
        .collect();
    if order.is_empty() {
        trace!(items = weights.len(), "nothing to lay out");
        return Vec::new();
    }

    // Stable: equal weights keep input order.
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));

    // Rescale so the largest weight is near 1: the sum stays finite and
    // `area / total` cannot overflow. Power-of-two factors are exact.
    let (lo, hi) = normalizers(weights[order[0]]);
    let normalized: Vec<f64> = order.iter().map(|&i| weights[i] * lo * hi).collect();
    let total: f64 = normalized.iter().sum();
    let scale = bounds.area() / total;
    let areas: Vec<f64> = normalized.iter().map(|&w| w * scale).collect();

    let mut placed = Vec::with_capacity(order.len());
    let mut free = bounds;
    let mut start = 0;
    let mut rows = 0usize;

    while start < order.len() {
        let side = free.short_side();
        let mut row_sum = areas[start];
        let row_max = areas[start];
        let mut worst = worst_ratio(row_sum, row_max, row_sum, side);
        let mut end = start + 1;

        while end < order.len() {
            // Areas are sorted descending, so the newcomer is the row minimum.
            let candidate = worst_ratio(row_sum + areas[end], row_max, areas[end], side);
            if candidate > worst {
                break;
            }
            worst = candidate;
            row_sum += areas[end];
            end += 1;
        }

        let last = end == order.len();
        free = place_row(
            &order[start..end],
            &areas[start..end],
            row_sum,
            free,
            last,
            &mut placed,
        );
        rows += 1;
        start = end;
    }

    debug!(items = placed.len(), rows, "squarified layout");
    placed
}

/// Worst aspect ratio of a row of total area `sum` whose largest and
/// smallest members have areas `max` and `min`, laid along a side of
/// length `side`. Lower is better; 1.0 is a perfect square.
#[must_use]
pub fn worst_ratio(sum: f64, max: f64, min: f64, side: f64) -> f64 {
    if sum <= 0.0 || min <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    (side_sq * max / sum_sq).max(sum_sq / (side_sq * min))
}

/// Two powers of two whose product maps `max` (finite, positive) to
/// roughly 1. Split in two so that neither factor overflows, even for
/// subnormal `max`.
fn normalizers(max: f64) -> (f64, f64) {
    let exp = -(max.log2().floor() as i32);
    let half = exp / 2;
    (2f64.powi(half), 2f64.powi(exp - half))
}

/// Commit one row into `free` and return what is left of it.
fn place_row(
    members: &[usize],
    areas: &[f64],
    row_sum: f64,
    free: Rect,
    last: bool,
    placed: &mut Vec<(usize, Rect)>,
) -> Rect {
    let vertical_strip = free.width >= free.height;
    let (extent, span) = if vertical_strip {
        (free.width, free.height)
    } else {
        (free.height, free.width)
    };

    let thickness = if last || span <= 0.0 {
        extent
    } else {
        (row_sum / span).min(extent)
    };

    let count = members.len() as f64;
    let mut cumulative = 0.0;
    let mut prev_edge = 0.0;
    for (k, (&idx, &area)) in members.iter().zip(areas).enumerate() {
        cumulative += area;
        let edge = if k + 1 == members.len() {
            span
        } else if row_sum > 0.0 {
            span * (cumulative / row_sum)
        } else {
            // Every member underflowed to zero area.
            span * ((k + 1) as f64 / count)
        };
        let rect = if vertical_strip {
            Rect::new(free.x, free.y + prev_edge, thickness, edge - prev_edge)
        } else {
            Rect::new(free.x + prev_edge, free.y, edge - prev_edge, thickness)
        };
        placed.push((idx, rect));
        prev_edge = edge;
    }

    if vertical_strip {
        let x = free.x + thickness;
        Rect::new(x, free.y, (free.right() - x).max(0.0), free.height)
    } else {
        let y = free.y + thickness;
        Rect::new(free.x, y, free.width, (free.bottom() - y).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn leaves(values: &[f64]) -> Vec<Item> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Item::leaf(&format!("item{i}"), v))
            .collect()
    }

    fn total_area(layout: &[LayoutRect<'_>]) -> f64 {
        layout.iter().map(|r| r.rect.area()).sum()
    }

    #[test]
    fn test_empty_items() {
        assert!(compute_layout(&[], 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_zero_value_items() {
        let items = vec![Item::leaf("a", 0.0)];
        assert!(compute_layout(&items, 100.0, 100.0).is_empty());
    }

    #[test]
    fn test_non_positive_container() {
        let items = leaves(&[1.0, 2.0]);
        assert!(compute_layout(&items, 0.0, 100.0).is_empty());
        assert!(compute_layout(&items, 100.0, 0.0).is_empty());
        assert!(compute_layout(&items, -5.0, 100.0).is_empty());
    }

    #[test]
    fn test_non_finite_container() {
        let items = leaves(&[1.0]);
        assert!(compute_layout(&items, f64::NAN, 100.0).is_empty());
        assert!(compute_layout(&items, f64::INFINITY, 100.0).is_empty());
        assert!(compute_layout(&items, f64::MAX, f64::MAX).is_empty());
    }

    fn assert_finite_tiling(layout: &[LayoutRect<'_>], container: f64) {
        for r in layout {
            let Rect { x, y, width, height } = r.rect;
            assert!(
                [x, y, width, height].iter().all(|v| v.is_finite()),
                "{}: {:?}",
                r.item.id(),
                r.rect
            );
        }
        assert!((total_area(layout) - container).abs() <= 1e-9 * container);
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let items = leaves(&[f64::MAX, f64::MAX]);
        let layout = compute_layout(&items, 100.0, 100.0);
        assert_eq!(layout.len(), 2);
        assert_finite_tiling(&layout, 10_000.0);
        assert!((layout[0].rect.area() - 5_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_subnormal_weights_split_evenly() {
        let items = leaves(&[5e-324, 5e-324]);
        let layout = compute_layout(&items, 100.0, 100.0);
        assert_eq!(layout.len(), 2);
        assert_finite_tiling(&layout, 10_000.0);
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(layout[1].rect, Rect::new(0.0, 50.0, 100.0, 50.0));
    }

    #[test]
    fn test_dominant_weight_with_underflowing_rest() {
        let items = leaves(&[1e300, 1e-300, 1e-300]);
        let layout = compute_layout(&items, 100.0, 100.0);
        assert_eq!(layout.len(), 3);
        assert_finite_tiling(&layout, 10_000.0);
        assert_eq!(layout[0].item.id(), "item0");
        assert!((layout[0].rect.area() - 10_000.0).abs() < 1e-9);
        for r in &layout[1..] {
            assert!(r.rect.area() < 1e-9);
        }
    }

    #[test]
    fn test_zero_area_row_splits_span() {
        let mut placed = Vec::new();
        let free = Rect::new(0.0, 0.0, 60.0, 30.0);
        let rest = place_row(&[4, 7, 9], &[0.0, 0.0, 0.0], 0.0, free, true, &mut placed);
        let ids: Vec<usize> = placed.iter().map(|(i, _)| *i).collect();
        assert_eq!(ids, vec![4, 7, 9]);
        assert_eq!(placed[0].1, Rect::new(0.0, 0.0, 60.0, 10.0));
        assert_eq!(placed[1].1, Rect::new(0.0, 10.0, 60.0, 10.0));
        assert_eq!(placed[2].1, Rect::new(0.0, 20.0, 60.0, 10.0));
        assert_eq!(rest.width, 0.0);
    }

    #[test]
    fn test_normalizers_are_finite() {
        for max in [5e-324, 1e-300, 0.3, 1.0, 6.0, 1e300, f64::MAX] {
            let (lo, hi) = normalizers(max);
            let scaled = max * lo * hi;
            assert!((0.25..4.0).contains(&scaled), "{max} -> {scaled}");
        }
    }

    #[test]
    fn test_single_item_fills_container() {
        let items = vec![Item::leaf("a", 10.0)];
        let layout = compute_layout(&items, 200.0, 100.0);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].item.id(), "a");
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_two_equal_items_split_side_by_side() {
        let items = vec![Item::leaf("a", 1.0), Item::leaf("b", 1.0)];
        let layout = compute_layout(&items, 200.0, 100.0);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout[0].item.id(), "a");
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(layout[1].item.id(), "b");
        assert_eq!(layout[1].rect, Rect::new(100.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_two_equal_items_tall_container_stacks() {
        let items = vec![Item::leaf("a", 1.0), Item::leaf("b", 1.0)];
        let layout = compute_layout(&items, 100.0, 200.0);
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(layout[1].rect, Rect::new(0.0, 100.0, 100.0, 100.0));
    }

    #[test]
    fn test_square_container_uses_vertical_strip() {
        // 6x6 with areas 18, 9, 9: first item takes the left half.
        let items = leaves(&[2.0, 1.0, 1.0]);
        let layout = compute_layout(&items, 6.0, 6.0);
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 3.0, 6.0));
        assert_eq!(layout[1].rect, Rect::new(3.0, 0.0, 3.0, 3.0));
        assert_eq!(layout[2].rect, Rect::new(3.0, 3.0, 3.0, 3.0));
    }

    #[test]
    fn test_classic_example() {
        // The 6x4 example from the squarified treemap paper.
        let items = leaves(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]);
        let layout = compute_layout(&items, 6.0, 4.0);
        assert_eq!(layout.len(), 7);
        assert!((total_area(&layout) - 24.0).abs() < EPS);

        // First row: the two 6s stacked in a 3-wide column.
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 3.0, 2.0));
        assert_eq!(layout[1].rect, Rect::new(0.0, 2.0, 3.0, 2.0));
        // Second row: 4 and 3 side by side across the top of the 3x4 remainder.
        let r = layout[2].rect;
        assert!((r.x - 3.0).abs() < EPS && r.y.abs() < EPS);
        assert!((r.width - 12.0 / 7.0).abs() < EPS);
        assert!((r.height - 7.0 / 3.0).abs() < EPS);
        let r = layout[3].rect;
        assert!((r.x - (3.0 + 12.0 / 7.0)).abs() < EPS);
        assert!((r.right() - 6.0).abs() < EPS);
        assert!((r.height - 7.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn test_zero_items_skipped() {
        let items = leaves(&[5.0, 0.0, 5.0]);
        let layout = compute_layout(&items, 100.0, 50.0);
        let ids: Vec<&str> = layout.iter().map(|r| r.item.id()).collect();
        assert_eq!(ids, vec!["item0", "item2"]);
        assert!((total_area(&layout) - 5000.0).abs() < EPS);
    }

    #[test]
    fn test_negative_and_nan_items_skipped() {
        let items = leaves(&[-3.0, f64::NAN, 4.0]);
        let layout = compute_layout(&items, 10.0, 10.0);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].item.id(), "item2");
        assert_eq!(layout[0].rect, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_order_is_descending_by_value() {
        let items = leaves(&[1.0, 8.0, 3.0, 8.0]);
        let layout = compute_layout(&items, 100.0, 100.0);
        let ids: Vec<&str> = layout.iter().map(|r| r.item.id()).collect();
        assert_eq!(ids, vec!["item1", "item3", "item2", "item0"]);
    }

    #[test]
    fn test_proportional_areas() {
        let values = [50.0, 25.0, 12.5, 6.25, 6.25];
        let items = leaves(&values);
        let layout = compute_layout(&items, 400.0, 300.0);
        for r in &layout {
            let expected = r.item.value() / 100.0 * 120_000.0;
            assert!((r.rect.area() - expected).abs() < 1e-6, "{:?}", r);
        }
    }

    #[test]
    fn test_offset_bounds() {
        let items = leaves(&[3.0, 1.0]);
        let layout = layout_in(&items, Rect::new(10.0, 20.0, 40.0, 10.0));
        assert_eq!(layout[0].rect.x, 10.0);
        assert_eq!(layout[0].rect.y, 20.0);
        let last = layout[1].rect;
        assert!((last.right() - 50.0).abs() < EPS);
        assert!((last.bottom() - 30.0).abs() < EPS);
    }

    #[test]
    fn test_engine_matches_free_function() {
        let items = leaves(&[9.0, 4.0, 4.0, 1.0]);
        let engine = TreemapLayoutEngine::new();
        assert_eq!(
            engine.compute(&items, 320.0, 200.0),
            compute_layout(&items, 320.0, 200.0)
        );
        let bounds = Rect::new(5.0, 5.0, 90.0, 40.0);
        assert_eq!(engine.compute_in(&items, bounds), layout_in(&items, bounds));
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TreemapLayoutEngine>();
    }

    #[test]
    fn test_worst_ratio() {
        assert_eq!(worst_ratio(100.0, 100.0, 100.0, 10.0), 1.0);
        assert_eq!(worst_ratio(200.0, 100.0, 100.0, 10.0), 4.0);
        assert!(worst_ratio(0.0, 1.0, 1.0, 10.0).is_infinite());
        assert!(worst_ratio(1.0, 1.0, 1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_squarify_indices() {
        let placed = squarify(&[1.0, 0.0, 3.0], Rect::new(0.0, 0.0, 4.0, 1.0));
        let order: Vec<usize> = placed.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![2, 0]);
        assert_eq!(placed[0].1, Rect::new(0.0, 0.0, 3.0, 1.0));
        assert_eq!(placed[1].1, Rect::new(3.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let items = leaves(&[1.0, 5.0, 2.0]);
        let before = items.clone();
        let _ = compute_layout(&items, 10.0, 10.0);
        assert_eq!(items, before);
    }
}
