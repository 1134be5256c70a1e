//! Hierarchical layout: groups are subdivided among their children.

use crate::squarify::{layout_in, LayoutRect};
use marketmap_core::{Item, Rect, Size};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Options for nested layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NestedOptions {
    /// Levels of children laid out below the top level (0 = flat).
    pub max_depth: usize,
    /// Inset inside a group before its children are laid out.
    pub padding: f64,
    /// Band at the top of a group kept free for its title.
    pub header: f64,
}

impl NestedOptions {
    /// Options descending `max_depth` levels with no padding or header.
    #[must_use]
    pub const fn depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            padding: 0.0,
            header: 0.0,
        }
    }

    /// Set padding.
    #[must_use]
    pub const fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set header height.
    #[must_use]
    pub const fn with_header(mut self, header: f64) -> Self {
        self.header = header;
        self
    }

    /// Area left for children inside a group's rectangle.
    #[must_use]
    pub fn content_rect(&self, rect: Rect) -> Rect {
        rect.inset(self.padding).below(self.header)
    }
}

/// Rectangle for an item at some depth of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NestedRect<'a> {
    /// The item.
    pub item: &'a Item,
    /// Position and size in container coordinates.
    pub rect: Rect,
    /// 0 for top-level items.
    pub depth: usize,
}

/// Lay out `items` and, down to `options.max_depth`, the children of every
/// group inside that group's content rectangle.
///
/// Output is breadth-first: all rectangles of one depth come before the next
/// depth, and every parent precedes its children. Each level tiles its
/// parent's content rectangle in proportion to the children's own values.
#[must_use]
pub fn compute_nested_layout<'a>(
    items: &'a [Item],
    width: f64,
    height: f64,
    options: &NestedOptions,
) -> Vec<NestedRect<'a>> {
    nested_in(items, Rect::from_size(Size::new(width, height)), options)
}

/// Nested layout inside `bounds`. See [`compute_nested_layout`].
#[must_use]
pub fn nested_in<'a>(
    items: &'a [Item],
    bounds: Rect,
    options: &NestedOptions,
) -> Vec<NestedRect<'a>> {
    nested_with(items, bounds, options, layout_in)
}

/// Nested layout using `layout` to tile each level, e.g. a memoizing
/// [`LayoutCache`](crate::LayoutCache).
pub fn nested_with<'a, F>(
    items: &'a [Item],
    bounds: Rect,
    options: &NestedOptions,
    mut layout: F,
) -> Vec<NestedRect<'a>>
where
    F: FnMut(&'a [Item], Rect) -> Vec<LayoutRect<'a>>,
{
    let mut out = Vec::new();
    let mut pending: VecDeque<(&'a [Item], Rect, usize)> = VecDeque::new();
    pending.push_back((items, bounds, 0));

    while let Some((level, area, depth)) = pending.pop_front() {
        for placed in layout(level, area) {
            out.push(NestedRect {
                item: placed.item,
                rect: placed.rect,
                depth,
            });
            if depth < options.max_depth && placed.item.is_group() {
                let inner = options.content_rect(placed.rect);
                if inner.size().is_drawable() {
                    pending.push_back((placed.item.children(), inner, depth + 1));
                }
            }
        }
    }

    debug!(
        rects = out.len(),
        max_depth = options.max_depth,
        "nested layout"
    );
    out
}
