//! Drill-down focus: which level of the item tree is on screen.

use marketmap_core::Item;
use tracing::debug;

/// Path of group ids from the root to the focused group.
///
/// The path is resolved against the items on every call, so it survives a
/// data refresh: if an id disappears, the focus falls back to the deepest
/// level that still resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drilldown {
    path: Vec<String>,
}

impl Drilldown {
    /// Focus on the root level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids along the focus path.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Check if the root level is shown.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Focus the group `id` among the currently visible items.
    ///
    /// Returns `false` and leaves the focus unchanged if `id` is not visible
    /// or is not a group.
    pub fn enter(&mut self, items: &[Item], id: &str) -> bool {
        self.truncate_to_valid(items);
        let entered = self
            .visible(items)
            .iter()
            .any(|item| item.id() == id && item.is_group());
        if entered {
            self.path.push(id.to_string());
            debug!(group = id, depth = self.path.len(), "drill down");
        }
        entered
    }

    /// Go up one level. Returns `false` at the root.
    pub fn back(&mut self) -> bool {
        let popped = self.path.pop();
        if let Some(id) = &popped {
            debug!(group = %id, depth = self.path.len(), "drill up");
        }
        popped.is_some()
    }

    /// Return to the root level.
    pub fn reset(&mut self) {
        self.path.clear();
    }

    /// Items shown at the current focus.
    #[must_use]
    pub fn visible<'a>(&self, items: &'a [Item]) -> &'a [Item] {
        self.resolve(items)
            .last()
            .copied()
            .map_or(items, Item::children)
    }

    /// Focused group, if any.
    #[must_use]
    pub fn focused<'a>(&self, items: &'a [Item]) -> Option<&'a Item> {
        self.resolve(items).last().copied()
    }

    /// Names of the groups along the resolvable part of the path.
    #[must_use]
    pub fn breadcrumbs<'a>(&self, items: &'a [Item]) -> Vec<&'a str> {
        self.resolve(items).into_iter().map(Item::name).collect()
    }

    /// Drop path segments that no longer resolve.
    pub fn truncate_to_valid(&mut self, items: &[Item]) {
        let valid = self.resolve(items).len();
        if valid < self.path.len() {
            debug!(
                kept = valid,
                dropped = self.path.len() - valid,
                "stale drill-down path"
            );
            self.path.truncate(valid);
        }
    }

    fn resolve<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        let mut groups = Vec::with_capacity(self.path.len());
        let mut level = items;
        for id in &self.path {
            match level.iter().find(|i| i.id() == id && i.is_group()) {
                Some(group) => {
                    groups.push(group);
                    level = group.children();
                }
                None => break,
            }
        }
        groups
    }
}
