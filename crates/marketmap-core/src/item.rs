//! Weighted items laid out by the treemap.
//!
//! On the wire an item is a flat record with optional `children`. That shape
//! is resolved exactly once, at deserialization, into [`Item::Leaf`] or
//! [`Item::Group`]; nothing downstream probes for children.

use serde::{Deserialize, Serialize};

/// Market data attached to every item, leaf or group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ticker symbol, if any.
    pub symbol: Option<String>,
    /// Weight (e.g. market capitalization). Determines area.
    pub value: f64,
    /// Change in percent. Color and labels only.
    pub change: f64,
    /// Absolute change. Labels only.
    pub change_amount: f64,
}

impl Quote {
    /// Quote with a weight and no change.
    #[must_use]
    pub fn new(id: &str, value: f64) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            value,
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the ticker symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    /// Set percent and absolute change.
    #[must_use]
    pub fn with_change(mut self, change: f64, change_amount: f64) -> Self {
        self.change = change;
        self.change_amount = change_amount;
        self
    }
}

/// An entity to lay out: a single holding or a group of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ItemRecord", into = "ItemRecord")]
pub enum Item {
    /// Terminal item (a stock, a position).
    Leaf(Quote),
    /// Drill-down container (a sector). `children` is never empty.
    Group {
        /// The group's own market data; its `value` is used at its level.
        quote: Quote,
        /// Nested items.
        children: Vec<Item>,
    },
}

impl Item {
    /// Create a leaf item.
    #[must_use]
    pub fn leaf(id: &str, value: f64) -> Self {
        Self::Leaf(Quote::new(id, value))
    }

    /// Create a group; an empty `children` list yields a leaf.
    #[must_use]
    pub fn group(quote: Quote, children: Vec<Self>) -> Self {
        if children.is_empty() {
            Self::Leaf(quote)
        } else {
            Self::Group { quote, children }
        }
    }

    /// Create a group whose value is the sum of its children's values.
    #[must_use]
    pub fn group_of(id: &str, children: Vec<Self>) -> Self {
        let value = children.iter().map(Self::value).sum();
        Self::group(Quote::new(id, value), children)
    }

    /// Market data for this item.
    #[must_use]
    pub const fn quote(&self) -> &Quote {
        match self {
            Self::Leaf(quote) | Self::Group { quote, .. } => quote,
        }
    }

    /// Mutable market data for this item.
    pub fn quote_mut(&mut self) -> &mut Quote {
        match self {
            Self::Leaf(quote) | Self::Group { quote, .. } => quote,
        }
    }

    /// Identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.quote().id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.quote().name
    }

    /// Layout weight.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.quote().value
    }

    /// Percent change.
    #[must_use]
    pub const fn change(&self) -> f64 {
        self.quote().change
    }

    /// Children; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Leaf(_) => &[],
            Self::Group { children, .. } => children,
        }
    }

    /// Check if this item can be drilled into.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    /// Whether the item takes part in a layout (finite, strictly positive value).
    #[must_use]
    pub fn is_weighted(&self) -> bool {
        let v = self.value();
        v.is_finite() && v > 0.0
    }

    /// Sum of the direct children's values.
    #[must_use]
    pub fn children_total(&self) -> f64 {
        self.children().iter().map(Self::value).sum()
    }

    /// Find a direct child by id.
    #[must_use]
    pub fn child(&self, id: &str) -> Option<&Self> {
        self.children().iter().find(|c| c.id() == id)
    }

    /// Number of items in this subtree, including itself.
    #[must_use]
    pub fn count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(item) = stack.pop() {
            count += 1;
            stack.extend(item.children());
        }
        count
    }
}

/// Wire form of an [`Item`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    symbol: Option<String>,
    value: f64,
    #[serde(default)]
    change: f64,
    #[serde(default)]
    change_amount: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<ItemRecord>,
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        let quote = Quote {
            name: record.name.unwrap_or_else(|| record.id.clone()),
            id: record.id,
            symbol: record.symbol,
            value: record.value,
            change: record.change,
            change_amount: record.change_amount,
        };
        let children = record.children.into_iter().map(Self::from).collect();
        Self::group(quote, children)
    }
}

impl From<Item> for ItemRecord {
    fn from(item: Item) -> Self {
        let (quote, children, kind) = match item {
            Item::Leaf(quote) => (quote, Vec::new(), None),
            Item::Group { quote, children } => (quote, children, Some("sector")),
        };
        Self {
            id: quote.id,
            name: Some(quote.name),
            symbol: quote.symbol,
            value: quote.value,
            change: quote.change,
            change_amount: quote.change_amount,
            kind: kind.map(str::to_string),
            children: children.into_iter().map(Self::from).collect(),
        }
    }
}
