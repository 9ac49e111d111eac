//! Cart Model
//!
//! The storefront server has returned carts in two shapes over time: an
//! id-keyed object and a plain array of lines. Both deserialize into the same
//! insertion-ordered [`Cart`]. The persisted form is always the keyed object.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Cart Line
// ============================================================================

/// One component of a combo meal (burger, side, drink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboComponent {
    pub id: String,
    pub name: String,
    /// Component carries a premium upcharge over the base combo price
    #[serde(default, alias = "premium")]
    pub is_premium_upcharge: bool,
}

/// A single line of the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    /// Menu item ID, stable across quantity changes of the same line
    pub id: String,
    pub name: String,
    /// Unit price, full precision (rounded only for display)
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Always >= 1; lines that would drop to zero are removed
    pub quantity: u32,
    /// Customization summary ("Removed: Pickles; Added: Bacon")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_combo: bool,
    /// Ordered combo components (empty unless `is_combo`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComboComponent>,
}

impl CartLine {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
            notes: None,
            is_combo: false,
            components: Vec::new(),
        }
    }

    /// Attach a customization note
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Mark the line as a combo made of `components`
    pub fn with_components(mut self, components: Vec<ComboComponent>) -> Self {
        self.is_combo = true;
        self.components = components;
        self
    }

    /// unit_price × quantity
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Line as sent by the server. Quantity is signed so that bogus zero or
/// negative quantities can be filtered instead of failing the whole cart.
#[derive(Debug, Deserialize)]
struct WireLine {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    quantity: i64,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default, alias = "combo")]
    is_combo: bool,
    #[serde(default, alias = "combo_items")]
    components: Vec<ComboComponent>,
}

impl WireLine {
    fn into_line(self, key: Option<&str>) -> Option<CartLine> {
        let Some(id) = self.id.or_else(|| key.map(str::to_string)) else {
            tracing::debug!(name = %self.name, "Dropping cart line without id");
            return None;
        };
        let quantity = match u32::try_from(self.quantity) {
            Ok(q) if q > 0 => q,
            _ => {
                tracing::debug!(
                    item_id = %id,
                    quantity = self.quantity,
                    "Dropping non-positive cart line"
                );
                return None;
            }
        };
        Some(CartLine {
            id,
            name: self.name,
            unit_price: self.price,
            quantity,
            notes: self.notes.filter(|n| !n.is_empty()),
            is_combo: self.is_combo || !self.components.is_empty(),
            components: self.components,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireCart {
    Keyed(IndexMap<String, WireLine>),
    Listed(Vec<WireLine>),
}

// ============================================================================
// Cart
// ============================================================================

/// Insertion-ordered mapping from line key to [`CartLine`].
///
/// The line key is the item ID. A server that appends several lines for the
/// same item (each customized copy is its own line) gets the later copies
/// keyed `"{id}#2"`, `"{id}#3"`, ... while `CartLine::id` keeps the item ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: IndexMap<String, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from lines, dropping zero-quantity lines and keying
    /// duplicate item IDs apart.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.push(line);
        }
        cart
    }

    fn push(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        let key = if self.lines.contains_key(&line.id) {
            (2..)
                .map(|n| format!("{}#{}", line.id, n))
                .find(|k| !self.lines.contains_key(k))
                .unwrap_or_else(|| line.id.clone())
        } else {
            line.id.clone()
        };
        self.lines.insert(key, line);
    }

    /// Look up a line by its key
    pub fn get(&self, key: &str) -> Option<&CartLine> {
        self.lines.get(key)
    }

    /// Whether any line refers to the given item ID
    pub fn contains_item(&self, item_id: &str) -> bool {
        self.lines.values().any(|l| l.id == item_id)
    }

    /// Iterate `(key, line)` in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CartLine)> {
        self.lines.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    /// Number of distinct lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines (cart badge count)
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|l| u64::from(l.quantity)).sum()
    }

    /// Σ unit_price × quantity, recomputed on every call.
    ///
    /// Only a last-resort display value: whenever the server has reported a
    /// total, that total wins.
    pub fn line_sum(&self) -> Decimal {
        self.lines.values().map(CartLine::line_total).sum()
    }
}

impl Cart {
    fn from_wire(wire: WireCart) -> Self {
        match wire {
            WireCart::Keyed(map) => {
                let mut lines = IndexMap::with_capacity(map.len());
                for (key, raw) in map {
                    if let Some(line) = raw.into_line(Some(&key)) {
                        lines.insert(key, line);
                    }
                }
                Self { lines }
            }
            WireCart::Listed(list) => {
                Self::from_lines(list.into_iter().filter_map(|raw| raw.into_line(None)))
            }
        }
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lines.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireCart::deserialize(deserializer).map(Cart::from_wire)
    }
}
