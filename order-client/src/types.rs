//! Value types exchanged with the cart controller.

use shared::money::format_price;
use shared::{
    AddComboRequest, AddCustomizedItemRequest, AddItemRequest, Cart, Decimal, RemoveItemRequest,
    RemovedLine, Suggestion,
};

// ============================================================================
// Cart Snapshot
// ============================================================================

/// The cart mirror at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartSnapshot {
    pub cart: Cart,
    /// Server-reported total when `authoritative`; otherwise the persisted
    /// total (or, lacking one, the line sum)
    pub total: Decimal,
    /// Came from a successful server response in this session
    pub authoritative: bool,
}

impl CartSnapshot {
    /// Snapshot from a successful server response
    pub fn authoritative(cart: Cart, total: Decimal) -> Self {
        Self {
            cart,
            total,
            authoritative: true,
        }
    }

    /// Snapshot restored from the persisted fallback
    pub fn fallback(cart: Cart, total: Decimal) -> Self {
        Self {
            cart,
            total,
            authoritative: false,
        }
    }

    /// Total formatted for display (`$5.00`)
    pub fn display_total(&self) -> String {
        format_price(self.total)
    }
}

// ============================================================================
// Cart Actions
// ============================================================================

/// A mutation request against the server cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    AddItem {
        item_id: String,
    },
    AddCustomizedItem {
        item_id: String,
        removed_ingredients: Vec<String>,
        added_ingredients: Vec<String>,
    },
    AddCombo {
        base_item_id: String,
        side_item_id: String,
        drink_item_id: String,
        /// Menu-quoted price, forwarded untouched
        quoted_price: Option<Decimal>,
    },
    RemoveItem {
        item_id: String,
        decrease_only: bool,
    },
    Clear,
}

impl CartAction {
    pub fn add(item_id: impl Into<String>) -> Self {
        Self::AddItem {
            item_id: item_id.into(),
        }
    }

    pub fn remove(item_id: impl Into<String>) -> Self {
        Self::RemoveItem {
            item_id: item_id.into(),
            decrease_only: false,
        }
    }

    pub fn decrease(item_id: impl Into<String>) -> Self {
        Self::RemoveItem {
            item_id: item_id.into(),
            decrease_only: true,
        }
    }

    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddItem { .. } => "add_item",
            Self::AddCustomizedItem { .. } => "add_customized_item",
            Self::AddCombo { .. } => "add_combo",
            Self::RemoveItem { .. } => "remove_item",
            Self::Clear => "clear",
        }
    }
}

impl From<CartAction> for CartRequest {
    fn from(action: CartAction) -> Self {
        match action {
            CartAction::AddItem { item_id } => Self::Add(AddItemRequest { item_id }),
            CartAction::AddCustomizedItem {
                item_id,
                removed_ingredients,
                added_ingredients,
            } => Self::AddCustomized(AddCustomizedItemRequest {
                item_id,
                removed_ingredients,
                added_ingredients,
            }),
            CartAction::AddCombo {
                base_item_id,
                side_item_id,
                drink_item_id,
                quoted_price,
            } => Self::AddCombo(AddComboRequest {
                base_item_id,
                side_item_id,
                drink_item_id,
                combo_price: quoted_price,
            }),
            CartAction::RemoveItem {
                item_id,
                decrease_only,
            } => Self::Remove(RemoveItemRequest {
                item_id,
                decrease_only,
            }),
            CartAction::Clear => Self::Clear,
        }
    }
}

/// Wire request for a [`CartAction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CartRequest {
    Add(AddItemRequest),
    AddCustomized(AddCustomizedItemRequest),
    AddCombo(AddComboRequest),
    Remove(RemoveItemRequest),
    Clear,
}

/// Result of a successful mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    /// Mirror after the server response was applied
    pub snapshot: CartSnapshot,
    /// Upsell offered by add endpoints
    pub suggestion: Option<Suggestion>,
    /// Removal report from remove calls
    pub removed: Vec<RemovedLine>,
}

// ============================================================================
// External Events
// ============================================================================

/// Something outside the controller that may have changed the server cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalEvent {
    /// A chat turn was processed by the ordering assistant
    ChatTurn { removal_intent: bool },
    /// Any other out-of-band change (another tab, a kiosk attendant, ...)
    Other(String),
}
