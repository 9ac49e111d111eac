//! Response types for the storefront cart endpoints
//!
//! Every cart endpoint answers with the same envelope:
//! ```json
//! {
//!     "success": true,
//!     "cart": { "BURGER01": { "id": "BURGER01", "name": "Cheeseburger", "price": 2.5, "quantity": 2 } },
//!     "total": 5.0
//! }
//! ```
//! Failures set `success: false` and carry a `message`.

use crate::models::Cart;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of upsell the server suggests after an add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    /// Fries, nuggets, salads: offer a dipping sauce
    Sauce,
    /// Burgers and sandwiches: offer a side or drink
    Entree,
    #[serde(other)]
    Other,
}

/// Upsell suggestion returned by add endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    /// The item that triggered the suggestion
    pub item_id: String,
}

/// What a remove call took out of the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedLine {
    pub id: String,
    pub quantity: u32,
}

/// Unified cart response envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartResponse {
    pub success: bool,
    /// Human-readable message (always present on failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<Cart>,
    /// Server-computed total; authoritative even when it differs from the
    /// sum of the lines (discounts, combo pricing)
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_type: Option<SuggestionType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed_items: Vec<RemovedLine>,
}

impl CartResponse {
    /// Create a successful response carrying a cart
    pub fn ok(cart: Cart, total: Decimal) -> Self {
        Self {
            success: true,
            cart: Some(cart),
            total: Some(total),
            ..Default::default()
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Default::default()
        }
    }
}
