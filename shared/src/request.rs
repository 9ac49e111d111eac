//! Request types for the storefront cart endpoints
//!
//! Field names follow the storefront's snake_case JSON contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `POST /api/add_to_cart`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub item_id: String,
}

/// `POST /api/add_customized_item`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCustomizedItemRequest {
    pub item_id: String,
    /// Ingredient IDs taken off the base item
    #[serde(default)]
    pub removed_ingredients: Vec<String>,
    /// Ingredient IDs added on top (priced server-side)
    #[serde(default)]
    pub added_ingredients: Vec<String>,
}

/// `POST /api/add_combo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddComboRequest {
    pub base_item_id: String,
    /// The side slot; the storefront calls it "fries" whatever the side is
    #[serde(rename = "fries_item_id")]
    pub side_item_id: String,
    pub drink_item_id: String,
    /// Price quoted by the menu when the combo was built. Forwarded as-is;
    /// the server decides the final line price.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub combo_price: Option<Decimal>,
}

/// `POST /api/remove_from_cart`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItemRequest {
    pub item_id: String,
    /// Decrease quantity by one instead of removing the whole line
    #[serde(default)]
    pub decrease_only: bool,
}
