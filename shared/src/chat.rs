//! Chat turn types
//!
//! `POST /api/chat` forwards one free-text turn to the ordering assistant.
//! Unlike the cart endpoints this contract is camelCase on the request side.

use crate::models::Cart;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of the order snapshot sent along with a chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
}

/// Order snapshot the assistant reasons over
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrder {
    pub menu_items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl CurrentOrder {
    /// Flatten a cart into the assistant's order shape, keeping the given
    /// total verbatim
    pub fn from_cart(cart: &Cart, total: Decimal) -> Self {
        Self {
            menu_items: cart
                .lines()
                .map(|line| OrderItem {
                    id: line.id.clone(),
                    name: line.name.clone(),
                    price: line.unit_price,
                    quantity: line.quantity,
                })
                .collect(),
            total,
        }
    }
}

/// A previous message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub message: String,
    pub is_bot: bool,
}

impl ChatTurn {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_bot: false,
        }
    }

    pub fn bot(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_bot: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub current_order: CurrentOrder,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conversation_history: Vec<ChatTurn>,
}

/// Routing instruction carried by a chat reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAction {
    Checkout,
    #[serde(other)]
    Other,
}

/// Menu item the assistant reports as added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant reply shown in the transcript
    pub response: String,
    #[serde(default)]
    pub items: Vec<ChatItem>,
    #[serde(default)]
    pub removed_items: Vec<String>,
    /// Assistant's own view of the order; informational only, the cart
    /// service stays authoritative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ChatAction>,
}

impl ChatResponse {
    pub fn is_checkout(&self) -> bool {
        self.action == Some(ChatAction::Checkout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CartLine;

    #[test]
    fn test_request_is_camel_case() {
        let cart = Cart::from_lines(vec![CartLine::new(
            "BURGER01",
            "Cheeseburger",
            Decimal::new(25, 1),
            2,
        )]);
        let req = ChatRequest {
            message: "add a coke".into(),
            current_order: CurrentOrder::from_cart(&cart, Decimal::new(45, 1)),
            conversation_history: vec![ChatTurn::bot("Welcome!")],
        };
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(value["currentOrder"]["menuItems"][0]["id"], "BURGER01");
        assert_eq!(value["currentOrder"]["total"], serde_json::json!(4.5));
        assert_eq!(value["conversationHistory"][0]["isBot"], true);
    }

    #[test]
    fn test_response_checkout_action() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{"response":"Great! Taking you to checkout now.","order":{},"action":"checkout","pendingCombo":false}"#,
        )
        .unwrap();
        assert!(resp.is_checkout());
        assert!(resp.items.is_empty());
    }

    #[test]
    fn test_response_minimal() {
        let resp: ChatResponse =
            serde_json::from_str(r#"{"response":"Anything else?","action":null}"#).unwrap();
        assert!(!resp.is_checkout());

        let resp: ChatResponse =
            serde_json::from_str(r#"{"response":"Hm","action":"dance"}"#).unwrap();
        assert_eq!(resp.action, Some(ChatAction::Other));
    }
}
