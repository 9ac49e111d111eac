//! External service seams
//!
//! The controller talks to the cart service and the chat backend only through
//! these traits. [`crate::HttpStorefront`] is the production implementation;
//! tests plug in scripted fakes.

use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use shared::{
    AddComboRequest, AddCustomizedItemRequest, AddItemRequest, Cart, CartResponse, ChatRequest,
    ChatResponse, Decimal, RemoveItemRequest, RemovedLine, Suggestion,
};

/// A validated successful cart response
#[derive(Debug, Clone, PartialEq)]
pub struct CartReply {
    pub cart: Cart,
    /// Server-reported total, used verbatim
    pub total: Decimal,
    pub suggestion: Option<Suggestion>,
    pub removed: Vec<RemovedLine>,
}

impl CartReply {
    pub fn new(cart: Cart, total: Decimal) -> Self {
        Self {
            cart,
            total,
            suggestion: None,
            removed: Vec::new(),
        }
    }

    /// The state the server reports after a successful clear
    pub fn empty() -> Self {
        Self::new(Cart::new(), Decimal::ZERO)
    }

    /// Validate a response envelope.
    ///
    /// `success: false` becomes [`ClientError::Service`]; a success without
    /// cart or total is a contract violation, never patched up locally.
    pub fn from_response(response: CartResponse) -> ClientResult<Self> {
        if !response.success {
            return Err(ClientError::service(
                response
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        let cart = response
            .cart
            .ok_or_else(|| ClientError::InvalidResponse("missing cart".to_string()))?;
        let total = response
            .total
            .ok_or_else(|| ClientError::InvalidResponse("missing total".to_string()))?;

        Ok(Self {
            cart,
            total,
            suggestion: response.suggestion,
            removed: response.removed_items,
        })
    }
}

/// Session cart service
#[async_trait]
pub trait CartService: Send + Sync {
    async fn get_cart(&self) -> ClientResult<CartReply>;

    async fn add_item(&self, request: &AddItemRequest) -> ClientResult<CartReply>;

    async fn add_customized_item(
        &self,
        request: &AddCustomizedItemRequest,
    ) -> ClientResult<CartReply>;

    async fn add_combo(&self, request: &AddComboRequest) -> ClientResult<CartReply>;

    async fn remove_item(&self, request: &RemoveItemRequest) -> ClientResult<CartReply>;

    /// Clear answers `{success}` only
    async fn clear_cart(&self) -> ClientResult<()>;
}

/// Natural-language ordering backend
#[async_trait]
pub trait ChatService: Send + Sync {
    async fn send_turn(&self, request: &ChatRequest) -> ClientResult<ChatResponse>;
}
