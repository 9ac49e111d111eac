//! Chat session - forwards free-text orders to the ordering assistant.
//!
//! The assistant edits the server cart on its own, so after every turn the
//! session asks the controller to reconcile instead of trusting the reply.

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::controller::CartController;
use crate::reconcile::ReconcileHandle;
use crate::service::ChatService;
use crate::types::ExternalEvent;
use crate::{ClientError, ClientResult};
use shared::{ChatRequest, ChatTurn, CurrentOrder};
use std::collections::VecDeque;
use std::sync::Arc;

/// Where the storefront should go next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Checkout,
}

/// Routing collaborator. Required at construction; there is no "maybe it
/// can navigate" probing at call time.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

const REMOVAL_KEYWORDS: [&str; 5] = ["remove", "delete", "take off", "clear", "empty"];

fn has_removal_intent(message: &str) -> bool {
    let lower = message.to_lowercase();
    REMOVAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// What one chat turn produced
#[derive(Debug)]
pub struct ChatOutcome {
    /// Assistant reply for the transcript
    pub reply: String,
    /// Names of items the assistant reports as added
    pub added: Vec<String>,
    /// Items the assistant reports as removed
    pub removed: Vec<String>,
    /// The assistant asked to go to checkout (already routed)
    pub checkout: bool,
    /// Reconciliation started for this turn
    pub reconcile: ReconcileHandle,
}

impl ChatOutcome {
    /// Toast text for added items
    pub fn added_notice(&self) -> Option<String> {
        (!self.added.is_empty()).then(|| format!("Added to cart: {}", self.added.join(", ")))
    }

    /// Toast text for removed items
    pub fn removed_notice(&self) -> Option<String> {
        (!self.removed.is_empty())
            .then(|| format!("Removed from cart: {}", self.removed.join(", ")))
    }
}

/// One conversation with the ordering assistant
pub struct ChatSession {
    controller: CartController,
    chat: Arc<dyn ChatService>,
    navigator: Arc<dyn Navigator>,
    history: VecDeque<ChatTurn>,
    history_limit: usize,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("history", &self.history.len())
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    pub fn new(
        controller: CartController,
        chat: Arc<dyn ChatService>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            controller,
            chat,
            navigator,
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep at most `limit` turns of context (user and assistant each count)
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self.trim_history();
        self
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatTurn> {
        self.history.iter()
    }

    pub fn controller(&self) -> &CartController {
        &self.controller
    }

    /// Send one turn.
    ///
    /// The order context comes from a fresh authoritative fetch (the mirror if
    /// the cart service is down). A failed turn leaves the history untouched.
    pub async fn send(&mut self, message: &str) -> ClientResult<ChatOutcome> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ClientError::Validation("empty chat message".to_string()));
        }

        let order = self.controller.fetch_authoritative().await;
        let request = ChatRequest {
            message: message.to_string(),
            current_order: CurrentOrder::from_cart(&order.cart, order.total),
            conversation_history: self.history.iter().cloned().collect(),
        };

        let response = self.chat.send_turn(&request).await?;
        tracing::info!(
            items = response.items.len(),
            removed = response.removed_items.len(),
            action = ?response.action,
            "Chat turn answered"
        );

        self.record(ChatTurn::user(message));
        self.record(ChatTurn::bot(response.response.clone()));

        let removal_intent = has_removal_intent(message) || !response.removed_items.is_empty();
        let reconcile = self
            .controller
            .reconcile_after_external_event(ExternalEvent::ChatTurn { removal_intent })
            .await;

        let checkout = response.is_checkout();
        if checkout {
            self.navigator.navigate(Route::Checkout);
        }

        Ok(ChatOutcome {
            reply: response.response,
            added: response
                .items
                .into_iter()
                .map(|item| {
                    if item.name.is_empty() {
                        "Item".to_string()
                    } else {
                        item.name
                    }
                })
                .collect(),
            removed: response.removed_items,
            checkout,
            reconcile,
        })
    }

    fn record(&mut self, turn: ChatTurn) {
        self.history.push_back(turn);
        self.trim_history();
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }
}
