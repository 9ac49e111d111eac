//! Shared types for the storefront
//!
//! Cart domain model plus the request/response shapes of the storefront's
//! cart and chat endpoints. No I/O lives here.

pub mod chat;
pub mod models;
pub mod money;
pub mod request;
pub mod response;

// Re-exports
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};

pub use chat::{ChatAction, ChatItem, ChatRequest, ChatResponse, ChatTurn, CurrentOrder, OrderItem};
pub use models::{Cart, CartLine, ComboComponent};
pub use request::{AddComboRequest, AddCustomizedItemRequest, AddItemRequest, RemoveItemRequest};
pub use response::{CartResponse, RemovedLine, Suggestion, SuggestionType};
