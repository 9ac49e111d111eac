//! Order Client - cart synchronization for the conversational storefront
//!
//! Keeps a client-side cart mirror in step with the storefront's session
//! cart, whether the cart is changed by explicit mutations or indirectly by
//! the ordering assistant.

pub mod chat;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod http;
pub mod logging;
pub mod reconcile;
pub mod service;
pub mod storage;
pub mod storefront;
pub mod types;

pub use chat::{ChatOutcome, ChatSession, Navigator, Route};
pub use config::ClientConfig;
pub use controller::CartController;
pub use error::{ClientError, ClientResult};
pub use events::{CartChanged, CartListener, ChangeSource, SubscriptionId};
pub use http::HttpClient;
pub use reconcile::{ReconcileHandle, ReconcilePolicy};
pub use service::{CartReply, CartService, ChatService};
pub use storage::{FallbackStore, FileFallbackStore, MemoryFallbackStore, PersistedCart};
pub use storefront::HttpStorefront;
pub use types::{CartAction, CartSnapshot, ExternalEvent, MutationOutcome};

// Re-export shared types for convenience
pub use shared::{Cart, CartLine, ComboComponent, Decimal, Suggestion, SuggestionType};
