//! Data models
//!
//! Shared between the order client and anything that renders its state.

pub mod cart;

// Re-exports
pub use cart::*;
