//! Client configuration

use crate::reconcile::ReconcilePolicy;
use crate::storage::{FallbackStore, FileFallbackStore, MemoryFallbackStore};
use crate::{ClientResult, HttpClient, HttpStorefront};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default number of chat turns kept and sent back as context
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Client configuration for talking to the storefront
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | STOREFRONT_URL | http://localhost:5000 | Storefront base URL |
/// | REQUEST_TIMEOUT_SECS | 30 | Per-request timeout |
/// | FALLBACK_DIR | (unset: in-memory) | Directory for the persisted fallback cart |
/// | RECONCILE_DELAYS_MS | 100,300 | Offsets of the two delayed re-fetches |
/// | CHAT_HISTORY_LIMIT | 20 | Chat turns kept as context |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:5000")
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory holding the persisted fallback cart. `None` keeps it in
    /// memory for the lifetime of the process.
    pub fallback_dir: Option<PathBuf>,

    /// Delayed re-fetch schedule used after chat turns
    pub reconcile: ReconcilePolicy,

    /// Chat turns kept and sent back as context
    pub history_limit: usize,

    /// Capacity of the async `CartChanged` broadcast channel
    pub event_capacity: usize,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            fallback_dir: None,
            reconcile: ReconcilePolicy::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            event_capacity: 64,
        }
    }

    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:5000".into()),
        );

        if let Some(timeout) = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = timeout;
        }

        if let Ok(dir) = std::env::var("FALLBACK_DIR") {
            config.fallback_dir = Some(PathBuf::from(dir));
        }

        if let Ok(raw) = std::env::var("RECONCILE_DELAYS_MS") {
            match ReconcilePolicy::parse_millis(&raw) {
                Ok(policy) => config.reconcile = policy,
                Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring RECONCILE_DELAYS_MS"),
            }
        }

        if let Some(limit) = std::env::var("CHAT_HISTORY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.history_limit = limit;
        }

        config
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Persist the fallback cart under `dir`
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    /// Set the reconcile schedule
    pub fn with_reconcile(mut self, policy: ReconcilePolicy) -> Self {
        self.reconcile = policy;
        self
    }

    /// Set the chat history limit
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }

    /// Create the storefront API client (cart + chat endpoints)
    pub fn build_storefront(&self) -> ClientResult<HttpStorefront> {
        Ok(HttpStorefront::new(self.build_http_client()?))
    }

    /// Open the fallback store this configuration points at
    pub fn fallback_store(&self) -> Arc<dyn FallbackStore> {
        match &self.fallback_dir {
            Some(dir) => Arc::new(FileFallbackStore::new(dir)),
            None => Arc::new(MemoryFallbackStore::new()),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000")
    }
}
