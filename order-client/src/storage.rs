// order-client/src/storage.rs
// Fallback storage - device-local key/value store for the last known cart

use crate::types::CartSnapshot;
use crate::{ClientError, ClientResult};
use parking_lot::Mutex;
use shared::money::parse_price;
use shared::{Cart, Decimal};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Key holding the serialized cart (id-keyed JSON object)
pub const CART_ITEMS_KEY: &str = "cartItems";
/// Key holding the cart total as a decimal string
pub const CART_TOTAL_KEY: &str = "cartTotal";

/// Device-local key/value store. Writes are last-write-wins.
pub trait FallbackStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
}

/// One file per key under a directory
#[derive(Debug, Clone)]
pub struct FileFallbackStore {
    dir: PathBuf,
}

impl FileFallbackStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> ClientResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(ClientError::Validation(format!("invalid storage key {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

impl FallbackStore for FileFallbackStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.dir)?;
        // write-then-rename so a reader never sees half a value
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, gone when the process exits
#[derive(Debug, Default)]
pub struct MemoryFallbackStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryFallbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FallbackStore for MemoryFallbackStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// The persisted fallback cart, laid out as `cartItems` + `cartTotal`
#[derive(Clone)]
pub struct PersistedCart {
    store: Arc<dyn FallbackStore>,
}

impl std::fmt::Debug for PersistedCart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedCart").finish_non_exhaustive()
    }
}

impl PersistedCart {
    pub fn new(store: Arc<dyn FallbackStore>) -> Self {
        Self { store }
    }

    /// Load the fallback snapshot.
    ///
    /// Returns `None` when nothing was persisted or the cart is unreadable.
    /// A missing or unparsable total falls back to the line sum.
    pub fn load(&self) -> Option<CartSnapshot> {
        let raw = match self.store.get(CART_ITEMS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read fallback cart");
                return None;
            }
        };
        let cart: Cart = match serde_json::from_str(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable fallback cart");
                return None;
            }
        };

        let total = match self.store.get(CART_TOTAL_KEY) {
            Ok(Some(raw)) => parse_price(&raw),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read fallback total");
                None
            }
        };
        let total = total.unwrap_or_else(|| {
            tracing::debug!("No usable fallback total, showing line sum");
            cart.line_sum()
        });

        Some(CartSnapshot::fallback(cart, total))
    }

    /// Overwrite both keys.
    ///
    /// If the total cannot be written after the cart was, the old total is
    /// removed so `load` never pairs the new cart with a previous total.
    pub fn save(&self, cart: &Cart, total: Decimal) -> ClientResult<()> {
        self.store.set(CART_ITEMS_KEY, &serde_json::to_string(cart)?)?;
        if let Err(e) = self.store.set(CART_TOTAL_KEY, &total.to_string()) {
            if let Err(remove_err) = self.store.remove(CART_TOTAL_KEY) {
                tracing::warn!(error = %remove_err, "Failed to drop stale fallback total");
            }
            return Err(e);
        }
        Ok(())
    }
}
