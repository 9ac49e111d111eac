//! Cart change notifications
//!
//! Two ways to listen:
//! - [`CartListener`] callbacks, invoked synchronously by whichever task
//!   replaced the mirror, right after the replacement
//! - a `broadcast` receiver for async consumers

use crate::types::CartSnapshot;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// What replaced the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// Persisted fallback loaded at startup
    Fallback,
    /// Plain authoritative fetch
    Fetch,
    /// Response to one of our own mutations
    Mutation,
    /// Fetch issued while reconciling after an external event
    Reconcile,
}

/// Published after every mirror replacement
#[derive(Debug, Clone)]
pub struct CartChanged {
    pub snapshot: CartSnapshot,
    pub source: ChangeSource,
    /// Sequence number of the request whose response was applied. Responses
    /// are applied in arrival order, so this is not necessarily increasing.
    pub seq: u64,
}

/// Callback-style subscriber
pub trait CartListener: Send + Sync {
    fn on_cart_changed(&self, event: &CartChanged);
}

impl<F> CartListener for F
where
    F: Fn(&CartChanged) + Send + Sync,
{
    fn on_cart_changed(&self, event: &CartChanged) {
        self(event)
    }
}

/// Returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Arc<dyn CartListener>)>>,
    bus: broadcast::Sender<CartChanged>,
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.lock().len())
            .field("receivers", &self.bus.receiver_count())
            .finish()
    }
}

impl ListenerRegistry {
    pub(crate) fn new(capacity: usize) -> Self {
        let (bus, _) = broadcast::channel(capacity.max(1));
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
            bus,
        }
    }

    pub(crate) fn subscribe(&self, listener: Arc<dyn CartListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub(crate) fn events(&self) -> broadcast::Receiver<CartChanged> {
        self.bus.subscribe()
    }

    /// Deliver to every listener. The list is copied first so a listener may
    /// (un)subscribe from inside its callback.
    pub(crate) fn publish(&self, event: &CartChanged) {
        let listeners: Vec<Arc<dyn CartListener>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener.on_cart_changed(event);
        }

        if self.bus.send(event.clone()).is_err() {
            tracing::trace!("No async subscribers for cart change");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn event() -> CartChanged {
        CartChanged {
            snapshot: CartSnapshot::default(),
            source: ChangeSource::Fetch,
            seq: 1,
        }
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let registry = ListenerRegistry::new(8);
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let id = registry.subscribe(Arc::new(move |_: &CartChanged| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.publish(&event());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));

        registry.publish(&event());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let registry = Arc::new(ListenerRegistry::new(8));
        let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let reg = registry.clone();
        let own = slot.clone();
        let id = registry.subscribe(Arc::new(move |_: &CartChanged| {
            if let Some(id) = own.lock().take() {
                reg.unsubscribe(id);
            }
        }));
        *slot.lock() = Some(id);

        registry.publish(&event());
        assert!(!registry.unsubscribe(id));
    }

    #[tokio::test]
    async fn test_broadcast_delivery() {
        let registry = ListenerRegistry::new(8);
        let mut rx = registry.events();

        registry.publish(&event());
        let received = rx.recv().await.unwrap();
        assert_eq!(received.source, ChangeSource::Fetch);
        assert_eq!(received.seq, 1);
    }
}
