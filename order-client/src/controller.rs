//! Cart synchronization controller.
//!
//! Owns the in-process cart mirror and keeps it converging on the server's
//! view:
//!
//! - every successful server response replaces the mirror and the persisted
//!   fallback together, then notifies listeners
//! - failed reads keep the last known mirror; failed writes are returned to
//!   the caller and change nothing
//! - totals are taken verbatim from the server; the line sum is only shown
//!   when nothing but persisted data is available
//!
//! Mutations are not serialized. Responses are applied in arrival order
//! (last-response-wins), so a slow stale response can overwrite a newer one.
//! Each request carries a sequence number and out-of-order applications are
//! logged; they are not discarded.

use crate::events::{CartChanged, CartListener, ChangeSource, ListenerRegistry, SubscriptionId};
use crate::reconcile::{ReconcileHandle, ReconcilePolicy};
use crate::service::{CartReply, CartService};
use crate::storage::{FallbackStore, PersistedCart};
use crate::types::{CartAction, CartRequest, CartSnapshot, ExternalEvent, MutationOutcome};
use crate::{ClientConfig, ClientResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

#[derive(Debug, Default)]
struct MirrorState {
    snapshot: CartSnapshot,
    /// Sequence number of the last applied response
    applied_seq: u64,
}

struct Inner {
    service: Arc<dyn CartService>,
    fallback: PersistedCart,
    state: Mutex<MirrorState>,
    /// Held from mirror replacement through delivery so listeners observe
    /// replacements in the order they hit the mirror
    publish: Mutex<()>,
    listeners: ListenerRegistry,
    policy: ReconcilePolicy,
    next_seq: AtomicU64,
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl Inner {
    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    fn snapshot(&self) -> CartSnapshot {
        self.state.lock().snapshot.clone()
    }

    /// Replace mirror (and, for authoritative data, the fallback) in one
    /// critical section, then notify.
    ///
    /// The state lock is released before listeners run, so a listener may
    /// call `snapshot()`; the publish lock keeps deliveries in apply order.
    fn apply(&self, snapshot: CartSnapshot, source: ChangeSource, seq: u64) -> CartSnapshot {
        let _publishing = self.publish.lock();
        let event = {
            let mut state = self.state.lock();
            if seq < state.applied_seq {
                tracing::warn!(
                    seq,
                    applied_seq = state.applied_seq,
                    ?source,
                    "Applying out-of-order cart response"
                );
            }
            if snapshot.authoritative
                && let Err(e) = self.fallback.save(&snapshot.cart, snapshot.total)
            {
                tracing::warn!(error = %e, "Failed to persist fallback cart");
            }
            state.applied_seq = seq;
            state.snapshot = snapshot;

            CartChanged {
                snapshot: state.snapshot.clone(),
                source,
                seq,
            }
        };

        tracing::debug!(
            ?source,
            seq,
            lines = event.snapshot.cart.len(),
            total = %event.snapshot.total,
            "Cart mirror replaced"
        );
        self.listeners.publish(&event);
        event.snapshot
    }

    async fn fetch(&self, source: ChangeSource) -> CartSnapshot {
        let seq = self.next_seq();
        match self.service.get_cart().await {
            Ok(reply) => self.apply(
                CartSnapshot::authoritative(reply.cart, reply.total),
                source,
                seq,
            ),
            Err(e) => {
                tracing::warn!(error = %e, seq, "Authoritative cart fetch failed, keeping mirror");
                self.snapshot()
            }
        }
    }
}

/// Cart synchronization controller. Cheap to clone; clones share one mirror.
#[derive(Clone)]
pub struct CartController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CartController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartController")
            .field("state", &*self.inner.state.lock())
            .field("listeners", &self.inner.listeners)
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}

impl CartController {
    /// Create a controller with the default reconcile schedule
    pub fn new(service: Arc<dyn CartService>, store: Arc<dyn FallbackStore>) -> Self {
        Self::with_policy(service, store, ReconcilePolicy::default(), 64)
    }

    /// Create a controller from client configuration
    pub fn from_config(config: &ClientConfig, service: Arc<dyn CartService>) -> Self {
        Self::with_policy(
            service,
            config.fallback_store(),
            config.reconcile,
            config.event_capacity,
        )
    }

    pub fn with_policy(
        service: Arc<dyn CartService>,
        store: Arc<dyn FallbackStore>,
        policy: ReconcilePolicy,
        event_capacity: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                service,
                fallback: PersistedCart::new(store),
                state: Mutex::new(MirrorState::default()),
                publish: Mutex::new(()),
                listeners: ListenerRegistry::new(event_capacity),
                policy,
                next_seq: AtomicU64::new(1),
                shutdown: CancellationToken::new(),
                tasks: TaskTracker::new(),
            }),
        }
    }

    /// Current mirror
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.snapshot()
    }

    /// Startup: paint from the persisted fallback, then fetch the real cart.
    ///
    /// Never fails. If the fetch fails the fallback stays in the mirror.
    pub async fn hydrate(&self) -> CartSnapshot {
        let already_authoritative = self.inner.state.lock().snapshot.authoritative;
        if !already_authoritative && let Some(snapshot) = self.inner.fallback.load() {
            let seq = self.inner.next_seq();
            tracing::debug!(lines = snapshot.cart.len(), "Hydrating from fallback cart");
            self.inner.apply(snapshot, ChangeSource::Fallback, seq);
        }
        self.fetch_authoritative().await
    }

    /// Read the server cart. On failure the previous mirror is returned and
    /// nothing is published.
    pub async fn fetch_authoritative(&self) -> CartSnapshot {
        self.inner.fetch(ChangeSource::Fetch).await
    }

    /// Send a mutation and adopt the server's answer.
    ///
    /// Nothing is applied optimistically: on error the mirror is untouched
    /// and no notification fires.
    pub async fn mutate(&self, action: CartAction) -> ClientResult<MutationOutcome> {
        let seq = self.inner.next_seq();
        let kind = action.kind();
        let service = &self.inner.service;

        let result = match CartRequest::from(action) {
            CartRequest::Add(req) => service.add_item(&req).await,
            CartRequest::AddCustomized(req) => service.add_customized_item(&req).await,
            CartRequest::AddCombo(req) => service.add_combo(&req).await,
            CartRequest::Remove(req) => service.remove_item(&req).await,
            CartRequest::Clear => service.clear_cart().await.map(|()| CartReply::empty()),
        };

        match result {
            Ok(reply) => {
                let snapshot = self.inner.apply(
                    CartSnapshot::authoritative(reply.cart, reply.total),
                    ChangeSource::Mutation,
                    seq,
                );
                tracing::info!(
                    action = kind,
                    seq,
                    total = %snapshot.total,
                    "Cart mutation applied"
                );
                Ok(MutationOutcome {
                    snapshot,
                    suggestion: reply.suggestion,
                    removed: reply.removed,
                })
            }
            Err(e) => {
                tracing::warn!(action = kind, seq, error = %e, "Cart mutation failed");
                Err(e)
            }
        }
    }

    /// Clear the cart once the order is placed. Navigation is up to the caller.
    pub async fn complete_order(&self) -> ClientResult<CartSnapshot> {
        self.mutate(CartAction::Clear).await.map(|o| o.snapshot)
    }

    /// Re-read the server cart after a change we did not make ourselves.
    ///
    /// Fetches once now, then exactly twice more on the policy's schedule,
    /// then stops whatever the outcomes. The delayed fetches run in the
    /// background and hold only a weak reference to the controller.
    pub async fn reconcile_after_external_event(&self, event: ExternalEvent) -> ReconcileHandle {
        tracing::debug!(?event, "Reconciling after external event");

        let attempts = Arc::new(AtomicU32::new(1));
        let immediate = self.inner.fetch(ChangeSource::Reconcile).await;

        let weak = Arc::downgrade(&self.inner);
        let token = self.inner.shutdown.clone();
        let rechecks = self.inner.policy.rechecks();
        let counter = attempts.clone();

        let join = self
            .inner
            .tasks
            .spawn(delayed_rechecks(weak, token, rechecks, counter));

        ReconcileHandle {
            immediate,
            attempts,
            join,
        }
    }

    /// Register a callback for `CartChanged`
    pub fn subscribe(&self, listener: Arc<dyn CartListener>) -> SubscriptionId {
        self.inner.listeners.subscribe(listener)
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    /// Async stream of `CartChanged`
    pub fn events(&self) -> broadcast::Receiver<CartChanged> {
        self.inner.listeners.events()
    }

    /// Cancel pending reconcile re-fetches and wait for them to stop
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        tracing::debug!("Cart controller shut down");
    }
}

async fn delayed_rechecks(
    weak: Weak<Inner>,
    token: CancellationToken,
    rechecks: [Duration; 2],
    attempts: Arc<AtomicU32>,
) {
    let mut elapsed = Duration::ZERO;
    for offset in rechecks {
        let wait = offset.saturating_sub(elapsed);
        elapsed = offset;

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Reconcile re-fetch cancelled");
                return;
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let Some(inner) = weak.upgrade() else {
            return;
        };
        attempts.fetch_add(1, Ordering::SeqCst);
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = inner.fetch(ChangeSource::Reconcile) => {}
        }
    }
}
