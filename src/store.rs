//! Shared application state behind a watch channel.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::watch;
use tracing::debug;

use crate::domain::{AppState, RequestKind};

const KIND_COUNT: usize = 7;

fn slot(kind: RequestKind) -> usize {
    match kind {
        RequestKind::Realms => 0,
        RequestKind::Items => 1,
        RequestKind::ItemClasses => 2,
        RequestKind::Groups => 3,
        RequestKind::GroupItems => 4,
        RequestKind::Prices => 5,
        RequestKind::Comparison => 6,
    }
}

/// Identifies one in-flight request; only the newest ticket of a kind may
/// write its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: RequestKind,
    seq: u64,
}

struct StoreInner {
    state: watch::Sender<AppState>,
    tickets: [AtomicU64; KIND_COUNT],
}

/// Cloneable handle to the application state. All writes go through
/// [`MarketStore::update`].
#[derive(Clone)]
pub struct MarketStore {
    inner: Arc<StoreInner>,
}

impl MarketStore {
    pub fn new(initial: AppState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(StoreInner {
                state,
                tickets: Default::default(),
            }),
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut out = None;
        self.inner.state.send_modify(|state| out = Some(f(state)));
        match out {
            Some(value) => value,
            None => unreachable!("send_modify runs its closure exactly once"),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.inner.state.subscribe()
    }

    /// Starts a request: supersedes older tickets of the same kind, clears
    /// the current error and marks the kind as loading.
    pub fn begin(&self, kind: RequestKind) -> RequestTicket {
        let seq = self.inner.tickets[slot(kind)].fetch_add(1, Ordering::SeqCst) + 1;
        self.update(|state| {
            state.error = None;
            state.pending.insert(kind);
        });
        RequestTicket { kind, seq }
    }

    /// Invalidates every outstanding ticket of `kind` without touching the
    /// error or loading state.
    pub fn supersede(&self, kind: RequestKind) -> RequestTicket {
        let seq = self.inner.tickets[slot(kind)].fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket { kind, seq }
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.inner.tickets[slot(ticket.kind)].load(Ordering::SeqCst) == ticket.seq
    }

    /// Applies a completion if its ticket is still the newest one. Returns
    /// `false` when the result was dropped.
    pub fn complete(&self, ticket: RequestTicket, apply: impl FnOnce(&mut AppState)) -> bool {
        let applied = self.update(|state| {
            if !self.is_current(ticket) {
                return false;
            }
            state.pending.remove(&ticket.kind);
            apply(state);
            true
        });
        if !applied {
            debug!(kind = ?ticket.kind, "dropping out-of-date response");
        }
        applied
    }

    /// Records a failure for the newest ticket. Older failures are dropped
    /// like any other stale completion.
    pub fn fail(&self, ticket: RequestTicket, message: impl Into<String>) -> bool {
        let message = message.into();
        self.complete(ticket, move |state| state.record_failure(message))
    }
}

impl PartialEq for MarketStore {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for MarketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let store = MarketStore::new(AppState::default());
        let first = store.begin(RequestKind::Comparison);
        let second = store.begin(RequestKind::Comparison);
        assert!(!store.is_current(first));
        assert!(store.is_current(second));

        assert!(!store.complete(first, |state| state.error = Some("old".into())));
        assert!(store.read(|state| state.is_pending(RequestKind::Comparison)));
        assert!(store.complete(second, |_| {}));
        assert!(!store.read(|state| state.is_loading()));
        assert_eq!(store.read(|state| state.error.clone()), None);
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let store = MarketStore::new(AppState::default());
        let realms = store.begin(RequestKind::Realms);
        let _items = store.begin(RequestKind::Items);
        assert!(store.is_current(realms));
        assert!(store.complete(realms, |_| {}));
        assert!(store.read(|state| state.is_pending(RequestKind::Items)));
    }

    #[test]
    fn begin_clears_previous_error() {
        let store = MarketStore::new(AppState::default());
        let ticket = store.begin(RequestKind::Groups);
        store.fail(ticket, "boom");
        assert_eq!(store.read(|state| state.error.clone()).as_deref(), Some("boom"));
        store.begin(RequestKind::Realms);
        assert_eq!(store.read(|state| state.error.clone()), None);
    }

    #[test]
    fn superseding_keeps_error_and_drops_in_flight_result() {
        let store = MarketStore::new(AppState::default());
        let in_flight = store.begin(RequestKind::Comparison);
        store.update(|state| state.record_failure("still here".into()));

        let cleared = store.supersede(RequestKind::Comparison);
        assert!(!store.is_current(in_flight));
        assert!(store.complete(cleared, |state| state.comparison = None));
        assert!(!store.read(|state| state.is_pending(RequestKind::Comparison)));
        assert_eq!(
            store.read(|state| state.error.clone()).as_deref(),
            Some("still here")
        );
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let store = MarketStore::new(AppState::default());
        let mut rx = store.subscribe();
        store.update(|state| state.selection.add_item(7));
        assert!(rx.changed().await.is_ok());
        assert_eq!(rx.borrow().selection.item_ids(), &[7]);
        assert_eq!(store.clone(), store);
    }
}
