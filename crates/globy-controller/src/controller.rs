use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use globy_core::traits::SearchTransport;
use globy_core::types::ImageItem;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::SearchState;

/// Translates raw query edits into at most one outstanding, relevant lookup.
///
/// Every edit restarts the debounce timer; only the lookup for the latest
/// settled text may fire. Issuing a lookup aborts the previous in-flight one,
/// and a generation counter captured at issue time guards against transports
/// that do not stop promptly when aborted: a response applies only while its
/// generation is still current ("last request wins").
///
/// Must be created inside a tokio runtime; timers and lookups run as spawned
/// tasks on it.
pub struct SearchController {
    shared: Arc<Shared>,
    state_rx: watch::Receiver<SearchState>,
}

struct Shared {
    transport: Arc<dyn SearchTransport>,
    debounce: Duration,
    state: watch::Sender<SearchState>,
    tasks: Mutex<Tasks>,
    generation: AtomicU64,
    timer_epoch: AtomicU64,
}

#[derive(Default)]
struct Tasks {
    pending: Option<JoinHandle<()>>,
    inflight: Option<JoinHandle<()>>,
    closed: bool,
}

impl SearchController {
    pub fn new(transport: Arc<dyn SearchTransport>, debounce: Duration) -> Self {
        let (state_tx, state_rx) = watch::channel(SearchState::default());
        let shared = Arc::new(Shared {
            transport,
            debounce,
            state: state_tx,
            tasks: Mutex::new(Tasks::default()),
            generation: AtomicU64::new(0),
            timer_epoch: AtomicU64::new(0),
        });
        Self { shared, state_rx }
    }

    /// Subscribe to state changes. Each receiver observes every settled
    /// transition; renderers should `borrow_and_update` on change.
    pub fn state(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    /// Record a new query value. The input echoes immediately; the lookup is
    /// scheduled after the debounce window, replacing any scheduled-but-unfired
    /// one. Empty/whitespace-only text settles synchronously: results, error
    /// and loading are cleared and any in-flight lookup is dropped.
    pub fn on_query_changed(&self, text: &str) {
        let shared = &self.shared;
        let mut tasks = shared.lock();
        if tasks.closed {
            return;
        }
        if let Some(timer) = tasks.pending.take() {
            timer.abort();
        }
        // Epoch invalidates a timer that already fired and is waiting on the
        // lock; abort alone cannot stop it once it is past its sleep.
        let epoch = shared.timer_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        shared.state.send_modify(|s| s.query = text.to_string());

        if text.trim().is_empty() {
            if let Some(lookup) = tasks.inflight.take() {
                lookup.abort();
            }
            // Invalidate any response racing the abort.
            shared.generation.fetch_add(1, Ordering::SeqCst);
            shared.state.send_modify(|s| {
                s.results.clear();
                s.error = None;
                s.loading = false;
            });
            return;
        }

        let query = text.to_string();
        let scheduled = Arc::clone(shared);
        tasks.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(scheduled.debounce).await;
            Shared::issue(&scheduled, query, epoch);
        }));
    }

    /// Tear down: abort the debounce timer and any in-flight lookup. No state
    /// mutation can occur afterwards, even if a lookup was about to resolve.
    pub fn close(&self) {
        let mut tasks = self.shared.lock();
        tasks.closed = true;
        if let Some(timer) = tasks.pending.take() {
            timer.abort();
        }
        if let Some(lookup) = tasks.inflight.take() {
            lookup.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.close();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Tasks> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fires when the debounce window elapses for a non-empty query. Aborts
    /// the previous in-flight lookup, bumps the generation and spawns the
    /// authoritative request.
    fn issue(self: &Arc<Self>, query: String, epoch: u64) {
        let mut tasks = self.lock();
        if tasks.closed || self.timer_epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
        if let Some(lookup) = tasks.inflight.take() {
            lookup.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        // Prior results stay visible while the new lookup runs.
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        debug!(%query, generation, "issuing lookup");

        let lookup = self.transport.search(&query);
        let shared = Arc::clone(self);
        tasks.inflight = Some(tokio::spawn(async move {
            let outcome = lookup.await;
            shared.settle(generation, &query, outcome);
        }));
    }

    fn settle(&self, generation: u64, query: &str, outcome: anyhow::Result<Vec<ImageItem>>) {
        // The lock serializes settling against close(): once close() returns,
        // nothing can get past this check.
        let tasks = self.lock();
        if tasks.closed || self.generation.load(Ordering::SeqCst) != generation {
            debug!(%query, generation, "superseded lookup discarded");
            return;
        }
        match outcome {
            Ok(items) => {
                debug!(%query, count = items.len(), "lookup succeeded");
                self.state.send_modify(|s| {
                    s.results = items;
                    s.error = None;
                    s.loading = false;
                });
            }
            Err(e) => {
                debug!(%query, "lookup failed: {e:#}");
                self.state.send_modify(|s| {
                    s.results.clear();
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
            }
        }
    }
}
