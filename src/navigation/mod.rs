// src/navigation/mod.rs
// =============================================================================
// Latest-wins display state for overlapping navigations.
//
// Every navigation takes a token from a counter that only goes up. When its
// page finishes loading, it is displayed only if its token is still the
// newest one handed out. A slow response for an old navigation is dropped
// instead of overwriting what the user asked for afterwards.
//
// In-flight requests are not cancelled; their results are just discarded.
//
// Rust concepts:
// - Arc: shared ownership between the navigator and spawned tasks
// - AtomicU64: lock-free counter for tokens
// - Mutex: serializes "check token, then display" so the two can't interleave
// =============================================================================

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifies one navigation; larger tokens are newer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NavigationToken(u64);

type DisplayFn<T> = dyn Fn(&T) + Send + Sync;

struct Shared<T> {
    latest: AtomicU64,
    displayed: Mutex<Option<(NavigationToken, T)>>,
    display: Box<DisplayFn<T>>,
}

/// Tracks the newest navigation and shows only its result
pub struct Navigator<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Navigator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Navigator<T> {
    // `display` is called for every result that is accepted, in order
    pub fn new(display: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                latest: AtomicU64::new(0),
                displayed: Mutex::new(None),
                display: Box::new(display),
            }),
        }
    }

    /// Starts a navigation; any older one becomes stale
    pub fn begin(&self) -> NavigationToken {
        let token = NavigationToken(self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(token = token.0, "navigation started");
        token
    }

    pub fn is_current(&self, token: NavigationToken) -> bool {
        self.shared.latest.load(Ordering::SeqCst) == token.0
    }

    // Displays `value` if `token` is still the newest navigation.
    // Returns whether it was displayed.
    pub fn complete(&self, token: NavigationToken, value: T) -> bool {
        let mut displayed = self.lock();

        if !self.is_current(token) {
            debug!(token = token.0, "discarding stale navigation result");
            return false;
        }

        (self.shared.display)(&value);
        *displayed = Some((token, value));
        true
    }

    /// Begins a navigation and loads it in the background
    pub fn navigate<F>(&self, load: F) -> JoinHandle<bool>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let token = self.begin();
        let navigator = self.clone();
        tokio::spawn(async move {
            let value = load.await;
            navigator.complete(token, value)
        })
    }

    pub fn displayed(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().as_ref().map(|(_, value)| value.clone())
    }

    // A panic inside `display` shouldn't wedge every later navigation
    fn lock(&self) -> MutexGuard<'_, Option<(NavigationToken, T)>> {
        self.shared
            .displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
