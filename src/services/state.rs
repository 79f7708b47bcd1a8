// View load state and the generation-guarded commit path shared by every view

use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// What a view renders
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    /// No data yet (loading indicator)
    Pending,
    /// Load succeeded with zero items
    Empty,
    Ready(T),
    /// Load failed; partial results are never kept
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Token identifying one load invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Current state of a mounted view plus the right to change it.
///
/// Every load starts with [`StateCell::begin`], which bumps the generation and
/// resets the state to `Pending`. A result is only committed if no newer load
/// started since and the view has not been unmounted.
pub struct StateCell<T> {
    tx: watch::Sender<LoadState<T>>,
    generation: Mutex<u64>,
    mounted: CancellationToken,
}

impl<T: Clone> StateCell<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(LoadState::Pending);
        Self {
            tx,
            generation: Mutex::new(0),
            mounted: CancellationToken::new(),
        }
    }

    fn generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn begin(&self) -> Generation {
        let mut current = self.generation();
        *current += 1;
        self.tx.send_replace(LoadState::Pending);
        Generation(*current)
    }

    /// Publish `state` if `generation` is still the latest load. Returns
    /// whether it was committed.
    pub fn commit(&self, generation: Generation, state: LoadState<T>) -> bool {
        if self.mounted.is_cancelled() {
            tracing::debug!("View unmounted, dropping load result");
            return false;
        }

        let current = self.generation();
        if *current != generation.0 {
            tracing::debug!(
                "Dropping result of superseded load {} (current {})",
                generation.0,
                *current
            );
            return false;
        }

        self.tx.send_replace(state);
        true
    }

    pub fn current(&self) -> LoadState<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.tx.subscribe()
    }

    /// Unmount: no further commits are accepted
    pub fn revoke(&self) {
        self.mounted.cancel();
    }

    pub fn is_revoked(&self) -> bool {
        self.mounted.is_cancelled()
    }
}

impl<T: Clone> Default for StateCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until the watched view leaves `Pending`. Returns `None` if the view
/// was dropped first.
pub async fn settled<T: Clone>(rx: &mut watch::Receiver<LoadState<T>>) -> Option<LoadState<T>> {
    rx.wait_for(|state| !state.is_pending())
        .await
        .ok()
        .map(|state| (*state).clone())
}
