// Single-slot enrich action registry
// The global toolbar triggers whatever the active listing registered

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::api::ApiError;

/// Zero-argument asynchronous action ("enrich the visible collection")
pub type EnrichAction = Arc<dyn Fn() -> BoxFuture<'static, Result<(), ApiError>> + Send + Sync>;

/// Wrap an async closure as an [`EnrichAction`]
pub fn enrich_action<F, Fut>(f: F) -> EnrichAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

#[derive(Default)]
struct Slot {
    next_token: u64,
    current: Option<(u64, EnrichAction)>,
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

/// Holds at most one enrich action for the whole client session.
///
/// Registering overwrites whatever was there. Triggers are not de-duplicated:
/// a second `trigger()` while the first is still running invokes the action
/// again, concurrently.
#[derive(Clone, Default)]
pub struct EnrichActions {
    slot: Arc<Mutex<Slot>>,
}

impl EnrichActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot content; `None` clears it
    pub fn register(&self, action: Option<EnrichAction>) {
        self.replace(action);
    }

    fn replace(&self, action: Option<EnrichAction>) -> u64 {
        let mut slot = lock(&self.slot);
        let token = slot.next_token;
        slot.next_token += 1;
        slot.current = action.map(|a| (token, a));
        token
    }

    /// Register `action` for as long as the returned guard lives.
    ///
    /// Dropping the guard clears the slot, unless another registration has
    /// replaced this one in the meantime.
    pub fn acquire(&self, action: EnrichAction) -> HandlerGuard {
        let token = self.replace(Some(action));
        tracing::debug!("Enrich handler {} registered", token);
        HandlerGuard {
            token,
            slot: Arc::downgrade(&self.slot),
        }
    }

    pub fn is_registered(&self) -> bool {
        lock(&self.slot).current.is_some()
    }

    /// Run the registered action to completion. Returns `Ok(false)` when the
    /// slot is empty.
    pub async fn trigger(&self) -> Result<bool, ApiError> {
        let action = lock(&self.slot).current.as_ref().map(|(_, a)| Arc::clone(a));

        match action {
            Some(action) => {
                tracing::info!("Running enrich action");
                if let Err(e) = action().await {
                    tracing::error!("Enrich action failed: {}", e);
                    return Err(e);
                }
                Ok(true)
            }
            None => {
                tracing::debug!("Enrich triggered with no handler registered");
                Ok(false)
            }
        }
    }
}

/// Scoped registration returned by [`EnrichActions::acquire`]
#[must_use = "dropping the guard releases the enrich handler"]
pub struct HandlerGuard {
    token: u64,
    slot: Weak<Mutex<Slot>>,
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        let Some(slot) = self.slot.upgrade() else {
            return;
        };
        let mut slot = lock(&slot);
        if matches!(slot.current, Some((token, _)) if token == self.token) {
            slot.current = None;
            tracing::debug!("Enrich handler {} released", self.token);
        }
    }
}
