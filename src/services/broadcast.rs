// Scan-completed broadcast
// Fire-and-forget: no history is kept, late subscribers never see earlier events

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: HashMap<u64, Listener>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    // Listeners run outside the lock, so a poisoned lock still holds a consistent map
    listeners.lock().unwrap_or_else(|e| e.into_inner())
}

/// Process-wide "a scan completed" channel.
///
/// Cloning is cheap and every clone talks to the same set of listeners.
#[derive(Clone, Default)]
pub struct ScanEvents {
    listeners: Arc<Mutex<Listeners>>,
}

impl ScanEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned
    /// subscription is unsubscribed or dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut guard = lock(&self.listeners);
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.insert(id, Arc::new(listener));
        tracing::debug!("Scan listener {} subscribed ({} total)", id, guard.entries.len());

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Invoke every currently registered listener once. Returns how many ran
    /// to completion.
    ///
    /// Listener order is unspecified. A panicking listener is logged and
    /// skipped; the remaining listeners still run. Listeners may subscribe or
    /// unsubscribe from inside the callback: the set invoked here is the
    /// snapshot taken when publishing started.
    pub fn publish(&self) -> usize {
        let snapshot: Vec<(u64, Listener)> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        tracing::info!("Scan finished, notifying {} listeners", snapshot.len());

        let mut completed = 0;
        for (id, listener) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener())) {
                Ok(()) => completed += 1,
                Err(_) => tracing::error!("Scan listener {} panicked; continuing", id),
            }
        }
        completed
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

/// Handle returned by [`ScanEvents::subscribe`]
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Remove exactly this listener. Calling it more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if lock(&listeners).entries.remove(&self.id).is_some() {
                tracing::debug!("Scan listener {} unsubscribed", self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(events: &ScanEvents) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let sub = events.subscribe(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn test_each_listener_runs_once_per_publish() {
        let events = ScanEvents::new();
        let listeners: Vec<_> = (0..4).map(|_| counter(&events)).collect();

        for _ in 0..3 {
            assert_eq!(events.publish(), 4);
        }

        for (count, _sub) in &listeners {
            assert_eq!(count.load(Ordering::SeqCst), 3);
        }
    }

    #[test]
    fn test_subscribe_between_publishes() {
        let events = ScanEvents::new();
        let (early, _early_sub) = counter(&events);

        events.publish();
        let (late, late_sub) = counter(&events);
        events.publish();
        late_sub.unsubscribe();
        events.publish();

        assert_eq!(early.load(Ordering::SeqCst), 3);
        // No replay of the first event, and nothing after unsubscribing
        assert_eq!(late.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let events = ScanEvents::new();
        let (a, sub_a) = counter(&events);
        let (b, _sub_b) = counter(&events);

        sub_a.unsubscribe();
        sub_a.unsubscribe();
        drop(sub_a);

        assert_eq!(events.listener_count(), 1);
        events.publish();
        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let events = ScanEvents::new();
        let _bad = events.subscribe(|| panic!("listener failure"));
        let (good, _sub) = counter(&events);

        assert_eq!(events.publish(), 1);
        assert_eq!(good.load(Ordering::SeqCst), 1);

        // The bus keeps working afterwards
        assert_eq!(events.publish(), 1);
        assert_eq!(good.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_from_inside_listener() {
        let events = ScanEvents::new();
        let nested: Arc<Mutex<Vec<Subscription>>> = Arc::default();

        let bus = events.clone();
        let store = Arc::clone(&nested);
        let _sub = events.subscribe(move || {
            let inner = bus.subscribe(|| {});
            store.lock().unwrap().push(inner);
        });

        events.publish();
        assert_eq!(events.listener_count(), 2);
        assert_eq!(nested.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_subscription_outliving_bus() {
        let events = ScanEvents::new();
        let (_count, sub) = counter(&events);
        drop(events);
        // Bus is gone; unsubscribing must not panic
        sub.unsubscribe();
    }
}
