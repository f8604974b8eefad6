use parking_lot::Mutex;
use std::fmt;

type Unsubscribe = Box<dyn FnOnce() + Send>;

/// RAII guard for a registered listener.
///
/// Dropping the guard unsubscribes. [`unsubscribe`](Self::unsubscribe) does
/// the same eagerly and may be called any number of times.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    unsubscribe: Mutex<Option<Unsubscribe>>,
}

impl Subscription {
    pub(crate) fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            unsubscribe: Mutex::new(Some(Box::new(unsubscribe))),
        }
    }

    /// A subscription that is not registered anywhere.
    pub fn empty() -> Self {
        Self {
            unsubscribe: Mutex::new(None),
        }
    }

    /// Remove the listener. Later calls do nothing.
    pub fn unsubscribe(&self) {
        let unsubscribe = self.unsubscribe.lock().take();
        if let Some(unsubscribe) = unsubscribe {
            unsubscribe();
        }
    }

    /// Whether the listener is still registered through this guard.
    pub fn is_active(&self) -> bool {
        self.unsubscribe.lock().is_some()
    }

    /// Keep the listener registered for the lifetime of the store.
    pub fn detach(self) {
        self.unsubscribe.lock().take();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted() -> (Subscription, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let sub = Subscription::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        (sub, calls)
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let (sub, calls) = counted();
        sub.unsubscribe();
        sub.unsubscribe();
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_unsubscribes() {
        let (sub, calls) = counted();
        assert!(sub.is_active());
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detach_never_unsubscribes() {
        let (sub, calls) = counted();
        sub.detach();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
