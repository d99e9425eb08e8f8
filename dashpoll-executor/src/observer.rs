//! Observers
//!
//! Observers receive every successful payload a polling executor fetches.
//! They are kept in registration order and removed by identity.

use dashpoll_core::Payload;
use std::fmt;
use std::sync::Arc;

/// A listener for poll payloads
pub trait Observer: Send + Sync {
    /// Called with each payload delivered to this observer
    fn notify(&self, payload: &Payload);

    /// Opt out of responses superseded by a newer request
    ///
    /// Read at delivery time, so an observer may change its mind.
    fn drop_expired_callback(&self) -> bool {
        false
    }

    /// Whether the observer can currently take notifications
    fn is_listening(&self) -> bool {
        true
    }
}

/// Observer backed by a closure
pub struct FnObserver<F> {
    callback: F,
    drop_expired: bool,
}

impl<F> FnObserver<F>
where
    F: Fn(&Payload) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            drop_expired: false,
        }
    }

    /// Marks the observer as dropping expired responses
    pub fn dropping_expired(mut self) -> Self {
        self.drop_expired = true;
        self
    }
}

impl<F> Observer for FnObserver<F>
where
    F: Fn(&Payload) + Send + Sync,
{
    fn notify(&self, payload: &Payload) {
        (self.callback)(payload)
    }

    fn drop_expired_callback(&self) -> bool {
        self.drop_expired
    }
}

impl<F> fmt::Debug for FnObserver<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnObserver")
            .field("drop_expired", &self.drop_expired)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of observers with removal by identity
#[derive(Clone, Default)]
pub struct ObserverList {
    observers: Vec<Arc<dyn Observer>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an observer; the same observer may be registered twice
    pub fn push(&mut self, observer: Arc<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Removes the first registration of `observer`
    ///
    /// Returns false when it was not registered. The remaining observers
    /// keep their relative order.
    pub fn remove(&mut self, observer: &Arc<dyn Observer>) -> bool {
        match self.observers.iter().position(|o| same_observer(o, observer)) {
            Some(index) => {
                self.observers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Observer>> {
        self.observers.iter()
    }

    /// Copies the current registrations out, in order
    pub fn snapshot(&self) -> Vec<Arc<dyn Observer>> {
        self.observers.clone()
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish()
    }
}

// Compares data pointers only; vtable pointers of the same type can differ
// between codegen units.
fn same_observer(a: &Arc<dyn Observer>, b: &Arc<dyn Observer>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn named(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Arc<dyn Observer> {
        let log = Arc::clone(log);
        Arc::new(FnObserver::new(move |_| log.lock().unwrap().push(name)))
    }

    fn notify_all(list: &ObserverList) {
        let payload = Payload::new(json!({}));
        for observer in list.iter() {
            observer.notify(&payload);
        }
    }

    #[test]
    fn test_push_preserves_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.push(named(&log, "a"));
        list.push(named(&log, "b"));
        list.push(named(&log, "c"));

        notify_all(&list);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove_keeps_relative_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = named(&log, "a");
        let b = named(&log, "b");
        let c = named(&log, "c");
        let mut list = ObserverList::new();
        list.push(Arc::clone(&a));
        list.push(Arc::clone(&b));
        list.push(Arc::clone(&c));

        assert!(list.remove(&b));
        notify_all(&list);
        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_remove_takes_one_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = named(&log, "a");
        let b = named(&log, "b");
        let mut list = ObserverList::new();
        list.push(Arc::clone(&a));
        list.push(Arc::clone(&b));
        list.push(Arc::clone(&a));

        assert!(list.remove(&a));
        assert_eq!(list.len(), 2);
        notify_all(&list);
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_remove_unknown_observer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut list = ObserverList::new();
        list.push(named(&log, "a"));

        assert!(!list.remove(&named(&log, "a")));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_fn_observer_drop_flag() {
        let plain = FnObserver::new(|_| {});
        let dropping = FnObserver::new(|_| {}).dropping_expired();
        assert!(!plain.drop_expired_callback());
        assert!(dropping.drop_expired_callback());
        assert!(dropping.is_listening());
    }
}
