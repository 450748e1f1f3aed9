//! Single-slot result mailbox with at-most-once delivery.
//!
//! The slot keeps the latest posted value together with a "handled" flag.
//! Posting clears the flag; delivering a value to an observer (or to a
//! [`ResultSlot::take_pending`] poll) sets it. An observer that detaches and
//! re-attaches therefore only sees values posted after the last delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Observer<T> = Box<dyn FnMut(T) + Send>;

struct SlotInner<T> {
    value: Option<T>,
    observer: Option<Observer<T>>,
    /// Bumped whenever the observer is replaced or removed.
    observer_gen: u64,
    /// An observer call is in progress on some thread.
    delivering: bool,
}

pub struct ResultSlot<T> {
    inner: Mutex<SlotInner<T>>,
    handled: AtomicBool,
}

impl<T: Clone + Send> Default for ResultSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send> ResultSlot<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                value: None,
                observer: None,
                observer_gen: 0,
                delivering: false,
            }),
            handled: AtomicBool::new(true),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotInner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` and hand it to the attached observer, if any.
    pub fn post(&self, value: T) {
        self.stage(value);
        self.deliver();
    }

    /// Store `value` as pending without running the observer. The caller
    /// must follow up with [`ResultSlot::deliver`] once it holds no locks.
    pub(crate) fn stage(&self, value: T) {
        let mut inner = self.lock();
        inner.value = Some(value);
        self.handled.store(false, Ordering::SeqCst);
    }

    /// Attach `observer`, replacing any previous one. A value posted and not
    /// yet handled is delivered immediately.
    pub fn observe<F>(&self, observer: F)
    where
        F: FnMut(T) + Send + 'static,
    {
        {
            let mut inner = self.lock();
            inner.observer = Some(Box::new(observer));
            inner.observer_gen += 1;
        }
        self.deliver();
    }

    pub fn remove_observer(&self) {
        let mut inner = self.lock();
        inner.observer = None;
        inner.observer_gen += 1;
    }

    /// Poll for a value that has not been handled yet, marking it handled.
    pub fn take_pending(&self) -> Option<T> {
        let inner = self.lock();
        let value = inner.value.as_ref()?;
        self.claim().then(|| value.clone())
    }

    /// The latest value, handled or not.
    pub fn value(&self) -> Option<T> {
        self.lock().value.clone()
    }

    pub fn is_handled(&self) -> bool {
        self.handled.load(Ordering::SeqCst)
    }

    /// Drop the stored value and anything it holds on to.
    pub fn clear(&self) {
        drop(self.take());
    }

    /// Remove the stored value, marking the slot handled.
    pub(crate) fn take(&self) -> Option<T> {
        let mut inner = self.lock();
        self.handled.store(true, Ordering::SeqCst);
        inner.value.take()
    }

    fn claim(&self) -> bool {
        self.handled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Run the observer outside the lock so it may call back into the slot
    /// (or into whatever owns it) without deadlocking.
    pub(crate) fn deliver(&self) {
        loop {
            let (value, mut observer, gen) = {
                let mut inner = self.lock();
                if inner.delivering || inner.observer.is_none() {
                    return;
                }
                let Some(value) = inner.value.clone() else {
                    return;
                };
                if !self.claim() {
                    return;
                }
                let Some(observer) = inner.observer.take() else {
                    return;
                };
                inner.delivering = true;
                (value, observer, inner.observer_gen)
            };

            observer(value);

            let mut inner = self.lock();
            inner.delivering = false;
            if inner.observer_gen == gen {
                inner.observer = Some(observer);
            }
            if self.handled.load(Ordering::SeqCst) || inner.observer.is_none() {
                return;
            }
            // A value was posted while the observer was busy; go around again.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl FnMut(u32) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v| sink.lock().expect("lock").push(v))
    }

    #[test]
    fn delivers_each_value_once() {
        let slot = ResultSlot::new();
        let (seen, obs) = recorder();
        slot.observe(obs);
        slot.post(1);
        slot.post(2);
        assert_eq!(*seen.lock().expect("lock"), vec![1, 2]);
        assert!(slot.is_handled());
    }

    #[test]
    fn pending_value_goes_to_first_observer_only() {
        let slot = ResultSlot::new();
        slot.post(7);

        let (first, obs) = recorder();
        slot.observe(obs);
        assert_eq!(*first.lock().expect("lock"), vec![7]);

        // Re-subscribing (e.g. after a UI rebuild) does not replay the value.
        slot.remove_observer();
        let (second, obs) = recorder();
        slot.observe(obs);
        assert!(second.lock().expect("lock").is_empty());

        slot.post(8);
        assert_eq!(*second.lock().expect("lock"), vec![8]);
        assert_eq!(*first.lock().expect("lock"), vec![7]);
    }

    #[test]
    fn polling_claims_the_value() {
        let slot = ResultSlot::new();
        assert_eq!(slot.take_pending(), None);
        slot.post(3);
        assert_eq!(slot.take_pending(), Some(3));
        assert_eq!(slot.take_pending(), None);
        assert_eq!(slot.value(), Some(3));

        let (seen, obs) = recorder();
        slot.observe(obs);
        assert!(seen.lock().expect("lock").is_empty());
    }

    #[test]
    fn clear_drops_the_value() {
        let slot = ResultSlot::new();
        slot.post(Arc::new(5));
        let held = slot.value().expect("value");
        assert_eq!(Arc::strong_count(&held), 2);
        slot.clear();
        assert_eq!(Arc::strong_count(&held), 1);
        assert_eq!(slot.take_pending(), None);
    }

    #[test]
    fn observer_may_reenter_the_slot() {
        let slot = Arc::new(ResultSlot::new());
        let inner = slot.clone();
        let (seen, mut rec) = recorder();
        slot.observe(move |v: u32| {
            rec(v);
            if v == 1 {
                inner.post(2);
            }
        });
        slot.post(1);
        assert_eq!(*seen.lock().expect("lock"), vec![1, 2]);
    }

    #[test]
    fn staged_value_waits_for_delivery() {
        let slot = ResultSlot::new();
        let (seen, obs) = recorder();
        slot.observe(obs);

        slot.stage(4);
        assert!(seen.lock().expect("lock").is_empty());
        assert!(!slot.is_handled());

        slot.deliver();
        assert_eq!(*seen.lock().expect("lock"), vec![4]);
        slot.deliver();
        assert_eq!(*seen.lock().expect("lock"), vec![4]);
    }

    #[test]
    fn take_hands_back_the_value() {
        let slot = ResultSlot::new();
        slot.post(9);
        assert_eq!(slot.take(), Some(9));
        assert!(slot.is_handled());
        assert_eq!(slot.value(), None);
    }
}
