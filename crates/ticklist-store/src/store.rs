/// Observable value container with start/stop lifecycle.
///
/// The only surface UI code is allowed to depend on: `subscribe` returns a
/// handle that detaches on drop, `set`/`update` replace the value and notify
/// every observer. An optional start callback runs when the subscriber count
/// goes 0 -> 1 (used to lazily pull persisted state); its returned teardown
/// runs when the count goes back to 0, and start runs again on the next
/// subscriber.
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Cleanup closure returned by a start callback.
pub type Teardown = Box<dyn FnOnce()>;

type Observer<T> = Rc<RefCell<dyn FnMut(&T)>>;
type StartFn<T> = Box<dyn FnMut(StoreSetter<T>) -> Option<Teardown>>;

struct Inner<T> {
    value: T,
    observers: Vec<(u64, Observer<T>)>,
    next_id: u64,
    start: Option<StartFn<T>>,
    teardown: Option<Teardown>,
}

/// Single-threaded observable store.
///
/// Cloning is cheap and produces another handle to the same value;
/// all handles share observers and lifecycle state.
pub struct Store<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Store<T> {
    /// Creates a store with no lifecycle callback.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: initial,
                observers: Vec::new(),
                next_id: 0,
                start: None,
                teardown: None,
            })),
        }
    }

    /// Creates a store whose `start` callback runs on the 0 -> 1 subscriber
    /// transition.
    ///
    /// `start` receives a setter handle and may return a teardown closure,
    /// which runs when the last subscriber detaches. `start` runs again on
    /// the next 0 -> 1 transition.
    pub fn with_start(
        initial: T,
        start: impl FnMut(StoreSetter<T>) -> Option<Teardown> + 'static,
    ) -> Self {
        let store = Self::new(initial);
        store.inner.borrow_mut().start = Some(Box::new(start));
        store
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Replaces the value and notifies every observer.
    pub fn set(&self, value: T) {
        self.inner.borrow_mut().value = value;
        self.notify();
    }

    /// Replaces the value with `updater(current)` and notifies.
    pub fn update(&self, updater: impl FnOnce(T) -> T) {
        let current = self.get();
        self.set(updater(current));
    }

    /// Attaches an observer.
    ///
    /// The observer is invoked once immediately with the current value, then
    /// on every subsequent `set`/`update`. Dropping the returned handle (or
    /// calling `unsubscribe` on it) detaches the observer.
    pub fn subscribe(&self, observer: impl FnMut(&T) + 'static) -> Subscription<T> {
        if self.inner.borrow().observers.is_empty() {
            self.run_start();
        }

        let observer: Observer<T> = Rc::new(RefCell::new(observer));
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.observers.push((id, Rc::clone(&observer)));
            id
        };

        // Immediate first call, outside the borrow so the observer may
        // re-enter the store.
        let value = self.get();
        (&mut *observer.borrow_mut())(&value);

        Subscription {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of currently attached observers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    fn notify(&self) {
        // Snapshot value and observer list before calling out, so observers
        // may subscribe/unsubscribe/set without hitting a live borrow.
        let (value, observers) = {
            let inner = self.inner.borrow();
            let observers: Vec<Observer<T>> =
                inner.observers.iter().map(|(_, o)| Rc::clone(o)).collect();
            (inner.value.clone(), observers)
        };
        for observer in &observers {
            (&mut *observer.borrow_mut())(&value);
        }
    }

    fn run_start(&self) {
        let start = self.inner.borrow_mut().start.take();
        if let Some(mut start) = start {
            let teardown = start(StoreSetter {
                inner: Rc::downgrade(&self.inner),
            });
            let mut inner = self.inner.borrow_mut();
            inner.teardown = teardown;
            inner.start = Some(start);
        }
    }
}

/// Setter handle passed to a store's start callback.
///
/// Holds a weak reference so a stashed setter cannot keep the store alive.
pub struct StoreSetter<T> {
    inner: Weak<RefCell<Inner<T>>>,
}

impl<T: Clone + 'static> StoreSetter<T> {
    /// Sets the store value and notifies observers. No-op if the store has
    /// been dropped.
    pub fn set(&self, value: T) {
        if let Some(inner) = self.inner.upgrade() {
            Store { inner }.set(value);
        }
    }
}

/// Handle returned by `Store::subscribe`; detaches the observer on drop.
pub struct Subscription<T> {
    inner: Weak<RefCell<Inner<T>>>,
    id: u64,
}

impl<T> Subscription<T> {
    /// Explicitly detaches the observer (equivalent to dropping the handle).
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let teardown = {
            let mut inner = inner.borrow_mut();
            inner.observers.retain(|(id, _)| *id != self.id);
            if inner.observers.is_empty() {
                inner.teardown.take()
            } else {
                None
            }
        };
        if let Some(teardown) = teardown {
            teardown();
        }
    }
}
