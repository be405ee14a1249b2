// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A value that notifies listeners when it changes.
//!
//! [`StateEvent`] holds a current and previous value. [`StateEvent::set`] dispatches only when
//! the value actually changes; [`StateEvent::clear_to`] changes it silently. Listeners may be
//! unconditional, bound to one value, or gated by a predicate over `(new, previous)`.
//!
//! Dispatch works on a snapshot of the listener list taken when it starts, without holding the
//! list lock while listeners run. Removal is deferred: a removed listener is marked inactive
//! and is dropped at the start of the next dispatch.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use understory_focus::state_event::StateEvent;
//!
//! let mut checked = StateEvent::new(false);
//! let hits = Arc::new(AtomicUsize::new(0));
//! let h = hits.clone();
//! checked.add_listener_when_value(true, move |_| {
//!     h.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! checked.set(true);
//! checked.set(true); // no change, no dispatch
//! checked.set(false);
//! assert_eq!(hits.load(Ordering::Relaxed), 1);
//! assert_eq!(checked.previous(), &true);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

/// Handle returned when adding a listener; pass it to [`StateEvent::remove_listener`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(u32);

type Predicate<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;
type Callback<T> = Box<dyn FnMut(&T) + Send>;

struct Registered<T> {
    handle: ListenerHandle,
    predicate: Predicate<T>,
    callback: Mutex<Callback<T>>,
    active: AtomicBool,
}

struct Listeners<T> {
    next_handle: u32,
    entries: Vec<Arc<Registered<T>>>,
    pending_removals: bool,
}

/// A change-notifying value. See the [module docs](self).
pub struct StateEvent<T> {
    value: T,
    previous: T,
    listeners: Mutex<Listeners<T>>,
}

impl<T: core::fmt::Debug> core::fmt::Debug for StateEvent<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("StateEvent")
            .field("value", &self.value)
            .field("previous", &self.previous)
            .field("listeners", &listeners.entries.len())
            .finish()
    }
}

impl<T: Clone + Default + PartialEq + 'static> Default for StateEvent<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> StateEvent<T> {
    /// Create with `initial` as both the current and previous value.
    pub fn new(initial: T) -> Self {
        Self {
            previous: initial.clone(),
            value: initial,
            listeners: Mutex::new(Listeners {
                next_handle: 1,
                entries: Vec::new(),
                pending_removals: false,
            }),
        }
    }

    /// Current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Value before the last change.
    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// Change the value and notify listeners. Setting the current value again does nothing.
    pub fn set(&mut self, value: T) -> bool {
        if !self.replace(value) {
            return false;
        }
        self.dispatch();
        true
    }

    /// Change the value without notifying anyone.
    pub fn clear_to(&mut self, value: T) {
        self.replace(value);
    }

    fn replace(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.previous = core::mem::replace(&mut self.value, value);
        true
    }

    /// Call `listener` on every change.
    pub fn add_listener(&self, listener: impl FnMut(&T) + Send + 'static) -> ListenerHandle {
        self.add(Box::new(|_: &T, _: &T| true), Box::new(listener))
    }

    /// Call `listener` whenever the value changes to `value`.
    pub fn add_listener_when_value(
        &self,
        value: T,
        listener: impl FnMut(&T) + Send + 'static,
    ) -> ListenerHandle
    where
        T: Send + Sync,
    {
        self.add(
            Box::new(move |new: &T, _: &T| *new == value),
            Box::new(listener),
        )
    }

    /// Call `listener` on changes for which `predicate(new, previous)` holds.
    pub fn add_listener_when(
        &self,
        predicate: impl Fn(&T, &T) -> bool + Send + Sync + 'static,
        listener: impl FnMut(&T) + Send + 'static,
    ) -> ListenerHandle {
        self.add(Box::new(predicate), Box::new(listener))
    }

    fn add(&self, predicate: Predicate<T>, callback: Callback<T>) -> ListenerHandle {
        let mut listeners = self.listeners.lock();
        let handle = ListenerHandle(listeners.next_handle);
        listeners.next_handle += 1;
        listeners.entries.push(Arc::new(Registered {
            handle,
            predicate,
            callback: Mutex::new(callback),
            active: AtomicBool::new(true),
        }));
        handle
    }

    /// Stop notifying a listener. It is dropped at the start of the next dispatch.
    pub fn remove_listener(&self, handle: ListenerHandle) {
        let mut listeners = self.listeners.lock();
        if let Some(entry) = listeners.entries.iter().find(|e| e.handle == handle) {
            entry.active.store(false, Ordering::Release);
            listeners.pending_removals = true;
        } else {
            tracing::debug!(?handle, "removing unknown listener");
        }
    }

    /// Number of registered listeners, including ones awaiting removal.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }

    fn dispatch(&self) {
        let snapshot: Vec<Arc<Registered<T>>> = {
            let mut listeners = self.listeners.lock();
            if listeners.pending_removals {
                listeners
                    .entries
                    .retain(|e| e.active.load(Ordering::Acquire));
                listeners.pending_removals = false;
            }
            listeners.entries.clone()
        };
        for entry in snapshot {
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }
            if (entry.predicate)(&self.value, &self.previous) {
                let mut callback = entry.callback.lock();
                (*callback)(&self.value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut(&i32) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move |_: &i32| {
            c.fetch_add(1, Ordering::Relaxed);
        })
    }

    #[test]
    fn dispatches_only_on_change() {
        let mut e = StateEvent::new(0);
        let (count, l) = counter();
        e.add_listener(l);
        assert!(e.set(1));
        assert!(!e.set(1));
        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!((*e.get(), *e.previous()), (1, 0));
    }

    #[test]
    fn clear_to_is_silent() {
        let mut e = StateEvent::new(0);
        let (count, l) = counter();
        e.add_listener(l);
        e.clear_to(5);
        assert_eq!(*e.get(), 5);
        assert_eq!(*e.previous(), 0);
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn predicates_gate_listeners() {
        let mut e = StateEvent::new(0);
        let (rising, l) = counter();
        e.add_listener_when(|new, prev| new > prev, l);
        e.set(3);
        e.set(1);
        e.set(2);
        assert_eq!(rising.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn removal_is_deferred_to_next_dispatch() {
        let mut e = StateEvent::new(0);
        let (count, l) = counter();
        let h = e.add_listener(l);
        e.remove_listener(h);
        assert_eq!(e.listener_count(), 1, "still present until the next dispatch");
        e.set(1);
        assert_eq!(e.listener_count(), 0);
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn handles_are_unique() {
        let e = StateEvent::new(0);
        let a = e.add_listener(|_| {});
        let b = e.add_listener(|_| {});
        assert_ne!(a, b);
    }
}
