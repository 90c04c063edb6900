//! Single-writer observable value holder.
//!
//! # Responsibility
//! - Hold the latest snapshot of a value and notify listeners on replacement.
//!
//! # Invariants
//! - Every `set` is a full replacement: readers only ever see whole snapshots.
//! - `version` increments exactly once per `set`.
//! - Listeners run synchronously, in registration order, on the writer's
//!   thread, after the new value is visible through `get`.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

type Listener<T> = Box<dyn Fn(&Arc<T>) + Send + Sync>;

/// Handle returned by [`Observable::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Observable<T> {
    value: Arc<T>,
    version: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
            version: 0,
            next_subscription: 0,
            listeners: Vec::new(),
        }
    }

    /// Returns the current snapshot.
    pub fn get(&self) -> Arc<T> {
        Arc::clone(&self.value)
    }

    /// Number of replacements since construction.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the value and notifies every listener.
    pub fn set(&mut self, value: T) {
        self.value = Arc::new(value);
        self.version += 1;
        for (_, listener) in &self.listeners {
            listener(&self.value);
        }
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&Arc<T>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(current, _)| *current != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("version", &self.version)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Observable;
    use std::sync::{Arc, Mutex};

    #[test]
    fn set_replaces_value_and_bumps_version() {
        let mut observable = Observable::new(vec![1, 2]);
        let before = observable.get();
        observable.set(vec![3]);
        assert_eq!(*before, vec![1, 2]);
        assert_eq!(*observable.get(), vec![3]);
        assert_eq!(observable.version(), 1);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut observable = Observable::new(0_u32);

        let first = Arc::clone(&seen);
        observable.subscribe(move |value| first.lock().unwrap().push(("first", **value)));
        let second = Arc::clone(&seen);
        observable.subscribe(move |value| second.lock().unwrap().push(("second", **value)));

        observable.set(7);
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let hits = Arc::new(Mutex::new(0));
        let mut observable = Observable::new(());
        let counter = Arc::clone(&hits);
        let id = observable.subscribe(move |_| *counter.lock().unwrap() += 1);

        observable.set(());
        assert!(observable.unsubscribe(id));
        assert!(!observable.unsubscribe(id));
        observable.set(());

        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(observable.listener_count(), 0);
    }
}
