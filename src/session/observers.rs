use std::sync::{Arc, Mutex, Weak};

use crate::app::sync::lock;
use crate::domain::Session;

pub type SessionCallback = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

/// Disposal handle returned by every session registration.
///
/// Dropping the handle unsubscribes; `unsubscribe` does the same explicitly.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(dispose: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.dispose_now();
    }

    fn dispose_now(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose_now();
    }
}

#[derive(Default)]
struct Entries {
    next_id: u64,
    callbacks: Vec<(u64, SessionCallback)>,
}

/// Ordered list of session observers.
#[derive(Default)]
pub struct ObserverList {
    entries: Arc<Mutex<Entries>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: SessionCallback) -> Subscription {
        let id = {
            let mut entries = lock(&self.entries);
            let id = entries.next_id;
            entries.next_id += 1;
            entries.callbacks.push((id, callback));
            id
        };

        let weak: Weak<Mutex<Entries>> = Arc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = weak.upgrade() {
                lock(&entries).callbacks.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Delivers `session` to every registered observer, in registration order.
    ///
    /// Callbacks run outside the lock, so an observer may subscribe or
    /// unsubscribe from inside its own callback.
    pub fn notify(&self, session: Option<&Session>) {
        let callbacks: Vec<SessionCallback> = lock(&self.entries)
            .callbacks
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in callbacks {
            callback(session);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
