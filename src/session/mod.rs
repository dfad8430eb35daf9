//! Current identity and its change notifications.
//!
//! [`SessionStore`] is started once per run. It asks the provider for an
//! existing session a single time, then follows provider-pushed changes until
//! [`SessionStore::teardown`]. It never triggers fetches itself: views that
//! need personalized data subscribe and refresh on their own.

pub mod observers;
pub mod provider;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use crate::app::sync::lock;
use crate::app::Result;
use crate::domain::Session;

pub use observers::{ObserverList, SessionCallback, Subscription};
pub use provider::{IdentityProvider, LocalIdentity};

pub struct SessionStore {
    current: Mutex<Option<Session>>,
    observers: ObserverList,
    provider: Arc<dyn IdentityProvider>,
    provider_subscription: Mutex<Option<Subscription>>,
    active: AtomicBool,
}

impl SessionStore {
    pub async fn start(provider: Arc<dyn IdentityProvider>) -> Arc<Self> {
        let initial = match provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to read existing session: {}", e);
                None
            }
        };

        let store = Arc::new(Self {
            current: Mutex::new(initial),
            observers: ObserverList::new(),
            provider: provider.clone(),
            provider_subscription: Mutex::new(None),
            active: AtomicBool::new(true),
        });

        let weak = Arc::downgrade(&store);
        let subscription = provider.on_session_change(Arc::new(move |session: Option<&Session>| {
            if let Some(store) = weak.upgrade() {
                store.apply(session.cloned());
            }
        }));
        *lock(&store.provider_subscription) = Some(subscription);

        store
    }

    pub fn current(&self) -> Option<Session> {
        lock(&self.current).clone()
    }

    pub fn user_id(&self) -> Option<String> {
        lock(&self.current).as_ref().map(|s| s.user_id.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        lock(&self.current).is_some()
    }

    /// Registers `callback` for every later change. The current value is not
    /// replayed; read it with [`current`](Self::current).
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        self.observers.subscribe(Arc::new(callback))
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await
    }

    /// Stops following the provider. Later provider pushes are ignored.
    pub fn teardown(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(subscription) = lock(&self.provider_subscription).take() {
            subscription.unsubscribe();
        }
        debug!("Session store torn down");
    }

    fn apply(&self, session: Option<Session>) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        {
            let mut current = lock(&self.current);
            if *current == session {
                return;
            }
            *current = session.clone();
        }

        match &session {
            Some(s) => info!("Session changed to {}", s.email),
            None => info!("Signed out"),
        }
        self.observers.notify(session.as_ref());
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(subscription) = lock(&self.provider_subscription).take() {
            subscription.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (
        Arc<Mutex<Vec<Option<String>>>>,
        impl Fn(Option<&Session>) + Send + Sync + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback = move |s: Option<&Session>| {
            lock(&sink).push(s.map(|s| s.user_id.clone()));
        };
        (seen, callback)
    }

    #[tokio::test]
    async fn test_start_reads_existing_session() {
        let provider = Arc::new(LocalIdentity::with_session(Some(Session::new(
            "u1",
            "t1",
            "a@example.com",
        ))));
        let store = SessionStore::start(provider).await;

        assert_eq!(store.user_id().as_deref(), Some("u1"));
        assert!(store.is_signed_in());
    }

    #[tokio::test]
    async fn test_delivers_replacement_and_sign_out() {
        let provider = Arc::new(LocalIdentity::with_session(Some(Session::new(
            "u1",
            "t1",
            "a@example.com",
        ))));
        let store = SessionStore::start(provider.clone()).await;
        let (seen, callback) = recorder();
        let _sub = store.subscribe(callback);

        provider.sign_in(Session::new("u2", "t2", "b@example.com"));
        store.sign_out().await.unwrap();

        assert_eq!(*lock(&seen), vec![Some("u2".to_string()), None]);
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn test_identical_push_is_not_rebroadcast() {
        let session = Session::new("u1", "t1", "a@example.com");
        let provider = Arc::new(LocalIdentity::with_session(Some(session.clone())));
        let store = SessionStore::start(provider.clone()).await;
        let (seen, callback) = recorder();
        let _sub = store.subscribe(callback);

        provider.sign_in(session);

        assert!(lock(&seen).is_empty());
    }

    #[tokio::test]
    async fn test_dropped_subscription_receives_nothing() {
        let provider = Arc::new(LocalIdentity::new());
        let store = SessionStore::start(provider.clone()).await;
        let (seen, callback) = recorder();
        let sub = store.subscribe(callback);
        drop(sub);

        provider.sign_in(Session::new("u1", "t1", "a@example.com"));

        assert!(lock(&seen).is_empty());
        assert!(store.is_signed_in());
    }

    #[tokio::test]
    async fn test_teardown_ignores_later_pushes() {
        let provider = Arc::new(LocalIdentity::new());
        let store = SessionStore::start(provider.clone()).await;
        let (seen, callback) = recorder();
        let _sub = store.subscribe(callback);

        store.teardown();
        provider.sign_in(Session::new("u1", "t1", "a@example.com"));

        assert!(lock(&seen).is_empty());
        assert!(!store.is_signed_in());
    }
}
