use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::sync::lock;
use crate::app::Result;
use crate::domain::Session;
use crate::session::observers::{ObserverList, SessionCallback, Subscription};

/// The identity/session collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Registers for every later session change, including sign-out.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;

    async fn sign_out(&self) -> Result<()>;
}

/// Identity provider holding its session in process.
///
/// Backs the CLI (seeded from a token in the config file) and the tests.
#[derive(Default)]
pub struct LocalIdentity {
    session: Mutex<Option<Session>>,
    observers: ObserverList,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Option<Session>) -> Self {
        Self {
            session: Mutex::new(session),
            observers: ObserverList::new(),
        }
    }

    pub fn sign_in(&self, session: Session) {
        self.replace(Some(session));
    }

    fn replace(&self, session: Option<Session>) {
        *lock(&self.session) = session.clone();
        self.observers.notify(session.as_ref());
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(lock(&self.session).clone())
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        self.observers.subscribe(callback)
    }

    async fn sign_out(&self) -> Result<()> {
        self.replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sign_in_and_out_notifies() {
        let identity = LocalIdentity::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = identity.on_session_change(Arc::new(move |s: Option<&Session>| {
            lock(&sink).push(s.map(|s| s.user_id.clone()));
        }));

        identity.sign_in(Session::new("u1", "t1", "a@example.com"));
        identity.sign_out().await.unwrap();

        assert_eq!(*lock(&seen), vec![Some("u1".to_string()), None]);
        assert!(identity.current_session().await.unwrap().is_none());
    }

    #[test]
    fn test_with_session_reports_it() {
        let identity = LocalIdentity::with_session(Some(Session::new("u1", "t1", "a@example.com")));

        let current = tokio_test::block_on(identity.current_session()).unwrap();

        assert_eq!(current.map(|s| s.user_id), Some("u1".to_string()));
    }
}
