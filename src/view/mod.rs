//! Screen-level view models: the presentation interface.
//!
//! Each view owns the normalized entities of its screen, its query state and
//! a [`FetchGeneration`](crate::fetcher::FetchGeneration). Readers get cloned
//! snapshots, recomputed from current state on every call.

pub mod account;
pub mod detail;
pub mod feed;
pub mod home;

use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::app::{PulseError, Result};
use crate::session::{SessionStore, Subscription};

pub use account::AccountView;
pub use detail::PulseDetailView;
pub use feed::PulseFeedView;
pub use home::HomeView;

/// What happened to a fetch response when it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Applied,
    /// A newer fetch was issued, or the view closed, while this one was in
    /// flight. The response was dropped.
    Stale,
}

/// Re-runs `refresh` on the current runtime after every session change for
/// as long as the returned subscription lives. Holds `view` weakly.
pub(crate) fn refresh_on_session_change<V, F, Fut>(
    view: &Arc<V>,
    session: &SessionStore,
    refresh: F,
) -> Result<Subscription>
where
    V: Send + Sync + 'static,
    F: Fn(Arc<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let handle = Handle::try_current()
        .map_err(|e| PulseError::Other(format!("no async runtime to refresh on: {}", e)))?;
    let weak = Arc::downgrade(view);

    Ok(session.subscribe(move |_| {
        if let Some(view) = weak.upgrade() {
            handle.spawn(refresh(view));
        }
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use crate::app::AppContext;
    use crate::config::Config;
    use crate::domain::Session;
    use crate::session::{LocalIdentity, SessionStore};
    use crate::testing::{FakeMutations, FakeService};

    pub(crate) struct Harness {
        pub ctx: Arc<AppContext>,
        pub identity: Arc<LocalIdentity>,
        pub service: Arc<FakeService>,
        pub mutations: Arc<FakeMutations>,
    }

    pub(crate) async fn harness(
        signed_in: bool,
        service: FakeService,
        mutations: FakeMutations,
    ) -> Harness {
        let session = signed_in.then(|| Session::new("u1", "t1", "a@example.com"));
        let identity = Arc::new(LocalIdentity::with_session(session));
        let store = SessionStore::start(identity.clone()).await;
        let service = Arc::new(service);
        let mutations = Arc::new(mutations);
        let ctx = AppContext::assemble(
            Config::default(),
            store,
            service.clone(),
            mutations.clone(),
        );
        Harness {
            ctx: Arc::new(ctx),
            identity,
            service,
            mutations,
        }
    }

    /// Yields until `done` holds, for tasks spawned from session callbacks.
    pub(crate) async fn settle(mut done: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if done() {
                return true;
            }
            tokio::task::yield_now().await;
        }
        done()
    }
}
