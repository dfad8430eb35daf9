use std::sync::{Arc, Mutex};

use crate::app::sync::lock;
use crate::app::{AppContext, Result};
use crate::domain::Pulse;
use crate::fetcher::FetchGeneration;
use crate::mutation::ToggleOutcome;
use crate::query::{QueryState, SortKey, PULSE_FIELDS};
use crate::session::Subscription;
use crate::view::{refresh_on_session_change, LoadStatus};

struct FeedState {
    pulses: Arc<Vec<Pulse>>,
    query: QueryState,
}

/// The searchable, sortable pulse feed.
pub struct PulseFeedView {
    ctx: Arc<AppContext>,
    generation: FetchGeneration,
    state: Mutex<FeedState>,
}

impl PulseFeedView {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let sort = ctx.config.feed.default_sort;
        Self {
            ctx,
            generation: FetchGeneration::new(),
            state: Mutex::new(FeedState {
                pulses: Arc::new(Vec::new()),
                query: QueryState::new(sort),
            }),
        }
    }

    /// Refetches pulses, personalized for whoever is signed in now.
    pub async fn refresh(&self) -> LoadStatus {
        let ticket = self.generation.issue();
        let user_id = self.ctx.session.user_id();
        let pulses = self.ctx.fetcher.pulses(user_id.as_deref()).await;

        if !self.generation.is_current(ticket) {
            tracing::debug!("Discarding stale pulse feed response");
            return LoadStatus::Stale;
        }

        self.ctx.mutations.seed(
            pulses
                .iter()
                .filter_map(|p| p.is_saved.map(|saved| (p.id.clone(), saved))),
        );
        lock(&self.state).pulses = Arc::new(pulses);
        LoadStatus::Applied
    }

    /// Refreshes whenever the session changes, until the handle is dropped.
    pub fn follow_session(self: &Arc<Self>) -> Result<Subscription> {
        refresh_on_session_change(self, &self.ctx.session, |view| async move {
            view.refresh().await;
        })
    }

    pub fn trigger_search(&self, text: impl Into<String>) {
        lock(&self.state).query.trigger_search(text);
    }

    pub fn trigger_sort(&self, key: SortKey) -> SortKey {
        lock(&self.state).query.trigger_sort(key)
    }

    pub fn sort_key(&self) -> SortKey {
        lock(&self.state).query.sort_key()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pulses matching the search, in the active order, each carrying the
    /// live saved flag.
    pub fn visible(&self) -> Vec<Pulse> {
        let (pulses, query) = {
            let state = lock(&self.state);
            (state.pulses.clone(), state.query.clone())
        };
        let signed_in = self.ctx.session.is_signed_in();

        query
            .apply(pulses.as_slice(), PULSE_FIELDS)
            .into_iter()
            .map(|p| {
                let mut pulse = p.clone();
                pulse.is_saved = signed_in.then(|| self.ctx.mutations.is_saved(&pulse.id));
                pulse
            })
            .collect()
    }

    pub fn is_saved(&self, pulse_id: &str) -> bool {
        self.ctx.mutations.is_saved(pulse_id)
    }

    pub async fn toggle_save(&self, pulse_id: &str) -> Result<ToggleOutcome> {
        self.ctx.mutations.toggle_save(pulse_id).await
    }

    pub fn close(&self) {
        self.generation.invalidate();
    }
}
