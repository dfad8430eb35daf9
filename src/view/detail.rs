use std::sync::{Arc, Mutex};

use crate::app::sync::lock;
use crate::app::{AppContext, PulseError, Result};
use crate::domain::Pulse;
use crate::fetcher::FetchGeneration;
use crate::mutation::ToggleOutcome;
use crate::session::Subscription;
use crate::view::{refresh_on_session_change, LoadStatus};

#[derive(Default)]
struct DetailState {
    slug: Option<String>,
    pulse: Option<Pulse>,
}

/// A single pulse, looked up by the slug of the current route.
pub struct PulseDetailView {
    ctx: Arc<AppContext>,
    generation: FetchGeneration,
    state: Mutex<DetailState>,
}

impl PulseDetailView {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            generation: FetchGeneration::new(),
            state: Mutex::new(DetailState::default()),
        }
    }

    /// Navigates to `slug`. A response for an earlier slug that arrives
    /// after this call is discarded.
    pub async fn load(&self, slug: &str) -> LoadStatus {
        let ticket = self.generation.issue();
        lock(&self.state).slug = Some(slug.to_string());

        let user_id = self.ctx.session.user_id();
        let pulse = self.ctx.fetcher.pulse(slug, user_id.as_deref()).await;

        if !self.generation.is_current(ticket) {
            tracing::debug!("Discarding stale response for pulse {}", slug);
            return LoadStatus::Stale;
        }

        if let Some(saved) = pulse.as_ref().and_then(|p| p.is_saved.map(|s| (p.id.clone(), s))) {
            self.ctx.mutations.seed(std::iter::once(saved));
        }
        lock(&self.state).pulse = pulse;
        LoadStatus::Applied
    }

    /// Reloads the current slug, if any.
    pub async fn reload(&self) -> LoadStatus {
        let slug = lock(&self.state).slug.clone();
        match slug {
            Some(slug) => self.load(&slug).await,
            None => LoadStatus::Applied,
        }
    }

    pub fn follow_session(self: &Arc<Self>) -> Result<Subscription> {
        refresh_on_session_change(self, &self.ctx.session, |view| async move {
            view.reload().await;
        })
    }

    /// The displayed pulse with its live saved flag.
    pub fn pulse(&self) -> Option<Pulse> {
        let mut pulse = lock(&self.state).pulse.clone()?;
        pulse.is_saved = self
            .ctx
            .session
            .is_signed_in()
            .then(|| self.ctx.mutations.is_saved(&pulse.id));
        Some(pulse)
    }

    pub async fn toggle_save(&self) -> Result<ToggleOutcome> {
        let pulse_id = lock(&self.state)
            .pulse
            .as_ref()
            .map(|p| p.id.clone())
            .ok_or_else(|| PulseError::PulseNotFound("no pulse displayed".into()))?;
        self.ctx.mutations.toggle_save(&pulse_id).await
    }

    /// Stops acting on in-flight responses.
    pub fn close(&self) {
        self.generation.invalidate();
    }
}
