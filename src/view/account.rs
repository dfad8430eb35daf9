use std::sync::{Arc, Mutex};

use crate::app::sync::lock;
use crate::app::{AppContext, Result};
use crate::domain::SavedPulse;
use crate::fetcher::FetchGeneration;
use crate::session::Subscription;
use crate::view::{refresh_on_session_change, LoadStatus};

/// The signed-in user's bookmarks.
pub struct AccountView {
    ctx: Arc<AppContext>,
    generation: FetchGeneration,
    saved: Mutex<Vec<SavedPulse>>,
}

impl AccountView {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            generation: FetchGeneration::new(),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Refetches bookmarks; signed out, the list is simply emptied.
    pub async fn refresh(&self) -> LoadStatus {
        let ticket = self.generation.issue();
        let saved = match self.ctx.session.user_id() {
            Some(user_id) => self.ctx.fetcher.saved(&user_id).await,
            None => Vec::new(),
        };

        if !self.generation.is_current(ticket) {
            return LoadStatus::Stale;
        }
        *lock(&self.saved) = saved;
        LoadStatus::Applied
    }

    pub fn follow_session(self: &Arc<Self>) -> Result<Subscription> {
        refresh_on_session_change(self, &self.ctx.session, |view| async move {
            view.refresh().await;
        })
    }

    pub fn saved(&self) -> Vec<SavedPulse> {
        lock(&self.saved).clone()
    }

    pub fn email(&self) -> Option<String> {
        self.ctx.session.current().map(|s| s.email)
    }

    pub fn close(&self) {
        self.generation.invalidate();
    }
}
