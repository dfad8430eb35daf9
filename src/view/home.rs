use std::sync::{Arc, Mutex};

use crate::app::sync::lock;
use crate::app::AppContext;
use crate::domain::{Category, DashboardStats};
use crate::fetcher::{FetchGeneration, HomeData};
use crate::query::{search, CATEGORY_FIELDS};
use crate::view::LoadStatus;

#[derive(Default)]
struct HomeState {
    data: Arc<HomeData>,
    search: String,
    loaded: bool,
}

/// Category overview with dashboard stats.
pub struct HomeView {
    ctx: Arc<AppContext>,
    generation: FetchGeneration,
    state: Mutex<HomeState>,
}

impl HomeView {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            generation: FetchGeneration::new(),
            state: Mutex::new(HomeState::default()),
        }
    }

    pub async fn refresh(&self) -> LoadStatus {
        let ticket = self.generation.issue();
        let data = self.ctx.fetcher.home().await;

        if !self.generation.is_current(ticket) {
            tracing::debug!("Discarding stale home response");
            return LoadStatus::Stale;
        }

        let mut state = lock(&self.state);
        state.data = Arc::new(data);
        state.loaded = true;
        LoadStatus::Applied
    }

    pub fn is_loaded(&self) -> bool {
        lock(&self.state).loaded
    }

    pub fn trigger_search(&self, text: impl Into<String>) {
        lock(&self.state).search = text.into();
    }

    pub fn search_text(&self) -> String {
        lock(&self.state).search.clone()
    }

    /// Categories matching the current search, in service order.
    pub fn categories(&self) -> Vec<Category> {
        let (data, query) = {
            let state = lock(&self.state);
            (state.data.clone(), state.search.clone())
        };
        search(&data.categories, &query, CATEGORY_FIELDS)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> DashboardStats {
        lock(&self.state).data.stats
    }

    pub fn close(&self) {
        self.generation.invalidate();
    }
}
