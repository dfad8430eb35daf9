//! Per-screen reads against the remote service.
//!
//! Each screen's queries are issued together and joined before
//! normalization. Failures stop here: they are logged and the screen gets an
//! empty collection or fallback stats instead.

pub mod generation;

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::aggregator;
use crate::app::Result;
use crate::domain::{Article, Category, DashboardStats, Pulse, SavedPulse};
use crate::normalizer::Normalizer;
use crate::remote::{
    Page, Query, RemoteService, ARTICLES, CATEGORIES_WITH_LATEST_ARTICLE, DASHBOARD_STATS_RPC,
    PULSES, SAVED_PULSES,
};

pub use generation::{FetchGeneration, Ticket};

const PULSE_SELECT: &str = "*, categories ( name, color, gradient )";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeData {
    pub categories: Vec<Category>,
    pub stats: DashboardStats,
}

#[derive(Clone)]
pub struct DataFetcher {
    service: Arc<dyn RemoteService>,
    normalizer: Normalizer,
}

impl DataFetcher {
    pub fn new(service: Arc<dyn RemoteService>, normalizer: Normalizer) -> Self {
        Self {
            service,
            normalizer,
        }
    }

    /// Categories with their latest articles, plus dashboard stats.
    pub async fn home(&self) -> HomeData {
        let categories_query =
            Query::table(CATEGORIES_WITH_LATEST_ARTICLE).order_desc("latest_article_date");
        let args = json!({});

        let (categories, stats) = tokio::join!(
            self.service.query(&categories_query),
            self.service.call(DASHBOARD_STATS_RPC, &args),
        );

        let categories = self
            .records("categories", categories)
            .map(|r| self.normalizer.normalize_categories(r).items)
            .unwrap_or_default();
        let service_stats = self
            .records("dashboard stats", stats)
            .and_then(|r| self.normalizer.normalize_stats(r));

        if service_stats.is_none() {
            debug!("Deriving dashboard stats from {} categories", categories.len());
        }
        let stats = aggregator::resolve(service_stats, &categories);

        info!("Loaded {} categories", categories.len());
        HomeData { categories, stats }
    }

    /// Every pulse, newest first, flagged for `user_id` when given.
    pub async fn pulses(&self, user_id: Option<&str>) -> Vec<Pulse> {
        let query = Query::table(PULSES)
            .select(PULSE_SELECT)
            .order_desc("published_date");

        let (pulses, saved) = tokio::join!(self.service.query(&query), self.saved_ids(user_id));

        let mut pulses = self
            .records("pulses", pulses)
            .map(|r| self.normalizer.normalize_pulses(r).items)
            .unwrap_or_default();
        mark_saved(&mut pulses, saved.as_ref());

        info!("Loaded {} pulses", pulses.len());
        pulses
    }

    /// The pulse at `slug`, or `None` when it does not exist or the read
    /// failed.
    pub async fn pulse(&self, slug: &str, user_id: Option<&str>) -> Option<Pulse> {
        let query = Query::table(PULSES)
            .select(PULSE_SELECT)
            .eq("slug", slug)
            .single();

        let (pulse, saved) = tokio::join!(self.service.query(&query), self.saved_ids(user_id));

        let mut pulses = self
            .records("pulse", pulse)
            .map(|r| self.normalizer.normalize_pulses(r).items)
            .unwrap_or_default();
        mark_saved(&mut pulses, saved.as_ref());

        let pulse = pulses.into_iter().next();
        if pulse.is_none() {
            info!("No pulse at slug {}", slug);
        }
        pulse
    }

    /// Bookmarks of `user_id`, joined with their pulses.
    pub async fn saved(&self, user_id: &str) -> Vec<SavedPulse> {
        let query = Query::table(SAVED_PULSES)
            .select("pulse_id, pulses ( id, title, blurb )")
            .eq("user_id", user_id);

        let result = self.service.query(&query).await;
        self.records("saved pulses", result)
            .map(|r| self.normalizer.normalize_saved(user_id, r).items)
            .unwrap_or_default()
    }

    pub async fn recent_articles(&self, page: Page) -> Vec<Article> {
        let query = Query::table(ARTICLES)
            .select("*, categories ( name )")
            .order_desc("scraped_date")
            .page(page);

        let result = self.service.query(&query).await;
        self.records("articles", result)
            .map(|r| self.normalizer.normalize_articles(r).items)
            .unwrap_or_default()
    }

    /// IDs of the pulses `user_id` has bookmarked, keyed on the relation
    /// alone. Unlike the other reads, a failure is returned to the caller.
    pub async fn pulse_ids_saved_by(&self, user_id: &str) -> Result<HashSet<String>> {
        let query = Query::table(SAVED_PULSES)
            .select("pulse_id")
            .eq("user_id", user_id);

        let records = self.service.query(&query).await?;
        Ok(self.normalizer.saved_pulse_ids(records))
    }

    async fn saved_ids(&self, user_id: Option<&str>) -> Option<HashSet<String>> {
        let result = self.pulse_ids_saved_by(user_id?).await;
        self.records("saved pulse ids", result)
    }

    fn records<T>(&self, what: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(records) => Some(records),
            Err(e) => {
                error!("Error fetching {}: {}", what, e);
                None
            }
        }
    }
}

/// Personalizes `pulses`; without a saved set the flag stays unknown.
fn mark_saved(pulses: &mut [Pulse], saved: Option<&HashSet<String>>) {
    if let Some(saved) = saved {
        for pulse in pulses {
            pulse.is_saved = Some(saved.contains(&pulse.id));
        }
    }
}
