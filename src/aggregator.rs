//! Derived statistics over normalized entities.

use crate::domain::{Article, Category, DashboardStats, StatsOrigin};

pub fn total_views(articles: &[Article]) -> u64 {
    articles.iter().map(|a| a.views).sum()
}

/// Dashboard totals reduced from `categories`.
pub fn aggregate(categories: &[Category]) -> DashboardStats {
    DashboardStats {
        total_articles: categories.iter().map(|c| c.articles.len() as u64).sum(),
        total_views: categories.iter().map(|c| total_views(&c.articles)).sum(),
        total_categories: categories.len() as u64,
        origin: StatsOrigin::Derived,
    }
}

/// Service stats win when present; the local reduction is only a fallback.
///
/// The two need not agree: the service counts rows the client never fetched.
pub fn resolve(service: Option<DashboardStats>, categories: &[Category]) -> DashboardStats {
    service.unwrap_or_else(|| aggregate(categories))
}
