use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatsOrigin {
    /// Precomputed by the remote service.
    Service,
    /// Reduced locally from fetched categories.
    #[default]
    Derived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_articles: u64,
    pub total_views: u64,
    pub total_categories: u64,
    pub origin: StatsOrigin,
}
