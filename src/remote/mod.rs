//! Query and mutation interfaces of the remote data service.
//!
//! Records cross this boundary as opaque [`serde_json::Value`]s and only take
//! a shape inside the [`normalizer`](crate::normalizer).

pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::Result;
use crate::domain::SavedRelation;

pub use http::HttpService;

pub const CATEGORIES_WITH_LATEST_ARTICLE: &str = "categories_with_latest_article";
pub const PULSES: &str = "pulses";
pub const SAVED_PULSES: &str = "saved_pulses";
pub const ARTICLES: &str = "articles";
pub const DASHBOARD_STATS_RPC: &str = "get_dashboard_stats";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// A window into a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// Zero-based page `index` of `per_page` rows.
    pub fn new(index: u64, per_page: u64) -> Self {
        Self {
            offset: index.saturating_mul(per_page),
            limit: per_page,
        }
    }
}

/// An equality-filtered, optionally ordered and paged read of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub collection: String,
    pub select: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub page: Option<Page>,
    /// Exactly one row expected; zero rows is an error.
    pub single: bool,
}

impl Query {
    pub fn table(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            select: "*".into(),
            filters: Vec::new(),
            order: None,
            page: None,
            single: false,
        }
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = select.into();
        self
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(Order {
            field: field.into(),
            ascending: false,
        });
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn filter_value(&self, field: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.value.as_str())
    }
}

#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn query(&self, query: &Query) -> Result<Vec<Value>>;

    async fn call(&self, procedure: &str, args: &Value) -> Result<Vec<Value>>;
}

#[async_trait]
pub trait MutationService: Send + Sync {
    async fn insert_relation(&self, relation: &SavedRelation) -> Result<()>;

    async fn delete_relation(&self, relation: &SavedRelation) -> Result<()>;
}

/// Flattens a response body into a record list: arrays are spread, `null`
/// is empty, anything else is a single record.
pub fn into_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
