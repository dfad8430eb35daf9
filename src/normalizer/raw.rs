//! Wire shapes of records as the data service returns them.
//!
//! Every field is optional. Joins may arrive as an object, an array, or
//! `null`, and identifiers as numbers or strings.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Int(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// A count that may come back as an integer, a float or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawCount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawCount {
    /// Negative or unparseable counts clamp to zero.
    pub fn to_u64(&self) -> u64 {
        match self {
            RawCount::Int(n) => (*n).max(0) as u64,
            RawCount::Float(f) if f.is_finite() && *f > 0.0 => *f as u64,
            RawCount::Float(_) => 0,
            RawCount::Text(s) => s.trim().parse::<i64>().map(|n| n.max(0) as u64).unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }

    /// To-one joins: the first element wins.
    pub fn into_first(self) -> Option<T> {
        self.into_vec().into_iter().next()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCategoryRef {
    pub name: Option<String>,
    pub color: Option<String>,
    pub gradient: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub scraped_date: Option<String>,
    pub published_date: Option<String>,
    pub published_at: Option<String>,
    pub created_at: Option<String>,
    pub view_count: Option<RawCount>,
    pub views: Option<RawCount>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub categories: Option<OneOrMany<RawCategoryRef>>,
}

impl RawArticle {
    pub fn timestamp(&self) -> Option<&str> {
        self.scraped_date
            .as_deref()
            .or(self.published_date.as_deref())
            .or(self.published_at.as_deref())
            .or(self.created_at.as_deref())
    }

    pub fn view_count(&self) -> u64 {
        self.view_count
            .as_ref()
            .or(self.views.as_ref())
            .map(RawCount::to_u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCategory {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub gradient: Option<String>,
    pub summary: Option<String>,
    /// Decoded one by one, so a bad article drops alone.
    pub articles: Option<OneOrMany<serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPulse {
    pub id: Option<RawId>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub blurb: Option<String>,
    pub content: Option<String>,
    pub view_count: Option<RawCount>,
    pub views: Option<RawCount>,
    pub published_date: Option<String>,
    pub created_at: Option<String>,
    pub category: Option<String>,
    pub categories: Option<OneOrMany<RawCategoryRef>>,
    pub is_saved: Option<bool>,
}

impl RawPulse {
    pub fn timestamp(&self) -> Option<&str> {
        self.published_date
            .as_deref()
            .or(self.created_at.as_deref())
    }

    pub fn view_count(&self) -> u64 {
        self.view_count
            .as_ref()
            .or(self.views.as_ref())
            .map(RawCount::to_u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawStats {
    pub total_articles: Option<RawCount>,
    pub total_views: Option<RawCount>,
    pub total_categories: Option<RawCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPulseSummary {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub blurb: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSavedRow {
    pub user_id: Option<RawId>,
    pub pulse_id: Option<RawId>,
    pub pulses: Option<OneOrMany<RawPulseSummary>>,
}
