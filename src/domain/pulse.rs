use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub category: String,
    pub category_color: String,
    pub category_gradient: String,
    pub published_at: Option<DateTime<Utc>>,
    pub views: u64,
    pub content: String,
    pub blurb: String,
    /// `None` when fetched without an identity.
    pub is_saved: Option<bool>,
}

impl Pulse {
    pub fn display_date(&self) -> String {
        self.published_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "----------".into())
    }
}

/// A bookmark: the pair (identity, pulse).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedRelation {
    pub user_id: String,
    pub pulse_id: String,
}

impl SavedRelation {
    pub fn new(user_id: impl Into<String>, pulse_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            pulse_id: pulse_id.into(),
        }
    }
}

/// A bookmark joined with the pulse fields the account screen lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPulse {
    pub relation: SavedRelation,
    pub title: String,
    pub blurb: String,
}
