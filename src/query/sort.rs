use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Article, Pulse};

pub trait Sortable {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
    fn views(&self) -> u64;
}

impl Sortable for Pulse {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    fn views(&self) -> u64 {
        self.views
    }
}

impl Sortable for Article {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published_at
    }

    fn views(&self) -> u64 {
        self.views
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first; undated items last.
    #[default]
    Recent,
    /// Most viewed first; ties keep their `Recent` order.
    Popular,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Recent => write!(f, "recent"),
            SortKey::Popular => write!(f, "popular"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recent" => Ok(SortKey::Recent),
            "popular" => Ok(SortKey::Popular),
            other => Err(format!("Unknown sort key: {}. Use 'recent' or 'popular'", other)),
        }
    }
}

/// A new ordering of `items`; the source collection is untouched.
pub fn sort<'a, T, I>(items: I, key: SortKey) -> Vec<&'a T>
where
    T: Sortable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sorted: Vec<&'a T> = items.into_iter().collect();
    // `sort_by` is stable, so the popular pass keeps recent order among ties.
    sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    if key == SortKey::Popular {
        sorted.sort_by(|a, b| b.views().cmp(&a.views()));
    }
    sorted
}

/// The active sort key of a listing.
///
/// Selecting the key that is already active resets to [`SortKey::Recent`]
/// instead of reversing the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    active: SortKey,
}

impl SortState {
    pub fn new(active: SortKey) -> Self {
        Self { active }
    }

    pub fn active(&self) -> SortKey {
        self.active
    }

    pub fn trigger(&mut self, key: SortKey) -> SortKey {
        self.active = if self.active == key { SortKey::Recent } else { key };
        self.active
    }
}
