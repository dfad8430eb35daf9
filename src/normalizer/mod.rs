pub mod defaults;
pub mod raw;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use html_escape::decode_html_entities;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::app::{PulseError, Result};
use crate::domain::{
    Article, Category, DashboardStats, Pulse, SavedPulse, SavedRelation, StatsOrigin,
};

use self::defaults::{ARTICLE, CATEGORY, PULSE};
use self::raw::{RawArticle, RawCategory, RawPulse, RawSavedRow, RawStats};

/// A problem found while normalizing one record. Never fatal for the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeIssue {
    /// The article was kept with a degraded source label.
    MalformedUrl {
        article_id: String,
        url: String,
        reason: String,
    },
    /// The record was dropped.
    MalformedRecord {
        entity: &'static str,
        index: usize,
        reason: String,
    },
}

impl fmt::Display for NormalizeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeIssue::MalformedUrl {
                article_id,
                url,
                reason,
            } => write!(f, "article {} has malformed url {:?}: {}", article_id, url, reason),
            NormalizeIssue::MalformedRecord {
                entity,
                index,
                reason,
            } => write!(f, "dropped {} record #{}: {}", entity, index, reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub items: Vec<T>,
    pub issues: Vec<NormalizeIssue>,
}

impl<T> Normalized<T> {
    fn new(items: Vec<T>, issues: Vec<NormalizeIssue>) -> Self {
        for issue in &issues {
            tracing::warn!("{}", issue);
        }
        Self { items, issues }
    }
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// Maps raw service records into fully populated domain entities.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_categories(&self, records: Vec<Value>) -> Normalized<Category> {
        let (raws, mut issues) = decode_all::<RawCategory>("category", records);
        let items = raws
            .into_iter()
            .map(|raw| self.category(raw, &mut issues))
            .collect();
        Normalized::new(items, issues)
    }

    /// Articles from a flat listing, each carrying its own category join.
    pub fn normalize_articles(&self, records: Vec<Value>) -> Normalized<Article> {
        let (raws, mut issues) = decode_all::<RawArticle>("article", records);
        let items = raws
            .into_iter()
            .map(|raw| {
                let category = raw
                    .category
                    .clone()
                    .and_then(non_blank)
                    .or_else(|| {
                        raw.categories
                            .clone()
                            .and_then(|c| c.into_first())
                            .and_then(|c| c.name)
                            .and_then(non_blank)
                    })
                    .unwrap_or_else(|| ARTICLE.category.to_string());
                self.article(raw, &category, &mut issues)
            })
            .collect();
        Normalized::new(items, issues)
    }

    pub fn normalize_pulses(&self, records: Vec<Value>) -> Normalized<Pulse> {
        let mut issues = Vec::new();
        let mut items = Vec::new();

        let (raws, decode_issues) = decode_indexed::<RawPulse>("pulse", records);
        issues.extend(decode_issues);

        for (index, raw) in raws {
            match self.pulse(raw) {
                Ok(pulse) => items.push(pulse),
                Err(e) => issues.push(NormalizeIssue::MalformedRecord {
                    entity: "pulse",
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        Normalized::new(items, issues)
    }

    /// The stats procedure returns a one-row set; `None` when it is empty.
    pub fn normalize_stats(&self, records: Vec<Value>) -> Option<DashboardStats> {
        let (raws, issues) = decode_all::<RawStats>("stats", records);
        for issue in &issues {
            tracing::warn!("{}", issue);
        }

        raws.into_iter().next().map(|raw| DashboardStats {
            total_articles: raw.total_articles.map(|c| c.to_u64()).unwrap_or(0),
            total_views: raw.total_views.map(|c| c.to_u64()).unwrap_or(0),
            total_categories: raw.total_categories.map(|c| c.to_u64()).unwrap_or(0),
            origin: StatsOrigin::Service,
        })
    }

    /// Bookmark rows for `user_id`, each joined with its pulse. Rows whose
    /// pulse no longer exists are dropped.
    pub fn normalize_saved(&self, user_id: &str, records: Vec<Value>) -> Normalized<SavedPulse> {
        let (raws, mut issues) = decode_indexed::<RawSavedRow>("saved pulse", records);
        let mut items = Vec::new();

        for (index, row) in raws {
            let summary = row.pulses.and_then(|p| p.into_first());
            let pulse_id = row
                .pulse_id
                .or_else(|| summary.as_ref().and_then(|s| s.id.clone()))
                .map(|id| id.into_string());

            let (Some(pulse_id), Some(summary)) = (pulse_id, summary) else {
                issues.push(NormalizeIssue::MalformedRecord {
                    entity: "saved pulse",
                    index,
                    reason: "missing joined pulse".into(),
                });
                continue;
            };

            let owner = row
                .user_id
                .map(|id| id.into_string())
                .unwrap_or_else(|| user_id.to_string());

            items.push(SavedPulse {
                relation: SavedRelation::new(owner, pulse_id),
                title: text(summary.title).unwrap_or_else(|| PULSE.title.to_string()),
                blurb: text(summary.blurb).unwrap_or_else(|| PULSE.blurb.to_string()),
            });
        }

        Normalized::new(items, issues)
    }

    /// Pulse IDs bookmarked in a `saved_pulses` listing.
    pub fn saved_pulse_ids(&self, records: Vec<Value>) -> HashSet<String> {
        let (raws, issues) = decode_all::<RawSavedRow>("saved pulse", records);
        for issue in &issues {
            tracing::warn!("{}", issue);
        }

        raws.into_iter()
            .filter_map(|row| {
                row.pulse_id.or_else(|| {
                    row.pulses
                        .and_then(|p| p.into_first())
                        .and_then(|summary| summary.id)
                })
            })
            .map(|id| id.into_string())
            .collect()
    }

    fn category(&self, raw: RawCategory, issues: &mut Vec<NormalizeIssue>) -> Category {
        let name = text(raw.name).unwrap_or_else(|| CATEGORY.name.to_string());
        let raw_description = text(raw.description);

        let (raw_articles, article_issues) = decode_all::<RawArticle>(
            "article",
            raw.articles.map(|a| a.into_vec()).unwrap_or_default(),
        );
        issues.extend(article_issues);

        let articles: Vec<Article> = raw_articles
            .into_iter()
            .map(|article| self.article(article, &name, issues))
            .collect();

        let total_views = crate::aggregator::total_views(&articles);

        Category {
            id: raw
                .id
                .map(|id| id.into_string())
                .unwrap_or_else(|| name.clone()),
            description: raw_description
                .clone()
                .unwrap_or_else(|| CATEGORY.description(&name)),
            summary: text(raw.summary)
                .or(raw_description)
                .unwrap_or_else(|| CATEGORY.summary(&name)),
            color: non_blank_opt(raw.color).unwrap_or_else(|| CATEGORY.color.to_string()),
            gradient: non_blank_opt(raw.gradient).unwrap_or_else(|| CATEGORY.gradient.to_string()),
            articles,
            total_views,
            name,
        }
    }

    fn article(&self, raw: RawArticle, category: &str, issues: &mut Vec<NormalizeIssue>) -> Article {
        let url = raw.url.clone().unwrap_or_default();
        let id = raw
            .id
            .clone()
            .map(|id| id.into_string())
            .unwrap_or_else(|| Article::fallback_id(&url));

        let source = match source_label(&url) {
            Ok(host) => host,
            Err(e) => {
                issues.push(NormalizeIssue::MalformedUrl {
                    article_id: id.clone(),
                    url: url.clone(),
                    reason: e.to_string(),
                });
                ARTICLE.source.to_string()
            }
        };

        let title = text(raw.title.clone()).unwrap_or_else(|| ARTICLE.title.to_string());

        Article {
            excerpt: text(raw.excerpt.clone()).unwrap_or_else(|| ARTICLE.excerpt(&title)),
            content: text(raw.content.clone()).unwrap_or_else(|| ARTICLE.content.to_string()),
            published_at: raw.timestamp().and_then(parse_timestamp),
            views: raw.view_count(),
            category: category.to_string(),
            id,
            title,
            url,
            source,
        }
    }

    fn pulse(&self, raw: RawPulse) -> Result<Pulse> {
        let id = raw
            .id
            .clone()
            .map(|id| id.into_string())
            .ok_or_else(|| PulseError::MalformedRecord("pulse without id".into()))?;

        let category = raw.categories.clone().and_then(|c| c.into_first());
        let (category_name, color, gradient) = match category {
            Some(c) => (text(c.name), non_blank_opt(c.color), non_blank_opt(c.gradient)),
            None => (None, None, None),
        };

        Ok(Pulse {
            slug: non_blank_opt(raw.slug.clone()).unwrap_or_else(|| id.clone()),
            title: text(raw.title.clone()).unwrap_or_else(|| PULSE.title.to_string()),
            category: category_name
                .or_else(|| text(raw.category.clone()))
                .unwrap_or_else(|| PULSE.category.to_string()),
            category_color: color.unwrap_or_else(|| PULSE.category_color.to_string()),
            category_gradient: gradient.unwrap_or_else(|| PULSE.category_gradient.to_string()),
            published_at: raw.timestamp().and_then(parse_timestamp),
            views: raw.view_count(),
            content: text(raw.content.clone()).unwrap_or_else(|| PULSE.content.to_string()),
            blurb: text(raw.blurb.clone()).unwrap_or_else(|| PULSE.blurb.to_string()),
            is_saved: raw.is_saved,
            id,
        })
    }
}

/// Hostname of `url`, the display source of an article.
pub fn source_label(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    parsed
        .host_str()
        .map(|h| h.to_string())
        .ok_or_else(|| PulseError::MalformedRecord(format!("url has no host: {}", url)))
}

/// Accepts RFC 3339, naive ISO timestamps (read as UTC) and bare dates.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| s.parse::<DateTime<Utc>>().ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn decode_all<R: DeserializeOwned>(
    entity: &'static str,
    records: Vec<Value>,
) -> (Vec<R>, Vec<NormalizeIssue>) {
    let (items, issues) = decode_indexed(entity, records);
    (items.into_iter().map(|(_, raw)| raw).collect(), issues)
}

/// Like [`decode_all`], keeping each record's position in `records`.
fn decode_indexed<R: DeserializeOwned>(
    entity: &'static str,
    records: Vec<Value>,
) -> (Vec<(usize, R)>, Vec<NormalizeIssue>) {
    let mut items = Vec::with_capacity(records.len());
    let mut issues = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<R>(record) {
            Ok(raw) => items.push((index, raw)),
            Err(e) => issues.push(NormalizeIssue::MalformedRecord {
                entity,
                index,
                reason: e.to_string(),
            }),
        }
    }

    (items, issues)
}

/// Entity-decoded display text; blank counts as absent.
fn text(value: Option<String>) -> Option<String> {
    value
        .and_then(non_blank)
        .map(|s| decode_html_entities(&s).to_string())
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

fn non_blank_opt(value: Option<String>) -> Option<String> {
    value.and_then(non_blank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_example() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![json!({
            "id": 1,
            "name": "AI",
            "description": null,
            "articles": [
                {"id": 10, "title": "X", "url": "https://news.example.com/x", "view_count": 10},
                {"id": 11, "title": "Y", "url": "https://blog.example.org/y", "view_count": 5}
            ]
        })]);

        assert!(out.issues.is_empty());
        let cat = &out.items[0];
        assert_eq!(cat.name, "AI");
        assert_eq!(cat.description, "AI");
        assert_eq!(cat.total_views, 15);
        assert_eq!(cat.articles.len(), 2);
        assert_eq!(
            cat.articles[0].excerpt,
            "An AI-generated summary for the article: X"
        );
        assert_eq!(cat.articles[0].source, "news.example.com");
        assert_eq!(cat.articles[1].category, "AI");
    }

    #[test]
    fn test_total_views_matches_article_sum() {
        let normalizer = Normalizer::new();
        let records = vec![
            json!({"name": "A", "articles": [{"url": "https://a.com", "views": 3}, {"url": "https://b.com", "view_count": "4"}]}),
            json!({"name": "B", "articles": []}),
            json!({"name": "C"}),
        ];
        for cat in normalizer.normalize_categories(records).items {
            let sum: u64 = cat.articles.iter().map(|a| a.views).sum();
            assert_eq!(cat.total_views, sum);
        }
    }

    #[test]
    fn test_missing_collections_are_empty() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![
            json!({"id": 1, "name": "Security"}),
            json!({"id": 2, "name": "Cloud", "articles": null}),
        ]);
        assert!(out.items.iter().all(|c| c.articles.is_empty()));
        assert!(out.items.iter().all(|c| c.total_views == 0));
    }

    #[test]
    fn test_category_defaults() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![json!({"id": 1, "name": "Cloud", "description": ""})]);
        let cat = &out.items[0];
        assert_eq!(cat.description, "Cloud");
        assert_eq!(cat.summary, "Insights and updates on Cloud.");
        assert_eq!(cat.color, defaults::NEUTRAL_COLOR);
        assert_eq!(cat.gradient, defaults::NEUTRAL_GRADIENT);
    }

    #[test]
    fn test_summary_falls_back_to_description() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![
            json!({"name": "Cloud", "description": "Clouds &amp; rain"}),
        ]);
        assert_eq!(out.items[0].description, "Clouds & rain");
        assert_eq!(out.items[0].summary, "Clouds & rain");
    }

    #[test]
    fn test_single_object_join_is_accepted() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![json!({
            "name": "AI",
            "articles": {"title": "Solo", "url": "https://solo.dev/post"}
        })]);
        assert_eq!(out.items[0].articles.len(), 1);
        assert_eq!(out.items[0].articles[0].source, "solo.dev");
    }

    #[test]
    fn test_malformed_url_degrades_source_only() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![json!({
            "name": "AI",
            "articles": [
                {"id": "bad", "title": "Broken", "url": "not a url", "view_count": 2},
                {"id": "good", "title": "Fine", "url": "https://example.com/ok", "view_count": 1}
            ]
        })]);

        let cat = &out.items[0];
        assert_eq!(cat.articles.len(), 2);
        assert_eq!(cat.articles[0].source, defaults::ARTICLE.source);
        assert_eq!(cat.articles[1].source, "example.com");
        assert_eq!(cat.total_views, 3);
        assert_eq!(out.issues.len(), 1);
        assert!(matches!(
            &out.issues[0],
            NormalizeIssue::MalformedUrl { article_id, .. } if article_id == "bad"
        ));
    }

    #[test]
    fn test_undecodable_record_is_dropped() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![json!("garbage"), json!({"name": "Ok"})]);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].name, "Ok");
        assert!(matches!(
            out.issues[0],
            NormalizeIssue::MalformedRecord { index: 0, .. }
        ));
    }

    #[test]
    fn test_bad_nested_article_drops_alone() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_categories(vec![
            json!({"name": "AI", "articles": [{"title": "X", "url": "https://x.io", "views": 10}, {"title": 5}]}),
            json!({"name": "Web"}),
        ]);

        let names: Vec<_> = out.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["AI", "Web"]);
        let ai = &out.items[0];
        assert_eq!(ai.articles.len(), 1);
        assert_eq!(ai.articles[0].title, "X");
        assert_eq!(ai.total_views, 10);
        assert_eq!(out.issues.len(), 1);
        assert!(matches!(
            out.issues[0],
            NormalizeIssue::MalformedRecord { entity: "article", index: 1, .. }
        ));
    }

    #[test]
    fn test_pulse_issue_points_at_input_position() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_pulses(vec![
            json!("garbage"),
            json!({"id": 1, "title": "Kept"}),
            json!({"title": "No id"}),
        ]);

        assert_eq!(out.items.len(), 1);
        let indexes: Vec<_> = out
            .issues
            .iter()
            .map(|issue| match issue {
                NormalizeIssue::MalformedRecord { index, .. } => *index,
                other => panic!("unexpected issue {:?}", other),
            })
            .collect();
        assert_eq!(indexes, vec![0, 2]);
    }

    #[test]
    fn test_article_without_id_gets_url_digest() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_articles(vec![json!({"url": "https://example.com/a"})]);
        assert_eq!(out.items[0].id, Article::fallback_id("https://example.com/a"));
        assert_eq!(out.items[0].title, defaults::UNTITLED);
        assert_eq!(out.items[0].category, "General");
    }

    #[test]
    fn test_article_listing_reads_category_join() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_articles(vec![json!({
            "id": 5,
            "url": "https://example.com/a",
            "scraped_date": "2024-03-01T10:00:00+00:00",
            "categories": {"name": "Robotics"}
        })]);
        let article = &out.items[0];
        assert_eq!(article.category, "Robotics");
        assert_eq!(article.published_at, parse_timestamp("2024-03-01T10:00:00Z"));
    }

    #[test]
    fn test_pulse_defaults_without_category() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_pulses(vec![json!({
            "id": 7,
            "slug": "gpu-shortage",
            "title": "GPU shortage",
            "view_count": 42,
            "published_date": "2024-05-01T08:30:00Z",
            "categories": null
        })]);

        let pulse = &out.items[0];
        assert_eq!(pulse.id, "7");
        assert_eq!(pulse.category, "General");
        assert_eq!(pulse.category_color, "#ffffff");
        assert_eq!(pulse.category_gradient, "from-gray-500 to-gray-600");
        assert_eq!(pulse.views, 42);
        assert_eq!(pulse.blurb, "");
        assert_eq!(pulse.is_saved, None);
    }

    #[test]
    fn test_pulse_category_join() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_pulses(vec![json!({
            "id": "p1",
            "title": "Rust &amp; friends",
            "categories": [{"name": "Dev", "color": "#00ff00", "gradient": "from-green-500 to-green-600"}]
        })]);
        let pulse = &out.items[0];
        assert_eq!(pulse.title, "Rust & friends");
        assert_eq!(pulse.slug, "p1");
        assert_eq!(pulse.category, "Dev");
        assert_eq!(pulse.category_color, "#00ff00");
    }

    #[test]
    fn test_pulse_without_id_is_dropped() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_pulses(vec![json!({"title": "Orphan"}), json!({"id": 2})]);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_negative_views_clamp_to_zero() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_pulses(vec![json!({"id": 1, "view_count": -3})]);
        assert_eq!(out.items[0].views, 0);
    }

    #[test]
    fn test_stats_row() {
        let normalizer = Normalizer::new();
        let stats = normalizer
            .normalize_stats(vec![json!({"total_articles": 120, "total_views": null, "total_categories": 8})])
            .unwrap();
        assert_eq!(stats.total_articles, 120);
        assert_eq!(stats.total_views, 0);
        assert_eq!(stats.total_categories, 8);
        assert_eq!(stats.origin, StatsOrigin::Service);

        assert!(normalizer.normalize_stats(Vec::new()).is_none());
    }

    #[test]
    fn test_saved_rows() {
        let normalizer = Normalizer::new();
        let out = normalizer.normalize_saved(
            "u1",
            vec![
                json!({"pulses": {"id": 3, "title": "Kept", "blurb": "b"}}),
                json!({"pulses": null}),
            ],
        );
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].relation, SavedRelation::new("u1", "3"));
        assert_eq!(out.issues.len(), 1);
    }

    #[test]
    fn test_saved_pulse_ids() {
        let normalizer = Normalizer::new();
        let ids = normalizer.saved_pulse_ids(vec![
            json!({"pulse_id": 4}),
            json!({"pulses": {"id": "9"}}),
            json!({"user_id": "u1"}),
        ]);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("4"));
        assert!(ids.contains("9"));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-01T00:00:00Z").is_some());
        assert!(parse_timestamp("2024-01-01T00:00:00.123456").is_some());
        assert!(parse_timestamp("2024-01-01 12:30:00").is_some());
        assert!(parse_timestamp("2024-01-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_source_label() {
        assert_eq!(source_label("https://www.example.com/a?b=c").unwrap(), "www.example.com");
        assert!(source_label("").is_err());
        assert!(source_label("mailto:someone@example.com").is_err());
    }
}
