use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Hostname of `url`, or a degraded label when the URL does not parse.
    pub source: String,
    pub category: String,
    pub views: u64,
    pub excerpt: String,
}

impl Article {
    /// Deterministic ID for articles the service delivered without one.
    pub fn fallback_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn display_date(&self) -> String {
        self.published_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_id_deterministic() {
        let id1 = Article::fallback_id("https://example.com/a");
        let id2 = Article::fallback_id("https://example.com/a");
        assert_eq!(id1, id2);
        assert_ne!(id1, Article::fallback_id("https://example.com/b"));
    }

    #[test]
    fn test_fallback_id_is_hex_sha256() {
        let id = Article::fallback_id("https://example.com/a");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
