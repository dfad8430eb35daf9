use serde::{Deserialize, Serialize};

use super::Article;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub gradient: String,
    pub articles: Vec<Article>,
    pub summary: String,
    /// Sum of `articles[..].views` when both come from the same fetch.
    pub total_views: u64,
}

impl Category {
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// The categories screen previews at most this many articles per category.
    pub fn preview(&self) -> &[Article] {
        let end = self.articles.len().min(PREVIEW_LEN);
        &self.articles[..end]
    }
}

pub const PREVIEW_LEN: usize = 5;
