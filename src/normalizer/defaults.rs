//! Fallback rules applied when a record omits a field.
//!
//! One table per entity. Every normalized entity leaves the normalizer fully
//! populated, so callers never branch on missing text.

pub const NEUTRAL_COLOR: &str = "#ffffff";
pub const NEUTRAL_GRADIENT: &str = "from-gray-500 to-gray-600";
pub const UNTITLED: &str = "(Untitled)";

pub struct ArticleDefaults {
    pub title: &'static str,
    pub content: &'static str,
    /// Shown when the URL has no parseable hostname.
    pub source: &'static str,
    pub category: &'static str,
}

impl ArticleDefaults {
    pub fn excerpt(&self, title: &str) -> String {
        format!("An AI-generated summary for the article: {}", title)
    }
}

pub const ARTICLE: ArticleDefaults = ArticleDefaults {
    title: UNTITLED,
    content: "",
    source: "unknown source",
    category: "General",
};

pub struct CategoryDefaults {
    pub name: &'static str,
    pub color: &'static str,
    pub gradient: &'static str,
}

impl CategoryDefaults {
    pub fn description(&self, name: &str) -> String {
        name.to_string()
    }

    pub fn summary(&self, name: &str) -> String {
        format!("Insights and updates on {}.", name)
    }
}

pub const CATEGORY: CategoryDefaults = CategoryDefaults {
    name: "Uncategorized",
    color: NEUTRAL_COLOR,
    gradient: NEUTRAL_GRADIENT,
};

pub struct PulseDefaults {
    pub title: &'static str,
    pub blurb: &'static str,
    pub content: &'static str,
    pub category: &'static str,
    pub category_color: &'static str,
    pub category_gradient: &'static str,
}

pub const PULSE: PulseDefaults = PulseDefaults {
    title: UNTITLED,
    blurb: "",
    content: "",
    category: "General",
    category_color: NEUTRAL_COLOR,
    category_gradient: NEUTRAL_GRADIENT,
};
