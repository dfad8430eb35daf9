use crate::domain::{Article, Category, Pulse};

/// An entity whose text fields can be matched by [`search`].
pub trait Searchable {
    type Field: Copy;

    /// Text found under `field`. Multi-valued fields return several strings.
    fn field_text(&self, field: Self::Field) -> Vec<&str>;
}

/// Items with `query` as a case-insensitive substring of at least one of
/// `fields`, in input order. An empty query returns every item.
pub fn search<'a, T: Searchable>(items: &'a [T], query: &str, fields: &[T::Field]) -> Vec<&'a T> {
    if query.is_empty() {
        return items.iter().collect();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            fields.iter().any(|field| {
                item.field_text(*field)
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseField {
    Title,
    Category,
    Blurb,
}

/// Fields the pulse feed searches.
pub const PULSE_FIELDS: &[PulseField] = &[PulseField::Title, PulseField::Category, PulseField::Blurb];

impl Searchable for Pulse {
    type Field = PulseField;

    fn field_text(&self, field: PulseField) -> Vec<&str> {
        match field {
            PulseField::Title => vec![self.title.as_str()],
            PulseField::Category => vec![self.category.as_str()],
            PulseField::Blurb => vec![self.blurb.as_str()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Name,
    Description,
    ArticleTitles,
}

/// Fields the home screen searches.
pub const CATEGORY_FIELDS: &[CategoryField] = &[
    CategoryField::Name,
    CategoryField::Description,
    CategoryField::ArticleTitles,
];

impl Searchable for Category {
    type Field = CategoryField;

    fn field_text(&self, field: CategoryField) -> Vec<&str> {
        match field {
            CategoryField::Name => vec![self.name.as_str()],
            CategoryField::Description => vec![self.description.as_str()],
            CategoryField::ArticleTitles => self.articles.iter().map(|a| a.title.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleField {
    Title,
    Source,
    Category,
    Excerpt,
}

pub const ARTICLE_FIELDS: &[ArticleField] = &[
    ArticleField::Title,
    ArticleField::Source,
    ArticleField::Category,
    ArticleField::Excerpt,
];

impl Searchable for Article {
    type Field = ArticleField;

    fn field_text(&self, field: ArticleField) -> Vec<&str> {
        match field {
            ArticleField::Title => vec![self.title.as_str()],
            ArticleField::Source => vec![self.source.as_str()],
            ArticleField::Category => vec![self.category.as_str()],
            ArticleField::Excerpt => vec![self.excerpt.as_str()],
        }
    }
}
