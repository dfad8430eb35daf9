//! Client-side search and sort over normalized collections.
//!
//! Everything here is a pure function of its inputs and returns borrowed
//! views; nothing caches derived results.

pub mod search;
pub mod sort;

pub use search::{
    search, ArticleField, CategoryField, PulseField, Searchable, ARTICLE_FIELDS, CATEGORY_FIELDS,
    PULSE_FIELDS,
};
pub use sort::{sort, SortKey, SortState, Sortable};

/// User-controlled query input of one listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    search: String,
    sort: SortState,
}

impl QueryState {
    pub fn new(sort: SortKey) -> Self {
        Self {
            search: String::new(),
            sort: SortState::new(sort),
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort.active()
    }

    pub fn trigger_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn trigger_sort(&mut self, key: SortKey) -> SortKey {
        self.sort.trigger(key)
    }

    pub fn apply<'a, T>(&self, items: &'a [T], fields: &[T::Field]) -> Vec<&'a T>
    where
        T: Searchable + Sortable,
    {
        sort(search(items, &self.search, fields), self.sort.active())
    }
}
