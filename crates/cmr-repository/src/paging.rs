//! Skip/max paging of listing results.

use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;

/// Requested window of a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// `None` uses the repository's default page size.
    pub max_items: Option<usize>,
    pub skip_count: usize,
}

impl Paging {
    /// Page with an explicit size and offset.
    pub fn new(max_items: Option<usize>, skip_count: usize) -> Self {
        Self {
            max_items,
            skip_count,
        }
    }

    /// Everything up to the configured limit.
    pub fn all() -> Self {
        Self::default()
    }

    /// Limit the page to `max_items` entries.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Skip the first `skip_count` entries.
    pub fn with_skip_count(mut self, skip_count: usize) -> Self {
        self.skip_count = skip_count;
        self
    }

    /// Cut `items` down to the requested window.
    pub fn apply<T>(&self, items: Vec<T>, config: &PagingConfig) -> Page<T> {
        let total = items.len();
        let max = self
            .max_items
            .unwrap_or(config.default_max_items)
            .min(config.max_items_limit);
        let items: Vec<T> = items.into_iter().skip(self.skip_count).take(max).collect();
        let has_more_items = self.skip_count.saturating_add(items.len()) < total;
        Page {
            items,
            has_more_items,
            num_items: total,
        }
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// More items exist after this page.
    pub has_more_items: bool,
    /// Size of the whole listing.
    pub num_items: usize,
}

impl<T> Page<T> {
    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the items on this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
