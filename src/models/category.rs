use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{MediaItem, MediaType};

/// Query parameters sent along with a directory fetch.
///
/// Ordered so two categories built from the same query compare equal and
/// serialize identically.
pub type QueryParams = BTreeMap<String, String>;

/// Client-side predicate applied to a rail's fetched items
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemFilter {
    /// Keep only items of the given type
    TypeIs { item_type: MediaType },
    /// Keep items rated at least `min_rating`
    MinRating { min_rating: f64 },
    /// Well rated but rarely watched
    HiddenGem { min_rating: f64, max_views: u32 },
}

impl ItemFilter {
    pub fn matches(&self, item: &MediaItem) -> bool {
        match *self {
            ItemFilter::TypeIs { item_type } => item.item_type == item_type,
            ItemFilter::MinRating { min_rating } => {
                item.rating.is_some_and(|rating| rating >= min_rating)
            }
            ItemFilter::HiddenGem {
                min_rating,
                max_views,
            } => {
                item.rating.is_some_and(|rating| rating >= min_rating)
                    && item.view_count.map_or(true, |views| views < max_views)
            }
        }
    }
}

/// One rail on the home screen.
///
/// Built fresh on every composition pass and never mutated afterwards; its
/// position in the composed list is its only identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub title: String,
    /// Directory path the rail's items are fetched from
    pub dir: String,
    #[serde(default)]
    pub params: QueryParams,
    pub filter: Option<ItemFilter>,
    /// Navigation target for "browse all"
    pub link: Option<String>,
    #[serde(default)]
    pub shuffle: bool,
}

impl Category {
    pub fn new(title: impl Into<String>, dir: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            dir: dir.into(),
            params: QueryParams::new(),
            filter: None,
            link: None,
            shuffle: false,
        }
    }

    /// Uses the fetch directory as the browse link as well
    pub fn linked(mut self) -> Self {
        self.link = Some(self.dir.clone());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_filter(mut self, filter: ItemFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn shuffled(mut self) -> Self {
        self.shuffle = true;
        self
    }

    /// The continue-watching rail accepts item-level refresh actions
    pub fn is_on_deck(&self) -> bool {
        self.dir.ends_with("onDeck")
    }
}
