//! Per-rail load state machine.
//!
//! A rail starts `Empty`, and every load settles it into `Loaded`. Loads are
//! split into `begin_load` (issue a ticket) and `settle` (apply the result) so
//! the fetch itself can run without holding the carousel. A carousel's inputs
//! are fixed for its lifetime; a new composition builds new carousels. A ticket
//! that is no longer the newest is discarded once the rail holds items, so a
//! slow response never overwrites a newer refresh.

use rand::Rng;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Category, DirectoryListing, ItemFilter, MediaItem, QueryParams},
    services::{gateway::MetadataGateway, sampling::shuffle},
};

use super::pager::Pager;

/// Everything a rail's contents depend on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RailSource {
    pub dir: String,
    pub params: QueryParams,
    pub filter: Option<ItemFilter>,
    pub shuffle: bool,
}

impl From<&Category> for RailSource {
    fn from(category: &Category) -> Self {
        Self {
            dir: category.dir.clone(),
            params: category.params.clone(),
            filter: category.filter,
            shuffle: category.shuffle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    Empty,
    Loaded(Vec<MediaItem>),
}

/// Proof of a started load, ordered by generation
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    source: RailSource,
}

impl LoadTicket {
    /// Runs the fetch this ticket stands for
    pub async fn fetch(&self, gateway: &dyn MetadataGateway) -> AppResult<DirectoryListing> {
        gateway
            .fetch_directory(&self.source.dir, &self.source.params)
            .await
    }
}

/// One slot of the rendered rail
#[derive(Debug, Clone, Serialize)]
pub struct Slot {
    pub index: usize,
    /// `None` renders as a fixed-size placeholder
    pub item: Option<MediaItem>,
}

/// Render-ready snapshot of a carousel
#[derive(Debug, Clone, Serialize)]
pub struct RailView {
    pub title: String,
    pub loaded: bool,
    pub current_page: usize,
    pub page_count: usize,
    pub items_per_page: usize,
    pub controls_visible: bool,
    pub on_deck: bool,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    title: String,
    on_deck: bool,
    source: RailSource,
    phase: LoadPhase,
    pager: Pager,
    generation: u64,
}

impl Carousel {
    pub fn new(category: &Category, viewport_width: u32) -> Self {
        Self {
            title: category.title.clone(),
            on_deck: category.is_on_deck(),
            source: RailSource::from(category),
            phase: LoadPhase::Empty,
            pager: Pager::new(viewport_width),
            generation: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_on_deck(&self) -> bool {
        self.on_deck
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.phase, LoadPhase::Loaded(_))
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn items(&self) -> &[MediaItem] {
        match &self.phase {
            LoadPhase::Loaded(items) => items,
            LoadPhase::Empty => &[],
        }
    }

    fn item_count(&self) -> usize {
        self.items().len()
    }

    /// Starts a load for the current inputs, superseding any load in flight
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
            source: self.source.clone(),
        }
    }

    /// Applies a finished fetch. Returns `false` if the result was discarded.
    ///
    /// A superseded ticket may still fill an `Empty` rail; the newer load
    /// replaces it when it lands. Once loaded, only the newest ticket settles.
    /// Failures and empty listings both settle into an empty `Loaded` state.
    pub fn settle<R: Rng + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        outcome: AppResult<DirectoryListing>,
        rng: &mut R,
    ) -> bool {
        if ticket.generation != self.generation && self.is_loaded() {
            tracing::debug!(
                rail = %self.title,
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale rail load"
            );
            return false;
        }

        let items = match outcome {
            Ok(listing) => {
                let mut items = listing.items;
                if let Some(filter) = ticket.source.filter {
                    items.retain(|item| filter.matches(item));
                }
                if ticket.source.shuffle {
                    items = shuffle(items, rng);
                }
                items
            }
            Err(e) => {
                tracing::warn!(rail = %self.title, dir = %ticket.source.dir, error = %e, "Rail fetch failed, showing it empty");
                Vec::new()
            }
        };

        self.phase = LoadPhase::Loaded(items);
        self.pager.clamp(self.item_count());
        true
    }

    pub fn advance(&mut self) {
        let count = self.item_count();
        self.pager.advance(count);
    }

    pub fn retreat(&mut self) {
        let count = self.item_count();
        self.pager.retreat(count);
    }

    pub fn jump_to(&mut self, page: usize) {
        let count = self.item_count();
        self.pager.jump_to(page, count);
    }

    pub fn resize(&mut self, viewport_width: u32) {
        let count = self.item_count();
        self.pager.resize(viewport_width, count);
    }

    /// Slots for every displayed item; items outside the window are placeholders
    pub fn view(&self) -> RailView {
        let items = self.items();
        let displayed = self.pager.displayed_count(items.len());
        let window = self.pager.visible_window(items.len());

        let slots = items[..displayed]
            .iter()
            .enumerate()
            .map(|(index, item)| Slot {
                index,
                item: window.contains(&index).then(|| item.clone()),
            })
            .collect();

        RailView {
            title: self.title.clone(),
            loaded: self.is_loaded(),
            current_page: self.pager.current_page(),
            page_count: self.pager.page_count(items.len()),
            items_per_page: self.pager.items_per_page(),
            controls_visible: self.pager.controls_visible(items.len()),
            on_deck: self.on_deck,
            slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::MediaType;
    use rand::{rngs::StdRng, SeedableRng};

    fn item(key: usize, rating: f64) -> MediaItem {
        MediaItem {
            rating_key: key.to_string(),
            item_type: MediaType::Movie,
            title: format!("Movie {}", key),
            rating: Some(rating),
            view_count: None,
            last_viewed_at: None,
            thumb: None,
            related: Vec::new(),
        }
    }

    fn listing(count: usize) -> DirectoryListing {
        DirectoryListing {
            items: (0..count).map(|i| item(i, 5.0 + (i % 5) as f64)).collect(),
            directories: Vec::new(),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn test_starts_empty() {
        let carousel = Carousel::new(&Category::new("Popular", "/all"), 1600);
        assert_eq!(carousel.phase(), &LoadPhase::Empty);
        let view = carousel.view();
        assert!(!view.loaded);
        assert!(view.slots.is_empty());
    }

    #[test]
    fn test_load_and_window() {
        let mut carousel = Carousel::new(&Category::new("Popular", "/all"), 1600);
        let ticket = carousel.begin_load();
        assert!(carousel.settle(ticket, Ok(listing(37)), &mut rng()));

        let view = carousel.view();
        assert!(view.loaded);
        assert_eq!(view.items_per_page, 5);
        assert_eq!(view.page_count, 5);
        assert_eq!(view.slots.len(), 25);
        assert!(view.controls_visible);

        let rendered: Vec<usize> = view
            .slots
            .iter()
            .filter(|s| s.item.is_some())
            .map(|s| s.index)
            .collect();
        assert_eq!(rendered, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_follows_navigation() {
        let mut carousel = Carousel::new(&Category::new("Popular", "/all"), 1600);
        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(listing(37)), &mut rng());

        carousel.jump_to(2);
        let view = carousel.view();
        let rendered: Vec<usize> = view
            .slots
            .iter()
            .filter(|s| s.item.is_some())
            .map(|s| s.index)
            .collect();
        assert_eq!(rendered, (5..20).collect::<Vec<_>>());

        carousel.retreat();
        carousel.retreat();
        carousel.retreat();
        assert_eq!(carousel.pager().current_page(), 4);
        carousel.advance();
        assert_eq!(carousel.pager().current_page(), 0);
    }

    #[test]
    fn test_filter_applied_before_storing() {
        let category = Category::new("Critically Acclaimed", "/all")
            .with_filter(ItemFilter::MinRating { min_rating: 8.0 });
        let mut carousel = Carousel::new(&category, 1600);
        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(listing(10)), &mut rng());

        assert_eq!(carousel.items().len(), 4);
        assert!(carousel
            .items()
            .iter()
            .all(|i| i.rating.unwrap_or_default() >= 8.0));
    }

    #[test]
    fn test_shuffle_keeps_all_items() {
        let category = Category::new("Drama", "/genre/1").shuffled();
        let mut carousel = Carousel::new(&category, 1600);
        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(listing(12)), &mut rng());

        let mut keys: Vec<usize> = carousel
            .items()
            .iter()
            .map(|i| i.rating_key.parse().unwrap())
            .collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_result_is_loaded_with_no_pages() {
        let mut carousel = Carousel::new(&Category::new("Collections", "/collection"), 1600);
        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(DirectoryListing::default()), &mut rng());

        let view = carousel.view();
        assert!(view.loaded);
        assert_eq!(view.page_count, 0);
        assert!(!view.controls_visible);
        assert!(view.slots.is_empty());
    }

    #[test]
    fn test_fetch_failure_settles_empty() {
        let mut carousel = Carousel::new(&Category::new("Trending", "/all"), 1600);
        let ticket = carousel.begin_load();
        let settled = carousel.settle(
            ticket,
            Err(AppError::SourceUnavailable("status 500".to_string())),
            &mut rng(),
        );

        assert!(settled);
        assert_eq!(carousel.phase(), &LoadPhase::Loaded(Vec::new()));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut carousel = Carousel::new(&Category::new("Popular", "/all"), 1600);
        let first = carousel.begin_load();
        let second = carousel.begin_load();

        assert!(carousel.settle(second, Ok(listing(3)), &mut rng()));
        assert!(!carousel.settle(first, Ok(listing(30)), &mut rng()));
        assert_eq!(carousel.items().len(), 3);
    }

    #[test]
    fn test_superseded_load_still_fills_empty_rail() {
        let mut carousel = Carousel::new(&Category::new("Popular", "/all"), 1600);
        let first = carousel.begin_load();
        let second = carousel.begin_load();

        assert!(carousel.settle(first, Ok(listing(30)), &mut rng()));
        assert!(carousel.is_loaded());
        assert_eq!(carousel.items().len(), 30);

        assert!(carousel.settle(second, Ok(listing(3)), &mut rng()));
        assert_eq!(carousel.items().len(), 3);
    }

    #[test]
    fn test_single_page_hides_controls() {
        let mut carousel = Carousel::new(&Category::new("New Releases", "/newest"), 1600);
        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(listing(4)), &mut rng());

        let view = carousel.view();
        assert_eq!(view.page_count, 1);
        assert!(!view.controls_visible);
        assert_eq!(view.slots.iter().filter(|s| s.item.is_some()).count(), 4);
    }

    #[test]
    fn test_reload_with_fewer_items_clamps_page() {
        let mut carousel = Carousel::new(&Category::new("Continue Watching", "/onDeck"), 1600);
        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(listing(25)), &mut rng());
        carousel.jump_to(4);

        let ticket = carousel.begin_load();
        carousel.settle(ticket, Ok(listing(6)), &mut rng());
        assert_eq!(carousel.pager().current_page(), 1);
        assert!(carousel.is_on_deck());
    }
}
