use crate::models::{
    Category, ItemFilter, LibraryKind, LibrarySection, MediaType, QueryParams,
    RecommendationSettings,
};

const RECENTLY_ADDED_HUB: &str = "/hubs/home/recentlyAdded";
const RECENTLY_ADDED_SHOW_LIMIT: &str = "30";

const CRITICALLY_ACCLAIMED_MIN_RATING: f64 = 8.0;
const STAFF_PICKS_MIN_RATING: f64 = 7.5;
const HIDDEN_GEM_MIN_RATING: f64 = 7.0;
const HIDDEN_GEM_MAX_VIEWS: u32 = 10;

/// Extra metadata the media server should inline in listings
pub fn include_params() -> QueryParams {
    [
        ("includeCollections", "1"),
        ("includeExternalMedia", "1"),
        ("includeAdvanced", "1"),
        ("includeMeta", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Section listing of the dominant item type, sorted descending by `sort_field`
/// and capped at the configured per-category limit.
fn ranked_listing(section: &LibrarySection, sort_field: &str, limit: usize) -> QueryParams {
    let mut params = include_params();
    params.insert("type".to_string(), section.dominant_type_param().to_string());
    params.insert("sort".to_string(), format!("{}:desc", sort_field));
    params.insert("limit".to_string(), limit.to_string());
    params
}

/// "Recently Added" for show libraries: the home hub narrowed to this section,
/// keeping only whole shows.
pub fn recently_added_shows(section: &LibrarySection) -> Category {
    let mut params = include_params();
    params.insert("type".to_string(), "2".to_string());
    params.insert("limit".to_string(), RECENTLY_ADDED_SHOW_LIMIT.to_string());
    params.insert("sectionID".to_string(), section.id.to_string());
    params.insert("contentSectionID".to_string(), section.id.to_string());

    Category::new("Recently Added", RECENTLY_ADDED_HUB)
        .with_params(params)
        .with_filter(ItemFilter::TypeIs {
            item_type: MediaType::Show,
        })
}

/// Builds the deterministic prefix of the home screen.
///
/// Each rail is gated by its own toggle and, when enabled, always lands in
/// this relative order. The rating-sorted rails share one query and differ
/// only in their client-side filter.
pub fn build_fixed_slots(
    section: &LibrarySection,
    settings: &RecommendationSettings,
) -> Vec<Category> {
    let mut slots = Vec::new();
    let limit = settings.max_items_per_category;

    if settings.show_continue_watching {
        slots.push(Category::new("Continue Watching", section.path("onDeck")).linked());
    }

    if settings.show_recently_added {
        match section.kind {
            LibraryKind::Movie => {
                slots.push(
                    Category::new("Recently Added", section.path("recentlyAdded")).linked(),
                );
            }
            LibraryKind::Show => slots.push(recently_added_shows(section)),
            LibraryKind::Other => {}
        }
    }

    if settings.show_new_releases {
        slots.push(Category::new("New Releases", section.path("newest")).linked());
    }

    let all = section.path("all");

    if settings.show_trending {
        slots.push(
            Category::new("Trending", all.clone())
                .with_params(ranked_listing(section, "viewCount", limit)),
        );
    }

    let by_rating = ranked_listing(section, "rating", limit);

    if settings.show_popular {
        slots.push(Category::new("Popular", all.clone()).with_params(by_rating.clone()));
    }

    if settings.show_critically_acclaimed {
        slots.push(
            Category::new("Critically Acclaimed", all.clone())
                .with_params(by_rating.clone())
                .with_filter(ItemFilter::MinRating {
                    min_rating: CRITICALLY_ACCLAIMED_MIN_RATING,
                }),
        );
    }

    if settings.show_staff_picks {
        slots.push(
            Category::new("Staff Picks", all.clone())
                .with_params(by_rating.clone())
                .with_filter(ItemFilter::MinRating {
                    min_rating: STAFF_PICKS_MIN_RATING,
                }),
        );
    }

    if settings.show_hidden_gems {
        slots.push(
            Category::new("Hidden Gems", all)
                .with_params(by_rating)
                .with_filter(ItemFilter::HiddenGem {
                    min_rating: HIDDEN_GEM_MIN_RATING,
                    max_views: HIDDEN_GEM_MAX_VIEWS,
                }),
        );
    }

    if settings.show_collections {
        slots.push(
            Category::new("Collections", section.path("collection")).with_params(include_params()),
        );
    }

    tracing::debug!(
        section_id = section.id,
        slots = slots.len(),
        "Fixed slots built"
    );

    slots
}
