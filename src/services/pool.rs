use std::collections::HashSet;

use rand::rngs::StdRng;

use crate::{
    error::{AppError, AppResult},
    models::{
        Category, Directory, LibraryKind, LibrarySection, MediaItem, MediaType, QueryParams,
        RecommendationSettings,
    },
    services::{
        fixed_slots::recently_added_shows,
        gateway::MetadataGateway,
        sampling::{fork, pick_one, sample_distinct, shuffle},
    },
};

const LAST_VIEWED_LIMIT: &str = "20";
const MORE_LIKE_MIN_HISTORY: usize = 4;
const MAX_TITLE_CHARS: usize = 40;

/// Shortens long titles to 40 characters followed by an ellipsis
pub fn shorten_title(title: &str) -> String {
    if title.chars().count() > MAX_TITLE_CHARS {
        let head: String = title.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

/// Collapses a failed optional lookup into "no contribution"
fn optional<T>(label: &'static str, result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(category = label, error = %e, "Optional category skipped");
            None
        }
    }
}

/// One rail per randomly chosen genre, all distinct
async fn genre_categories(
    gateway: &dyn MetadataGateway,
    section: &LibrarySection,
    max_genres: usize,
    mut rng: StdRng,
) -> AppResult<Vec<Category>> {
    let listing = gateway
        .fetch_directory(&section.path("genre"), &QueryParams::new())
        .await?;

    let mut seen = HashSet::new();
    let genres: Vec<Directory> = listing
        .directories
        .into_iter()
        .filter(|genre| seen.insert(genre.key.clone()))
        .collect();

    if genres.is_empty() {
        return Ok(Vec::new());
    }

    let selection = sample_distinct(&genres, max_genres, &mut rng);

    Ok(selection
        .into_iter()
        .map(|genre| {
            Category::new(genre.title, section.path(&format!("genre/{}", genre.key)))
                .linked()
                .shuffled()
        })
        .collect())
}

/// Up to 20 most recently viewed movies or shows, newest first
pub async fn fetch_last_viewed(
    gateway: &dyn MetadataGateway,
    section: &LibrarySection,
) -> AppResult<Vec<MediaItem>> {
    let mut params = QueryParams::new();
    params.insert("type".to_string(), section.dominant_type_param().to_string());
    params.insert("sort".to_string(), "lastViewedAt:desc".to_string());
    params.insert("limit".to_string(), LAST_VIEWED_LIMIT.to_string());
    params.insert("unwatched".to_string(), "0".to_string());

    let listing = gateway.fetch_directory(&section.path("all"), &params).await?;

    Ok(listing
        .items
        .into_iter()
        .filter(|item| matches!(item.item_type, MediaType::Movie | MediaType::Show))
        .collect())
}

/// Resolves `source` and turns its first populated related hub into a rail
async fn related_category(
    gateway: &dyn MetadataGateway,
    source: &MediaItem,
    title_prefix: &str,
) -> AppResult<Category> {
    let full = gateway.fetch_item(&source.rating_key).await?;

    let hub = full.first_populated_hub().ok_or_else(|| {
        AppError::MalformedDependency(format!(
            "Item {} has no related hub with items",
            full.rating_key
        ))
    })?;

    Ok(
        Category::new(format!("{} {}", title_prefix, shorten_title(&full.title)), &hub.hub_key)
            .with_link(&hub.key)
            .shuffled(),
    )
}

async fn because_you_watched(
    gateway: &dyn MetadataGateway,
    last_viewed: &[MediaItem],
) -> Option<Category> {
    let latest = last_viewed.first()?;
    optional(
        "because_you_watched",
        related_category(gateway, latest, "Because you watched").await,
    )
}

async fn more_like_this(
    gateway: &dyn MetadataGateway,
    last_viewed: &[MediaItem],
    mut rng: StdRng,
) -> Option<Category> {
    if last_viewed.len() < MORE_LIKE_MIN_HISTORY {
        return None;
    }
    let source = pick_one(last_viewed, &mut rng)?;
    optional(
        "more_like_this",
        related_category(gateway, source, "More Like").await,
    )
}

/// Both history-driven rails, sharing a single last-viewed lookup
async fn history_categories(
    gateway: &dyn MetadataGateway,
    section: &LibrarySection,
    settings: &RecommendationSettings,
    rng: StdRng,
) -> Vec<Category> {
    if !settings.show_because_you_watched && !settings.show_more_like_this {
        return Vec::new();
    }

    let last_viewed =
        optional("last_viewed", fetch_last_viewed(gateway, section).await).unwrap_or_default();

    let because = async {
        if settings.show_because_you_watched {
            because_you_watched(gateway, &last_viewed).await
        } else {
            None
        }
    };
    let more_like = async {
        if settings.show_more_like_this {
            more_like_this(gateway, &last_viewed, rng).await
        } else {
            None
        }
    };

    let (because, more_like) = tokio::join!(because, more_like);
    because.into_iter().chain(more_like).collect()
}

/// Assembles the optional rails for a library, in random order.
///
/// Every lookup runs independently; a failed or empty lookup only removes its
/// own rail.
pub async fn assemble_pool(
    gateway: &dyn MetadataGateway,
    section: &LibrarySection,
    settings: &RecommendationSettings,
    mut rng: StdRng,
) -> Vec<Category> {
    let genre_rng = fork(&mut rng);
    let history_rng = fork(&mut rng);

    let genres = async {
        if settings.show_genres {
            optional(
                "genres",
                genre_categories(gateway, section, settings.max_genres, genre_rng).await,
            )
            .unwrap_or_default()
        } else {
            Vec::new()
        }
    };
    let history = history_categories(gateway, section, settings, history_rng);

    let (genres, history) = tokio::join!(genres, history);

    let mut pool = genres;
    pool.extend(history);

    if section.kind == LibraryKind::Show && settings.show_recently_added {
        pool.push(recently_added_shows(section));
    }

    tracing::info!(
        section_id = section.id,
        pool_size = pool.len(),
        "Category pool assembled"
    );

    shuffle(pool, &mut rng)
}
