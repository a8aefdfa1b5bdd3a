use rand::rngs::StdRng;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{Category, LibrarySection, MediaItem, QueryParams, RecommendationSettings},
    services::{
        diversity::apply_diversity,
        fixed_slots::build_fixed_slots,
        gateway::MetadataGateway,
        pool::assemble_pool,
        sampling::{fork, pick_one},
    },
};

/// Output of one composition pass for a library section
#[derive(Debug, Clone, Serialize)]
pub struct HomeRails {
    pub section: LibrarySection,
    /// Hero item; absent when the section has nothing unwatched
    pub featured: Option<MediaItem>,
    pub categories: Vec<Category>,
}

/// Movie and show sections, in server order
pub async fn browsable_sections(gateway: &dyn MetadataGateway) -> AppResult<Vec<LibrarySection>> {
    let sections = gateway.fetch_library_sections().await?;
    Ok(sections.into_iter().filter(|s| s.is_browsable()).collect())
}

pub async fn find_section(
    gateway: &dyn MetadataGateway,
    section_id: u32,
) -> AppResult<LibrarySection> {
    browsable_sections(gateway)
        .await?
        .into_iter()
        .find(|s| s.id == section_id)
        .ok_or_else(|| AppError::NotFound(format!("Library section {} not found", section_id)))
}

async fn pick_featured(
    gateway: &dyn MetadataGateway,
    section: &LibrarySection,
    mut rng: StdRng,
) -> AppResult<Option<MediaItem>> {
    let listing = gateway
        .fetch_directory(&section.path("unwatched"), &QueryParams::new())
        .await?;

    let Some(choice) = pick_one(&listing.items, &mut rng) else {
        return Ok(None);
    };

    gateway.fetch_item(&choice.rating_key).await.map(Some)
}

/// Runs one full composition pass.
///
/// The fixed slots and the pool are both complete before diversity is
/// applied. Nothing from a previous pass is reused.
pub async fn compose_home(
    gateway: &dyn MetadataGateway,
    section: &LibrarySection,
    settings: &RecommendationSettings,
    mut rng: StdRng,
) -> HomeRails {
    let pool_rng = fork(&mut rng);
    let featured_rng = fork(&mut rng);

    let fixed = build_fixed_slots(section, settings);

    let (pool, featured) = tokio::join!(
        assemble_pool(gateway, section, settings, pool_rng),
        pick_featured(gateway, section, featured_rng)
    );

    let featured = featured.unwrap_or_else(|e| {
        tracing::warn!(section_id = section.id, error = %e, "Featured item unavailable");
        None
    });

    let mut categories = fixed;
    categories.extend(pool);
    let categories = apply_diversity(categories, settings.content_diversity, &mut rng);

    tracing::info!(
        section_id = section.id,
        categories = categories.len(),
        featured = featured.is_some(),
        "Home rails composed"
    );

    HomeRails {
        section: section.clone(),
        featured,
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DirectoryListing, LibraryKind, MediaType};
    use crate::services::gateway::MockMetadataGateway;
    use rand::SeedableRng;

    fn section(id: u32, kind: LibraryKind) -> LibrarySection {
        LibrarySection {
            id,
            kind,
            title: format!("Section {}", id),
        }
    }

    fn item(key: &str) -> MediaItem {
        MediaItem {
            rating_key: key.to_string(),
            item_type: MediaType::Movie,
            title: format!("Movie {}", key),
            rating: Some(7.0),
            view_count: None,
            last_viewed_at: None,
            thumb: None,
            related: Vec::new(),
        }
    }

    fn fixed_only() -> RecommendationSettings {
        RecommendationSettings {
            show_genres: false,
            show_because_you_watched: false,
            show_more_like_this: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_browsable_sections_skip_other_kinds() {
        let mut gateway = MockMetadataGateway::new();
        gateway.expect_fetch_library_sections().returning(|| {
            Ok(vec![
                section(1, LibraryKind::Movie),
                section(2, LibraryKind::Other),
                section(3, LibraryKind::Show),
            ])
        });

        let sections = browsable_sections(&gateway).await.unwrap();
        let ids: Vec<u32> = sections.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_find_section_unknown_is_not_found() {
        let mut gateway = MockMetadataGateway::new();
        gateway
            .expect_fetch_library_sections()
            .returning(|| Ok(vec![section(2, LibraryKind::Other)]));

        let result = find_section(&gateway, 2).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_compose_featured_and_fixed_prefix() {
        let mut gateway = MockMetadataGateway::new();
        gateway
            .expect_fetch_directory()
            .withf(|path, _| path == "/library/sections/1/unwatched")
            .times(1)
            .returning(|_, _| {
                Ok(DirectoryListing {
                    items: vec![item("42")],
                    directories: Vec::new(),
                })
            });
        gateway
            .expect_fetch_item()
            .withf(|key| key == "42")
            .times(1)
            .returning(|key| Ok(item(key)));

        let rails = compose_home(
            &gateway,
            &section(1, LibraryKind::Movie),
            &fixed_only(),
            StdRng::seed_from_u64(3),
        )
        .await;

        assert_eq!(rails.featured.map(|f| f.rating_key), Some("42".to_string()));
        assert_eq!(rails.categories.len(), 9);
        assert_eq!(rails.categories[0].title, "Continue Watching");
        assert_eq!(rails.categories[1].title, "Recently Added");
        assert_eq!(rails.categories[2].title, "New Releases");
    }

    #[tokio::test]
    async fn test_featured_failure_does_not_abort_composition() {
        let mut gateway = MockMetadataGateway::new();
        gateway
            .expect_fetch_directory()
            .returning(|_, _| Err(AppError::SourceUnavailable("status 503".to_string())));

        let rails = compose_home(
            &gateway,
            &section(1, LibraryKind::Movie),
            &fixed_only(),
            StdRng::seed_from_u64(3),
        )
        .await;

        assert!(rails.featured.is_none());
        assert_eq!(rails.categories.len(), 9);
    }

    #[tokio::test]
    async fn test_empty_unwatched_yields_no_featured() {
        let mut gateway = MockMetadataGateway::new();
        gateway
            .expect_fetch_directory()
            .returning(|_, _| Ok(DirectoryListing::default()));
        gateway.expect_fetch_item().times(0);

        let rails = compose_home(
            &gateway,
            &section(1, LibraryKind::Movie),
            &fixed_only(),
            StdRng::seed_from_u64(3),
        )
        .await;

        assert!(rails.featured.is_none());
    }

    #[tokio::test]
    async fn test_low_diversity_truncates_composition() {
        let mut gateway = MockMetadataGateway::new();
        gateway
            .expect_fetch_directory()
            .returning(|_, _| Ok(DirectoryListing::default()));

        let settings = RecommendationSettings {
            content_diversity: 30,
            ..fixed_only()
        };
        let rails = compose_home(
            &gateway,
            &section(1, LibraryKind::Movie),
            &settings,
            StdRng::seed_from_u64(3),
        )
        .await;

        // 9 fixed slots: 3 + floor(0.7 * 6)
        assert_eq!(rails.categories.len(), 7);
        assert_eq!(rails.categories[6].title, "Staff Picks");
    }

    #[tokio::test]
    async fn test_show_library_recently_added_in_both_branches() {
        let mut gateway = MockMetadataGateway::new();
        gateway
            .expect_fetch_directory()
            .returning(|_, _| Ok(DirectoryListing::default()));

        let rails = compose_home(
            &gateway,
            &section(2, LibraryKind::Show),
            &fixed_only(),
            StdRng::seed_from_u64(9),
        )
        .await;

        let recent = rails
            .categories
            .iter()
            .filter(|c| c.title == "Recently Added")
            .count();
        assert_eq!(recent, 2);
        assert_eq!(rails.categories[1].dir, "/hubs/home/recentlyAdded");
    }
}
