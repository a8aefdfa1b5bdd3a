use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Language codes accepted in `preferred_languages`
pub const SUPPORTED_LANGUAGES: [&str; 8] = ["en", "es", "fr", "de", "it", "ja", "ko", "zh"];

const GENRE_RANGE: std::ops::RangeInclusive<usize> = 4..=12;
const ITEMS_PER_CATEGORY_RANGE: std::ops::RangeInclusive<usize> = 10..=50;
const DIVERSITY_RANGE: std::ops::RangeInclusive<u8> = 0..=100;

/// User preferences controlling which rails are composed and how
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationSettings {
    pub show_continue_watching: bool,
    pub show_recently_added: bool,
    pub show_new_releases: bool,
    pub show_because_you_watched: bool,
    pub show_more_like_this: bool,
    pub show_genres: bool,
    /// Upper bound on genre rails
    pub max_genres: usize,
    /// 0 leans towards similar content, 100 towards variety, 50 is neutral
    pub content_diversity: u8,
    pub preferred_languages: Vec<String>,
    pub show_trending: bool,
    pub show_popular: bool,
    pub show_critically_acclaimed: bool,
    pub show_staff_picks: bool,
    pub show_hidden_gems: bool,
    pub show_similar_to_last_watched: bool,
    pub show_upcoming: bool,
    pub show_collections: bool,
    /// Item cap for the rated and most-watched listings
    pub max_items_per_category: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            show_continue_watching: true,
            show_recently_added: true,
            show_new_releases: true,
            show_because_you_watched: true,
            show_more_like_this: true,
            show_genres: true,
            max_genres: 8,
            content_diversity: 50,
            preferred_languages: Vec::new(),
            show_trending: true,
            show_popular: true,
            show_critically_acclaimed: true,
            show_staff_picks: true,
            show_hidden_gems: true,
            show_similar_to_last_watched: true,
            show_upcoming: true,
            show_collections: true,
            max_items_per_category: 20,
        }
    }
}

impl RecommendationSettings {
    /// Rejects values outside the ranges the settings screen offers
    pub fn validate(&self) -> AppResult<()> {
        if !GENRE_RANGE.contains(&self.max_genres) {
            return Err(AppError::InvalidInput(format!(
                "maxGenres must be between {} and {}",
                GENRE_RANGE.start(),
                GENRE_RANGE.end()
            )));
        }

        if !ITEMS_PER_CATEGORY_RANGE.contains(&self.max_items_per_category) {
            return Err(AppError::InvalidInput(format!(
                "maxItemsPerCategory must be between {} and {}",
                ITEMS_PER_CATEGORY_RANGE.start(),
                ITEMS_PER_CATEGORY_RANGE.end()
            )));
        }

        if !DIVERSITY_RANGE.contains(&self.content_diversity) {
            return Err(AppError::InvalidInput(
                "contentDiversity must be between 0 and 100".to_string(),
            ));
        }

        if let Some(unknown) = self
            .preferred_languages
            .iter()
            .find(|lang| !SUPPORTED_LANGUAGES.contains(&lang.as_str()))
        {
            return Err(AppError::InvalidInput(format!(
                "Unsupported preferred language: {}",
                unknown
            )));
        }

        Ok(())
    }
}

/// Per-item presentation toggles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentDisplaySettings {
    pub show_content_ratings: bool,
    pub show_release_year: bool,
    pub show_duration: bool,
    pub show_audio_languages: bool,
    pub show_subtitles: bool,
    pub auto_play_trailers: bool,
}

impl Default for ContentDisplaySettings {
    fn default() -> Self {
        Self {
            show_content_ratings: true,
            show_release_year: true,
            show_duration: true,
            show_audio_languages: true,
            show_subtitles: true,
            auto_play_trailers: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = RecommendationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.max_genres, 8);
        assert_eq!(settings.content_diversity, 50);
        assert_eq!(settings.max_items_per_category, 20);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: RecommendationSettings =
            serde_json::from_str(r#"{"showGenres": false, "contentDiversity": 80}"#).unwrap();
        assert!(!settings.show_genres);
        assert_eq!(settings.content_diversity, 80);
        assert!(settings.show_continue_watching);
        assert_eq!(settings.max_genres, 8);
    }

    #[test]
    fn test_camel_case_serialization() {
        let json = serde_json::to_value(RecommendationSettings::default()).unwrap();
        assert_eq!(json["maxItemsPerCategory"], 20);
        assert_eq!(json["showHiddenGems"], true);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let settings = RecommendationSettings {
            max_genres: 13,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = RecommendationSettings {
            max_items_per_category: 5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = RecommendationSettings {
            content_diversity: 101,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_unknown_language_rejected() {
        let settings = RecommendationSettings {
            preferred_languages: vec!["en".to_string(), "xx".to_string()],
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("xx"));
    }

    #[test]
    fn test_content_display_defaults() {
        let settings = ContentDisplaySettings::default();
        assert!(settings.show_subtitles);
        assert!(!settings.auto_play_trailers);
    }
}
