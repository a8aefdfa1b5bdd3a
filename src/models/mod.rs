use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

mod category;
mod settings;

pub use category::{Category, ItemFilter, QueryParams};
pub use settings::{ContentDisplaySettings, RecommendationSettings, SUPPORTED_LANGUAGES};

/// Type tag carried by every metadata record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Show,
    Season,
    Episode,
    Collection,
    #[serde(other)]
    Other,
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            MediaType::Movie => "movie",
            MediaType::Show => "show",
            MediaType::Season => "season",
            MediaType::Episode => "episode",
            MediaType::Collection => "collection",
            MediaType::Other => "other",
        };
        write!(f, "{}", tag)
    }
}

/// A metadata record as the pipeline sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaItem {
    /// Unique rating key assigned by the media server
    pub rating_key: String,
    pub item_type: MediaType,
    pub title: String,
    pub rating: Option<f64>,
    pub view_count: Option<u32>,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub thumb: Option<String>,
    /// Related hubs, only populated on full item lookups
    #[serde(default)]
    pub related: Vec<Hub>,
}

impl MediaItem {
    /// First related hub that has at least one preview item
    pub fn first_populated_hub(&self) -> Option<&Hub> {
        self.related.iter().find(|hub| !hub.items.is_empty())
    }
}

/// Server-provided group of items related to a source item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hub {
    pub title: String,
    /// Directory path listing the hub's full contents
    pub hub_key: String,
    /// Browsable link for the hub
    pub key: String,
    pub items: Vec<MediaItem>,
}

/// A child directory entry (genre, collection, section, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Directory {
    pub key: String,
    pub title: String,
    pub dir_type: Option<String>,
}

/// Result of listing a directory. Missing fields are represented as empty lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectoryListing {
    pub items: Vec<MediaItem>,
    pub directories: Vec<Directory>,
}

/// Kind of content a library section holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    Movie,
    Show,
    #[serde(other)]
    Other,
}

/// A library on the media server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LibrarySection {
    pub id: u32,
    pub kind: LibraryKind,
    pub title: String,
}

impl LibrarySection {
    /// Only movie and show libraries get a home screen
    pub fn is_browsable(&self) -> bool {
        matches!(self.kind, LibraryKind::Movie | LibraryKind::Show)
    }

    /// Numeric type filter for the library's dominant item type
    pub fn dominant_type_param(&self) -> &'static str {
        match self.kind {
            LibraryKind::Movie => "1",
            _ => "2",
        }
    }

    /// Path prefix for directories under this section
    pub fn path(&self, suffix: &str) -> String {
        format!("/library/sections/{}/{}", self.id, suffix)
    }
}

// ============================================================================
// Media Server API Types
// ============================================================================

/// Envelope wrapping every media server JSON response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    #[serde(rename = "MediaContainer")]
    pub media_container: ApiMediaContainer,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMediaContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Option<Vec<ApiMetadata>>,
    #[serde(rename = "Directory", default)]
    pub directory: Option<Vec<ApiDirectory>>,
}

impl From<ApiMediaContainer> for DirectoryListing {
    fn from(container: ApiMediaContainer) -> Self {
        DirectoryListing {
            items: container
                .metadata
                .unwrap_or_default()
                .into_iter()
                .map(MediaItem::from)
                .collect(),
            directories: container
                .directory
                .unwrap_or_default()
                .into_iter()
                .map(Directory::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    pub rating_key: String,
    #[serde(rename = "type")]
    pub item_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u32>,
    #[serde(default)]
    pub last_viewed_at: Option<i64>,
    #[serde(default)]
    pub thumb: Option<String>,
    #[serde(rename = "Related", default)]
    pub related: Option<ApiRelated>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRelated {
    #[serde(rename = "Hub", default)]
    pub hub: Option<Vec<ApiHub>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHub {
    #[serde(default)]
    pub title: String,
    pub hub_key: Option<String>,
    pub key: Option<String>,
    #[serde(rename = "Metadata", default)]
    pub metadata: Option<Vec<ApiMetadata>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDirectory {
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub dir_type: Option<String>,
}

impl From<ApiMetadata> for MediaItem {
    fn from(meta: ApiMetadata) -> Self {
        let related = meta
            .related
            .and_then(|r| r.hub)
            .unwrap_or_default()
            .into_iter()
            // A hub without a fetch path cannot back a rail
            .filter_map(|hub| {
                let hub_key = hub.hub_key?;
                Some(Hub {
                    title: hub.title,
                    key: hub.key.unwrap_or_else(|| hub_key.clone()),
                    hub_key,
                    items: hub
                        .metadata
                        .unwrap_or_default()
                        .into_iter()
                        .map(MediaItem::from)
                        .collect(),
                })
            })
            .collect();

        MediaItem {
            rating_key: meta.rating_key,
            item_type: meta.item_type,
            title: meta.title,
            rating: meta.rating,
            view_count: meta.view_count,
            last_viewed_at: meta
                .last_viewed_at
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            thumb: meta.thumb,
            related,
        }
    }
}

impl From<ApiDirectory> for Directory {
    fn from(dir: ApiDirectory) -> Self {
        Directory {
            key: dir.key,
            title: dir.title,
            dir_type: dir.dir_type,
        }
    }
}

impl TryFrom<ApiDirectory> for LibrarySection {
    type Error = std::num::ParseIntError;

    fn try_from(dir: ApiDirectory) -> Result<Self, Self::Error> {
        let kind = match dir.dir_type.as_deref() {
            Some("movie") => LibraryKind::Movie,
            Some("show") => LibraryKind::Show,
            _ => LibraryKind::Other,
        };
        Ok(LibrarySection {
            id: dir.key.parse()?,
            kind,
            title: dir.title,
        })
    }
}
