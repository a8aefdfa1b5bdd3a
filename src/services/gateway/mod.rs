//! Metadata gateway abstraction
//!
//! The composition pipeline and the carousels only ever talk to the media
//! server through this trait, so tests can swap in a mock and alternative
//! servers can be plugged in without touching the pipeline.

use crate::{
    error::AppResult,
    models::{DirectoryListing, LibrarySection, MediaItem, QueryParams},
};

pub mod plex;

pub use plex::PlexGateway;

/// Read access to the media server's metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataGateway: Send + Sync {
    /// List a directory. Missing items or directories come back as empty lists.
    async fn fetch_directory(&self, path: &str, params: &QueryParams)
        -> AppResult<DirectoryListing>;

    /// Full metadata for one item, including its related hubs
    async fn fetch_item(&self, rating_key: &str) -> AppResult<MediaItem>;

    /// Every library section on the server
    async fn fetch_library_sections(&self) -> AppResult<Vec<LibrarySection>>;

    /// Drop an item from the continue-watching list
    async fn remove_from_continue_watching(&self, rating_key: &str) -> AppResult<()>;

    /// Gateway name for logging and debugging
    fn name(&self) -> &'static str;
}
