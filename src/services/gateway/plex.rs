//! Plex media server gateway
//!
//! Directory listings are always fetched live. Full item metadata and the
//! section listing change rarely and go through the Redis cache.

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{ApiEnvelope, DirectoryListing, LibrarySection, MediaItem, QueryParams},
    services::gateway::MetadataGateway,
};
use reqwest::{Client as HttpClient, Response};

const TOKEN_HEADER: &str = "X-Plex-Token";

#[derive(Clone)]
pub struct PlexGateway {
    http_client: HttpClient,
    base_url: String,
    token: String,
    cache: Cache,
    item_ttl: u64,
}

impl PlexGateway {
    pub fn new(cache: Cache, base_url: String, token: String, item_ttl: u64) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            cache,
            item_ttl,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path and unwrap the media container
    async fn get_container(&self, path: &str, params: &QueryParams) -> AppResult<ApiEnvelope> {
        let response = self
            .http_client
            .get(self.url(path))
            .header(TOKEN_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let response = Self::ensure_success(path, response).await?;
        Ok(response.json().await?)
    }

    async fn ensure_success(path: &str, response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            path = %path,
            status = %status,
            body = %body,
            "Media server request failed"
        );
        Err(AppError::SourceUnavailable(format!(
            "{} returned status {}",
            path, status
        )))
    }
}

#[async_trait::async_trait]
impl MetadataGateway for PlexGateway {
    async fn fetch_directory(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> AppResult<DirectoryListing> {
        let envelope = self.get_container(path, params).await?;
        let listing = DirectoryListing::from(envelope.media_container);

        tracing::debug!(
            path = %path,
            items = listing.items.len(),
            directories = listing.directories.len(),
            gateway = self.name(),
            "Directory fetched"
        );

        Ok(listing)
    }

    async fn fetch_item(&self, rating_key: &str) -> AppResult<MediaItem> {
        cached!(
            self.cache,
            CacheKey::Item(rating_key.to_string()),
            self.item_ttl,
            async move {
                let mut params = QueryParams::new();
                params.insert("includeRelated".to_string(), "1".to_string());

                let path = format!("/library/metadata/{}", rating_key);
                let envelope = self.get_container(&path, &params).await?;

                envelope
                    .media_container
                    .metadata
                    .and_then(|items| items.into_iter().next())
                    .map(MediaItem::from)
                    .ok_or_else(|| {
                        AppError::MalformedDependency(format!(
                            "No metadata returned for item {}",
                            rating_key
                        ))
                    })
            }
        )
    }

    async fn fetch_library_sections(&self) -> AppResult<Vec<LibrarySection>> {
        cached!(
            self.cache,
            CacheKey::LibrarySections,
            self.item_ttl,
            async move {
                let envelope = self
                    .get_container("/library/sections", &QueryParams::new())
                    .await?;

                let sections: Vec<LibrarySection> = envelope
                    .media_container
                    .directory
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|dir| {
                        let key = dir.key.clone();
                        LibrarySection::try_from(dir)
                            .map_err(|e| {
                                tracing::warn!(key = %key, error = %e, "Skipping section with non-numeric key");
                            })
                            .ok()
                    })
                    .collect();

                tracing::info!(
                    sections = sections.len(),
                    gateway = self.name(),
                    "Library sections fetched"
                );

                Ok::<_, AppError>(sections)
            }
        )
    }

    async fn remove_from_continue_watching(&self, rating_key: &str) -> AppResult<()> {
        let response = self
            .http_client
            .put(self.url("/actions/removeFromContinueWatching"))
            .header(TOKEN_HEADER, &self.token)
            .query(&[("ratingKey", rating_key)])
            .send()
            .await?;

        Self::ensure_success("/actions/removeFromContinueWatching", response).await?;

        tracing::debug!(rating_key = %rating_key, "Continue watching removal accepted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "plex"
    }
}
