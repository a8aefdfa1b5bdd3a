use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{ContentDisplaySettings, LibrarySection, MediaItem, RecommendationSettings};
use crate::services::{browsable_sections, RailView};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct ViewportQuery {
    pub width: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RailSummary {
    pub index: usize,
    pub title: String,
    pub link: Option<String>,
    pub shuffle: bool,
    pub on_deck: bool,
}

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub section: LibrarySection,
    pub settings_version: u64,
    pub featured: Option<MediaItem>,
    pub rails: Vec<RailSummary>,
}

#[derive(Debug, Serialize)]
pub struct SettingsWriteResponse<T> {
    pub version: u64,
    pub settings: T,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Browsable library sections
pub async fn get_libraries(State(state): State<AppState>) -> AppResult<Json<Vec<LibrarySection>>> {
    let sections = browsable_sections(state.gateway.as_ref()).await?;
    Ok(Json(sections))
}

/// Composed home screen for one section
pub async fn get_home(
    State(state): State<AppState>,
    Path(section_id): Path<u32>,
    Query(viewport): Query<ViewportQuery>,
) -> AppResult<Json<HomeResponse>> {
    let session = state.home(section_id).await?;
    if let Some(width) = viewport.width {
        session.resize(width).await;
    }

    let rails = session
        .rails
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| RailSummary {
            index,
            title: category.title.clone(),
            link: category.link.clone(),
            shuffle: category.shuffle,
            on_deck: category.is_on_deck(),
        })
        .collect();

    Ok(Json(HomeResponse {
        section: session.rails.section.clone(),
        settings_version: session.version,
        featured: session.rails.featured.clone(),
        rails,
    }))
}

pub async fn get_rail(
    State(state): State<AppState>,
    Path((section_id, index)): Path<(u32, usize)>,
    Query(viewport): Query<ViewportQuery>,
) -> AppResult<Json<RailView>> {
    let view = state.rail_view(section_id, index, viewport.width).await?;
    Ok(Json(view))
}

pub async fn advance_rail(
    State(state): State<AppState>,
    Path((section_id, index)): Path<(u32, usize)>,
) -> AppResult<Json<RailView>> {
    let view = state
        .navigate(section_id, index, |carousel| carousel.advance())
        .await?;
    Ok(Json(view))
}

pub async fn retreat_rail(
    State(state): State<AppState>,
    Path((section_id, index)): Path<(u32, usize)>,
) -> AppResult<Json<RailView>> {
    let view = state
        .navigate(section_id, index, |carousel| carousel.retreat())
        .await?;
    Ok(Json(view))
}

pub async fn jump_rail(
    State(state): State<AppState>,
    Path((section_id, index, page)): Path<(u32, usize, usize)>,
) -> AppResult<Json<RailView>> {
    let view = state
        .navigate(section_id, index, |carousel| carousel.jump_to(page))
        .await?;
    Ok(Json(view))
}

pub async fn refresh_rail(
    State(state): State<AppState>,
    Path((section_id, index)): Path<(u32, usize)>,
) -> AppResult<Json<RailView>> {
    let view = state.refresh_rail(section_id, index).await?;
    Ok(Json(view))
}

/// Item action on a continue-watching rail
pub async fn remove_rail_item(
    State(state): State<AppState>,
    Path((section_id, index, rating_key)): Path<(u32, usize, String)>,
) -> AppResult<Json<RailView>> {
    let view = state
        .remove_on_deck_item(section_id, index, &rating_key)
        .await?;
    Ok(Json(view))
}

pub async fn get_recommendation_settings(
    State(state): State<AppState>,
) -> Json<RecommendationSettings> {
    Json(state.settings.recommendations())
}

pub async fn put_recommendation_settings(
    State(state): State<AppState>,
    Json(settings): Json<RecommendationSettings>,
) -> AppResult<Json<SettingsWriteResponse<RecommendationSettings>>> {
    let version = state.settings.write_recommendations(settings.clone())?;
    Ok(Json(SettingsWriteResponse { version, settings }))
}

pub async fn get_content_display_settings(
    State(state): State<AppState>,
) -> Json<ContentDisplaySettings> {
    Json(state.settings.content_display())
}

pub async fn put_content_display_settings(
    State(state): State<AppState>,
    Json(settings): Json<ContentDisplaySettings>,
) -> Json<ContentDisplaySettings> {
    state.settings.write_content_display(settings.clone());
    Json(settings)
}
