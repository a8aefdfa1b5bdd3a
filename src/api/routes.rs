use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Libraries
        .route("/libraries", get(handlers::get_libraries))
        .route("/libraries/:id/home", get(handlers::get_home))
        // Rails
        .route("/libraries/:id/rails/:index", get(handlers::get_rail))
        .route("/libraries/:id/rails/:index/advance", post(handlers::advance_rail))
        .route("/libraries/:id/rails/:index/retreat", post(handlers::retreat_rail))
        .route("/libraries/:id/rails/:index/page/:page", post(handlers::jump_rail))
        .route("/libraries/:id/rails/:index/refresh", post(handlers::refresh_rail))
        .route(
            "/libraries/:id/rails/:index/items/:rating_key/remove",
            post(handlers::remove_rail_item),
        )
        // Settings
        .route(
            "/settings/recommendations",
            get(handlers::get_recommendation_settings).put(handlers::put_recommendation_settings),
        )
        .route(
            "/settings/content-display",
            get(handlers::get_content_display_settings)
                .put(handlers::put_content_display_settings),
        )
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}
