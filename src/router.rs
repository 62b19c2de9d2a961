//! Request routing for the catalog service.

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::CatalogConfig;
use crate::handlers;
use crate::source::ChapterResolver;

/// Application state shared between handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<CatalogConfig>,
    pub resolver: Arc<dyn ChapterResolver>,
}

/// Creates the router for the catalog service.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/series", get(handlers::list_series))
        .route(
            "/series/:series/chapters/:chapter",
            get(handlers::get_chapter),
        )
        .route(
            "/series/:series/chapters/:chapter/pages/:page",
            get(handlers::get_page_image),
        )
        .with_state(state)
}
