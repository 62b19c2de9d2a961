//! Chapter and page handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::not_found;
use crate::error::SourceResult;
use crate::models::{ChapterRef, PageRef, Series};
use crate::router::AppState;
use crate::source::mri::{encode_mri, MRI_CONTENT_TYPE};
use crate::source::ChapterManifest;

/// GET /health - Liveness probe.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /series - List the most popular series.
pub async fn list_series(State(state): State<AppState>) -> SourceResult<Json<Vec<Series>>> {
    Ok(Json(state.resolver.popular_series().await?))
}

/// GET /series/{series}/chapters/{chapter} - Describe a chapter.
pub async fn get_chapter(
    State(state): State<AppState>,
    Path((series, chapter)): Path<(String, u32)>,
) -> SourceResult<Response> {
    let chapter_ref = ChapterRef::new(series, chapter);
    let Some(data) = state.resolver.resolve_chapter(&chapter_ref).await? else {
        return Ok(not_found(format!("Chapter {} does not exist", chapter_ref)));
    };

    let manifest = ChapterManifest {
        series_id: chapter_ref.series_id,
        chapter_number: chapter_ref.chapter_number,
        page_count: data.len() as u32,
    };
    Ok(Json(manifest).into_response())
}

/// GET /series/{series}/chapters/{chapter}/pages/{page} - Fetch a page image.
///
/// In obfuscated mode the image is wrapped as the tail of a VP8 chunk and
/// served MRI-encoded.
pub async fn get_page_image(
    State(state): State<AppState>,
    Path((series, chapter, page)): Path<(String, u32, u32)>,
) -> SourceResult<Response> {
    let page_ref = PageRef::new(series, chapter, page);
    let image = state.resolver.resolve_page_image(&page_ref).await?;

    if state.config.obfuscate {
        let mut chunk = Vec::with_capacity(image.len() + 1);
        chunk.push(b' ');
        chunk.extend_from_slice(&image.bytes);
        let payload = encode_mri(&chunk)?;
        return Ok(([(header::CONTENT_TYPE, MRI_CONTENT_TYPE)], payload).into_response());
    }

    Ok(([(header::CONTENT_TYPE, image.mime)], image.bytes).into_response())
}
