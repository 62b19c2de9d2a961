//! Request handlers for the catalog service.

mod catalog;

pub use catalog::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Builds the JSON body returned for a missing chapter.
pub fn not_found(message: impl Into<String>) -> Response {
    let body = serde_json::json!({
        "code": "NotFound",
        "message": message.into(),
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
