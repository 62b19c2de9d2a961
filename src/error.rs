//! Content source error types and error response formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Kinds of content source failures.
///
/// A chapter that does not exist is not an error: resolution returns `None`
/// and traversal treats it as the end of content in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote source could not be reached.
    Transport,
    /// The remote source answered with an unexpected status.
    Status,
    /// A payload could not be decoded.
    Decode,
    /// A page range is inverted, spans series, or has no anchor.
    InvalidRange,
    /// Range expansion would produce more pages than allowed.
    RangeLimitExceeded,
    /// A reference does not match the chapter data it points into.
    InvalidReference,
    /// A page exists but its image cannot be produced.
    ImageUnavailable,
    Internal,
}

impl ErrorKind {
    /// Returns the string representation of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "Transport",
            ErrorKind::Status => "Status",
            ErrorKind::Decode => "Decode",
            ErrorKind::InvalidRange => "InvalidRange",
            ErrorKind::RangeLimitExceeded => "RangeLimitExceeded",
            ErrorKind::InvalidReference => "InvalidReference",
            ErrorKind::ImageUnavailable => "ImageUnavailable",
            ErrorKind::Internal => "Internal",
        }
    }

    /// True for caller bugs (malformed ranges or references), as opposed to
    /// failures of the underlying source.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidRange | ErrorKind::RangeLimitExceeded | ErrorKind::InvalidReference
        )
    }

    /// Returns the HTTP status code used by the catalog service.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::InvalidRange
            | ErrorKind::RangeLimitExceeded
            | ErrorKind::InvalidReference => StatusCode::BAD_REQUEST,
            ErrorKind::ImageUnavailable => StatusCode::NOT_FOUND,
            ErrorKind::Transport | ErrorKind::Status => StatusCode::BAD_GATEWAY,
            ErrorKind::Decode | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default message for this error kind.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "The content source could not be reached.",
            ErrorKind::Status => "The content source returned an unexpected status.",
            ErrorKind::Decode => "The content payload could not be decoded.",
            ErrorKind::InvalidRange => "The page range is malformed.",
            ErrorKind::RangeLimitExceeded => "The page range expands to too many pages.",
            ErrorKind::InvalidReference => "The page reference does not exist in its chapter.",
            ErrorKind::ImageUnavailable => "The page image is not available.",
            ErrorKind::Internal => "The content source encountered an internal error.",
        }
    }
}

/// Content source error with kind and message.
#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct SourceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SourceError {
    /// Creates a new error with the given kind and default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            message: kind.default_message().to_string(),
            kind,
        }
    }

    /// Creates a new error with a custom message.
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_invariant_violation(&self) -> bool {
        self.kind.is_invariant_violation()
    }
}

impl Clone for SourceError {
    fn clone(&self) -> Self {
        Self::with_message(self.kind, self.message.clone())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => SourceError::with_message(
                ErrorKind::Status,
                format!("{} ({})", status, error),
            ),
            None if error.is_decode() => {
                SourceError::with_message(ErrorKind::Decode, error.to_string())
            }
            None => SourceError::with_message(ErrorKind::Transport, error.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        SourceError::with_message(ErrorKind::Decode, error.to_string())
    }
}

impl IntoResponse for SourceError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();
        let body = serde_json::json!({
            "code": self.kind.as_str(),
            "message": self.message,
        });
        (status, Json(body)).into_response()
    }
}

/// Result type alias for content source operations.
pub type SourceResult<T> = Result<T, SourceError>;
