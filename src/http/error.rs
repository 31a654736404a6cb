//! Errors surfaced while building or rewriting responses.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors that can occur while building or post-processing a response.
#[derive(Debug, Error)]
pub enum ResponderError {
    /// The response body could not be read back for rewriting.
    #[error("response body is not writable: {0}")]
    StreamNotWritable(String),

    /// Source file of a file response does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Source file exists but could not be read.
    #[error("file {} is unreadable: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be encoded as JSON.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A caller-supplied value is not a legal header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(String),

    /// Template renderer or URL generator failed.
    #[error("render error: {0}")]
    Render(String),
}

impl From<axum::http::Error> for ResponderError {
    fn from(err: axum::http::Error) -> Self {
        ResponderError::InvalidHeader(err.to_string())
    }
}

impl From<axum::http::header::InvalidHeaderValue> for ResponderError {
    fn from(err: axum::http::header::InvalidHeaderValue) -> Self {
        ResponderError::InvalidHeader(err.to_string())
    }
}

/// Response extension set on every response built from a [`ResponderError`].
///
/// Lets outer middlewares tell a failed handler apart from one that chose an
/// error status itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedResponse;

/// Result type for responder operations.
pub type ResponderResult<T> = Result<T, ResponderError>;

impl ResponderError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponderError::StreamNotWritable(_) => "stream_not_writable",
            ResponderError::FileNotFound(_) => "file_not_found",
            ResponderError::FileUnreadable { .. } => "file_unreadable",
            ResponderError::Serialization(_) => "serialization",
            ResponderError::InvalidHeader(_) => "invalid_header",
            ResponderError::Render(_) => "render",
        }
    }

    /// Status code reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ResponderError::FileNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ResponderError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Failed to build response");
        } else {
            tracing::debug!(error = %self, kind = self.kind(), "Responding with client error");
        }
        crate::observability::metrics::record_responder_error(self.kind());
        let mut response = (status, status.canonical_reason().unwrap_or_default()).into_response();
        response.extensions_mut().insert(FailedResponse);
        response
    }
}
