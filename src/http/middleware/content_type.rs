//! Fills in `Content-Length` and `Content-Type` the handler left out.
//!
//! Both headers are only derived when the body length is known up front;
//! streaming bodies pass through untouched. Headers already present are
//! never replaced. Statuses that cannot carry a body (1xx, 204, 304) are
//! left alone.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::LimitsConfig;
use crate::http::error::ResponderResult;
use crate::http::header;
use crate::http::middleware::read_body;
use crate::http::mime::{MimeTypeDetector, SniffingDetector};
use crate::observability::metrics;

/// State for [`content_type_middleware`].
#[derive(Clone)]
pub struct ContentTypeInjection {
    detector: Arc<dyn MimeTypeDetector>,
    max_body_bytes: usize,
}

impl Default for ContentTypeInjection {
    fn default() -> Self {
        Self::new(None, LimitsConfig::default().max_body_bytes)
    }
}

impl ContentTypeInjection {
    /// `detector` defaults to [`SniffingDetector`].
    pub fn new(detector: Option<Arc<dyn MimeTypeDetector>>, max_body_bytes: usize) -> Self {
        Self {
            detector: detector.unwrap_or_else(|| Arc::new(SniffingDetector::new())),
            max_body_bytes,
        }
    }
}

/// Middleware function running [`inject_content_type`] on every response.
pub async fn content_type_middleware(
    State(state): State<ContentTypeInjection>,
    request: Request<Body>,
    next: Next,
) -> ResponderResult<Response> {
    let response = next.run(request).await;
    inject_content_type(response, Some(state.detector.as_ref()), state.max_body_bytes).await
}

/// Add missing `Content-Length` / `Content-Type` headers to `response`.
///
/// Without a detector the default [`SniffingDetector`] is used.
pub async fn inject_content_type(
    mut response: Response,
    detector: Option<&dyn MimeTypeDetector>,
    max_body_bytes: usize,
) -> ResponderResult<Response> {
    if is_bodiless(response.status()) {
        return Ok(response);
    }
    let Some(size) = response.body().size_hint().exact() else {
        return Ok(response);
    };

    if !response.headers().contains_key(header::CONTENT_LENGTH) {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, HeaderValue::from(size));
        metrics::record_injected_header("content-length");
    }

    if response.headers().contains_key(header::CONTENT_TYPE) {
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    let bytes = read_body(body, max_body_bytes).await?;
    let mime = match detector {
        Some(detector) => detector.detect_mime_type(&bytes),
        None => SniffingDetector::new().detect_mime_type(&bytes),
    };

    tracing::debug!(content_type = %mime, size, "Injecting detected content type");
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::try_from(mime)?);
    metrics::record_injected_header("content-type");

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn is_bodiless(status: StatusCode) -> bool {
    status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}
