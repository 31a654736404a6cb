//! Response post-processing middlewares.
//!
//! Each middleware runs the inner service first and then rewrites the
//! response on its way out. They plug into axum with
//! `axum::middleware::from_fn_with_state`:
//!
//! ```text
//! request ──▶ cors ──▶ content_type ──▶ output_buffering ──▶ handler
//! response ◀─ cors ◀── content_type ◀── output_buffering ◀── handler
//! ```
//!
//! Content-type injection should sit outside output buffering so it sees
//! the merged body.

pub mod content_type;
pub mod cors;
pub mod output_buffering;

pub use content_type::{content_type_middleware, inject_content_type, ContentTypeInjection};
pub use cors::{cors_middleware, CorsOutcome, CorsPolicy};
pub use output_buffering::{merge_output, output_buffering_middleware, OutputBuffer, OutputBuffering};

use axum::body::{Body, Bytes};

use crate::http::error::{ResponderError, ResponderResult};

/// Read a whole response body back into memory, bounded by `limit` bytes.
pub(crate) async fn read_body(body: Body, limit: usize) -> ResponderResult<Bytes> {
    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| ResponderError::StreamNotWritable(e.to_string()))
}
