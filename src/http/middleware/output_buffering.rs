//! Capture of incidental handler output.
//!
//! The middleware puts a fresh [`OutputBuffer`] into the request extensions
//! before calling the handler. Handlers extract it and write diagnostics,
//! legacy template output and the like into it; once the handler returns,
//! the captured bytes are merged into the response body according to the
//! configured [`BufferMode`].
//!
//! The buffer is released exactly once. If the handler panics or its future
//! is dropped, a drop guard discards whatever was captured and closes the
//! buffer; the panic itself keeps unwinding. A handler that fails with a
//! [`ResponderError`](crate::http::ResponderError) gets its error response
//! unchanged and its captured output discarded as well.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

pub use crate::config::BufferMode;
use crate::config::LimitsConfig;
use crate::http::error::{FailedResponse, ResponderResult};
use crate::http::header;
use crate::http::middleware::read_body;
use crate::observability::metrics;

#[derive(Debug, Default)]
struct Capture {
    bytes: Vec<u8>,
    closed: bool,
}

/// Per-request sink for output that is not part of the response body proper.
///
/// Clones share the same storage. Writes after the buffer was released are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    inner: Arc<Mutex<Capture>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Capture> {
        // Capture holds plain bytes; a poisoned lock leaves nothing inconsistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append `data`, returning the number of bytes accepted.
    pub fn write(&self, data: impl AsRef<[u8]>) -> usize {
        let data = data.as_ref();
        let mut capture = self.lock();
        if capture.closed {
            return 0;
        }
        capture.bytes.extend_from_slice(data);
        data.len()
    }

    pub fn len(&self) -> usize {
        self.lock().bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Take everything captured so far and refuse further writes.
    fn release(&self) -> Vec<u8> {
        let mut capture = self.lock();
        capture.closed = true;
        std::mem::take(&mut capture.bytes)
    }
}

impl std::fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        if OutputBuffer::write(self, s) == s.len() {
            Ok(())
        } else {
            Err(std::fmt::Error)
        }
    }
}

impl std::io::Write for OutputBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.is_closed() {
            return Err(std::io::ErrorKind::BrokenPipe.into());
        }
        Ok(OutputBuffer::write(self, buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Extracts the request's buffer. Without the middleware, a detached buffer
/// is handed out and its contents go nowhere.
impl<S> FromRequestParts<S> for OutputBuffer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<OutputBuffer>().cloned().unwrap_or_default())
    }
}

/// Releases the buffer when the handler does not return normally.
struct CaptureGuard {
    buffer: OutputBuffer,
    released: bool,
}

impl CaptureGuard {
    fn new(buffer: OutputBuffer) -> Self {
        Self {
            buffer,
            released: false,
        }
    }

    fn finish(mut self) -> Vec<u8> {
        self.released = true;
        self.buffer.release()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let discarded = self.buffer.release();
        tracing::debug!(
            bytes = discarded.len(),
            "Handler did not complete, discarding captured output"
        );
    }
}

/// State for [`output_buffering_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct OutputBuffering {
    mode: BufferMode,
    max_body_bytes: usize,
}

impl Default for OutputBuffering {
    fn default() -> Self {
        Self::new(BufferMode::default(), LimitsConfig::default().max_body_bytes)
    }
}

impl OutputBuffering {
    pub fn new(mode: BufferMode, max_body_bytes: usize) -> Self {
        Self {
            mode,
            max_body_bytes,
        }
    }

    pub fn mode(&self) -> BufferMode {
        self.mode
    }
}

/// Middleware function capturing handler output into the response.
pub async fn output_buffering_middleware(
    State(state): State<OutputBuffering>,
    mut request: Request<Body>,
    next: Next,
) -> ResponderResult<Response> {
    let buffer = OutputBuffer::new();
    request.extensions_mut().insert(buffer.clone());

    let guard = CaptureGuard::new(buffer);
    let response = next.run(request).await;
    let output = guard.finish();

    if response.extensions().get::<FailedResponse>().is_some() {
        tracing::debug!(
            bytes = output.len(),
            status = %response.status(),
            "Handler failed, discarding captured output"
        );
        return Ok(response);
    }

    merge_output(response, output, state.mode, state.max_body_bytes).await
}

/// Merge captured `output` into the body of `response`.
///
/// `Content-Length`, when present, is updated to the merged length.
pub async fn merge_output(
    response: Response,
    output: Vec<u8>,
    mode: BufferMode,
    max_body_bytes: usize,
) -> ResponderResult<Response> {
    let prepend = match mode {
        BufferMode::Discard => return Ok(response),
        BufferMode::Prepend => true,
        BufferMode::Append => false,
    };
    if output.is_empty() {
        return Ok(response);
    }

    let (mut parts, body) = response.into_parts();
    let existing = read_body(body, max_body_bytes).await?;
    let captured = output.len();

    let mut merged = Vec::with_capacity(existing.len() + captured);
    if prepend {
        merged.extend_from_slice(&output);
        merged.extend_from_slice(&existing);
    } else {
        merged.extend_from_slice(&existing);
        merged.extend_from_slice(&output);
    }

    if parts.headers.contains_key(header::CONTENT_LENGTH) {
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(merged.len()));
    }

    tracing::debug!(captured, ?mode, "Merged captured output into response body");
    metrics::record_captured_output(captured);

    Ok(Response::from_parts(parts, Body::from(merged)))
}
