//! HTTP response helpers.
//!
//! # Data Flow
//! ```text
//! handler
//!     → responder.rs (status, body, Content-Type/Length, file headers)
//!     → middleware/output_buffering.rs (merge captured output)
//!     → middleware/content_type.rs (fill missing Content-Type/Length)
//!     → middleware/cors.rs (Access-Control-* headers)
//!     → client
//! ```
//!
//! header.rs, content_type.rs and disposition.rs are the constant tables
//! everything above shares; mime.rs holds the detector seam and json.rs the
//! strict encoder.

pub mod content_type;
pub mod disposition;
pub mod error;
pub mod header;
pub mod json;
pub mod middleware;
pub mod mime;
pub mod responder;
pub mod server;

pub use error::{FailedResponse, ResponderError, ResponderResult};
pub use mime::{MimeTypeDetector, SniffingDetector};
pub use responder::{Content, Responder, TemplateRenderer, UrlGenerator};
pub use server::HttpServer;
