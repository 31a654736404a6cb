//! Response building and response post-processing middlewares for axum.
//!
//! - [`http::Responder`] builds JSON, HTML, text, file, redirect and
//!   accelerated-file responses with content type and length set.
//! - [`http::middleware`] holds the CORS, content-type injection and output
//!   buffering middlewares.
//! - [`http::header`], [`http::content_type`] and [`http::disposition`] are
//!   the shared constant tables.

pub mod config;
pub mod http;
pub mod observability;

pub use config::AppConfig;
pub use http::middleware::{CorsPolicy, OutputBuffer};
pub use http::{Content, HttpServer, Responder, ResponderError};
