//! Demo HTTP server.
//!
//! # Responsibilities
//! - Create the axum Router with demo handlers for every responder shape
//! - Wire up the middlewares from configuration (CORS, content type,
//!   output buffering) plus request tracing
//! - Serve on a listener until Ctrl+C

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Response,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::http::error::{ResponderError, ResponderResult};
use crate::http::middleware::{
    content_type_middleware, cors_middleware, output_buffering_middleware, ContentTypeInjection,
    CorsPolicy, OutputBuffer, OutputBuffering,
};
use crate::http::responder::{Content, Responder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub responder: Responder,
    pub files_dir: Arc<PathBuf>,
}

/// HTTP server for the demo routes.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let responder = Responder::default();
        let state = AppState {
            responder: responder.clone(),
            files_dir: Arc::new(PathBuf::from(&config.server.files_dir)),
        };

        let router = Self::build_router(&config, responder, state);
        Self { router, config }
    }

    /// Build the axum router with all middleware layers.
    fn build_router(config: &AppConfig, responder: Responder, state: AppState) -> Router {
        let limit = config.limits.max_body_bytes;
        let buffering = OutputBuffering::new(config.output_buffering.mode, limit);
        let injection = ContentTypeInjection::new(Some(responder.detector().clone()), limit);
        let cors = Arc::new(CorsPolicy::from(&config.cors));

        Router::new()
            .route("/", get(index))
            .route("/json", get(status))
            .route("/text", get(text))
            .route("/files/{name}", get(inline_file))
            .route("/download/{name}", get(download_file))
            .route("/go", get(go))
            .route("/accel/{name}", get(accel))
            .route("/legacy", get(legacy))
            .fallback(not_found)
            .with_state(state)
            .layer(from_fn_with_state(buffering, output_buffering_middleware))
            .layer(from_fn_with_state(injection, content_type_middleware))
            .layer(from_fn_with_state(cors, cors_middleware))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The fully layered router, for embedding or in-process testing.
    pub fn into_router(self) -> Router {
        self.router
    }
}

#[derive(Serialize)]
struct SystemStatus {
    version: &'static str,
    status: &'static str,
}

#[derive(Deserialize)]
struct RedirectParams {
    to: String,
    code: Option<u16>,
}

async fn index(State(state): State<AppState>) -> ResponderResult<Response> {
    state
        .responder
        .html("<!DOCTYPE html><html><body><h1>http-responder</h1></body></html>")
}

async fn status(State(state): State<AppState>) -> ResponderResult<Response> {
    state.responder.json(
        StatusCode::OK,
        &SystemStatus {
            version: env!("CARGO_PKG_VERSION"),
            status: "operational",
        },
    )
}

async fn text(State(state): State<AppState>) -> ResponderResult<Response> {
    state.responder.text("plain text response")
}

async fn inline_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponderResult<Response> {
    let path = resolve_file(&state, &name)?;
    state.responder.file(path, true).await
}

async fn download_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponderResult<Response> {
    let path = resolve_file(&state, &name)?;
    state.responder.download(path).await
}

async fn go(
    State(state): State<AppState>,
    Query(params): Query<RedirectParams>,
) -> ResponderResult<Response> {
    state
        .responder
        .redirect(&params.to, params.code.unwrap_or(StatusCode::FOUND.as_u16()))
}

async fn accel(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ResponderResult<Response> {
    if !is_plain_file_name(&name) {
        return state.responder.bad("invalid file name");
    }
    state.responder.nginx(&format!("/internal/{name}"))
}

/// Writes through the output buffer the way older template code prints.
async fn legacy(output: OutputBuffer) -> &'static str {
    output.write("<!-- rendered by legacy template -->\n");
    "legacy body"
}

async fn not_found(State(state): State<AppState>) -> ResponderResult<Response> {
    state
        .responder
        .not_found(Some(Content::from("Not Found")))
}

/// Map a request file name into the served directory.
fn resolve_file(state: &AppState, name: &str) -> ResponderResult<PathBuf> {
    if !is_plain_file_name(name) {
        return Err(ResponderError::FileNotFound(PathBuf::from(name)));
    }
    Ok(state.files_dir.join(name))
}

/// A single path component with no traversal.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
