//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! fall back to defaults for missing sections and fields.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Demo server settings.
    pub server: ServerConfig,

    /// CORS policy applied by the CORS middleware.
    pub cors: CorsConfig,

    /// Output buffering middleware settings.
    pub output_buffering: OutputBufferingConfig,

    /// Body buffering limits shared by the rewriting middlewares.
    pub limits: LimitsConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Demo server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Directory served by the file and download routes.
    pub files_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            files_dir: "public".to_string(),
        }
    }
}

/// What the `Vary` header carries when an origin is echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaryMode {
    /// `Vary: Origin`.
    #[default]
    Origin,
    /// `Vary: <request origin>`, kept for callers relying on it.
    OriginValue,
}

/// CORS policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any origin. Empty disables the
    /// `Access-Control-Allow-Origin` header.
    pub origins: Vec<String>,

    /// Methods listed in `Access-Control-Allow-Methods`.
    pub allowed_methods: Vec<String>,

    /// Headers listed in `Access-Control-Allow-Headers`.
    pub allowed_headers: Vec<String>,

    /// Headers listed in `Access-Control-Expose-Headers`.
    pub exposed_headers: Vec<String>,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// `Vary` header content for echoed origins.
    pub vary: VaryMode,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: Vec::new(),
            allowed_methods: Vec::new(),
            allowed_headers: Vec::new(),
            exposed_headers: Vec::new(),
            allow_credentials: true,
            vary: VaryMode::default(),
        }
    }
}

/// Where captured handler output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BufferMode {
    /// Captured output before the response body.
    Prepend,
    /// Captured output after the response body.
    #[default]
    Append,
    /// Captured output is dropped.
    Discard,
}

/// Output buffering configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputBufferingConfig {
    pub mode: BufferMode,
}

/// Body buffering limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest response body the middlewares will read back into memory.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "http_responder=debug,tower_http=debug".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
