//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks; warnings are logged by the caller)
//!     → AppConfig (validated, immutable)
//!     → CorsPolicy / OutputBuffering / limits built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::BufferMode;
pub use schema::CorsConfig;
pub use schema::LimitsConfig;
pub use schema::ObservabilityConfig;
pub use schema::OutputBufferingConfig;
pub use schema::ServerConfig;
pub use schema::VaryMode;
pub use validation::{config_warnings, ValidationWarning};
