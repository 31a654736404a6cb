//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Responder + middlewares produce:
//!     → tracing events (logging.rs installs the subscriber)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by EnvFilter)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
