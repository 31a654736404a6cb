//! Configuration validation.
//!
//! Semantic checks that serde cannot express. All problems are collected so
//! a broken file is reported in one pass.

use std::net::SocketAddr;

use axum::http::{HeaderName, Method};
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("cors.origins: {0:?} is neither \"*\" nor an absolute URL")]
    InvalidOrigin(String),

    #[error("cors.allowed_methods: {0:?} is not an HTTP method")]
    InvalidMethod(String),

    #[error("{field}: {value:?} is not a valid header name")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error("{field}: {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// A legal but suspicious setting, reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    #[error("cors: wildcard origin combined with allow_credentials, browsers reject this pair")]
    WildcardWithCredentials,
}

/// Settings that load fine but are probably not what was meant.
pub fn config_warnings(config: &AppConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let cors = &config.cors;

    // The middleware still emits both headers.
    if cors.allow_credentials && cors.origins.iter().any(|o| o == "*") {
        warnings.push(ValidationWarning::WildcardWithCredentials);
    }

    warnings
}

/// Validate `config`, returning every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let cors = &config.cors;

    for origin in &cors.origins {
        if origin != "*" && Url::parse(origin).map(|u| !u.has_host()).unwrap_or(true) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    for method in &cors.allowed_methods {
        if method.parse::<Method>().is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }

    for (field, names) in [
        ("cors.allowed_headers", &cors.allowed_headers),
        ("cors.exposed_headers", &cors.exposed_headers),
    ] {
        for name in names {
            if name != "*" && name.parse::<HeaderName>().is_err() {
                errors.push(ValidationError::InvalidHeaderName {
                    field,
                    value: name.clone(),
                });
            }
        }
    }

    for (field, value) in [
        ("server.bind_address", &config.server.bind_address),
        ("observability.metrics_address", &config.observability.metrics_address),
    ] {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.cors.origins = vec!["*".into(), "https://ok.example".into(), "not a url".into()];
        config.cors.allowed_methods = vec!["GET".into(), "BAD METHOD".into()];
        config.cors.exposed_headers = vec!["X-Total".into(), "bad header".into()];
        config.server.bind_address = "localhost".into();
        config.limits.max_body_bytes = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidOrigin("not a url".into()),
                ValidationError::InvalidMethod("BAD METHOD".into()),
                ValidationError::InvalidHeaderName {
                    field: "cors.exposed_headers",
                    value: "bad header".into(),
                },
                ValidationError::InvalidAddress {
                    field: "server.bind_address",
                    value: "localhost".into(),
                },
                ValidationError::ZeroBodyLimit,
            ]
        );
    }

    #[test]
    fn test_wildcard_with_credentials_warns() {
        let mut config = AppConfig::default();
        assert!(config_warnings(&config).is_empty());

        config.cors.origins = vec!["*".into()];
        assert!(validate_config(&config).is_ok());
        assert_eq!(
            config_warnings(&config),
            vec![ValidationWarning::WildcardWithCredentials]
        );

        config.cors.allow_credentials = false;
        assert!(config_warnings(&config).is_empty());
    }

    #[test]
    fn test_origin_without_host_is_rejected() {
        let mut config = AppConfig::default();
        config.cors.origins = vec!["mailto:someone@example.com".into()];
        assert!(validate_config(&config).is_err());
    }
}
