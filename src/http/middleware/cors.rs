//! CORS response headers.
//!
//! Runs after the handler and decorates the response when the request
//! carries an `Origin` header. No preflight short-circuit: `OPTIONS` requests
//! reach the handler like any other.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::{CorsConfig, VaryMode};
use crate::http::header;
use crate::observability::metrics;

const WILDCARD: &str = "*";

/// What the policy decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorsOutcome {
    /// Request had no `Origin`; response left untouched.
    NoOrigin,
    /// No origins configured; only credentials/method/header lists applied.
    NoOriginsConfigured,
    /// Wildcard policy, `*` sent.
    Wildcard,
    /// Request origin listed and echoed back.
    Matched,
    /// Request origin not listed.
    Rejected,
}

impl CorsOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CorsOutcome::NoOrigin => "no_origin",
            CorsOutcome::NoOriginsConfigured => "no_origins_configured",
            CorsOutcome::Wildcard => "wildcard",
            CorsOutcome::Matched => "matched",
            CorsOutcome::Rejected => "rejected",
        }
    }
}

/// Allowed origins, methods and headers for cross-origin responses.
///
/// Every setter returns the value it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    origins: Vec<String>,
    allowed_methods: Vec<String>,
    allowed_headers: Vec<String>,
    exposed_headers: Vec<String>,
    allow_credentials: bool,
    vary: VaryMode,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::from(&CorsConfig::default())
    }
}

impl From<&CorsConfig> for CorsPolicy {
    fn from(config: &CorsConfig) -> Self {
        Self {
            origins: config.origins.clone(),
            allowed_methods: config.allowed_methods.clone(),
            allowed_headers: config.allowed_headers.clone(),
            exposed_headers: config.exposed_headers.clone(),
            allow_credentials: config.allow_credentials,
            vary: config.vary,
        }
    }
}

fn to_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl CorsPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy for `origins` with the credentials flag set as given.
    pub fn for_origins<I, S>(origins: I, allow_credentials: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: to_strings(origins),
            allow_credentials,
            ..Self::default()
        }
    }

    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    pub fn set_origins<I, S>(&mut self, origins: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        std::mem::replace(&mut self.origins, to_strings(origins))
    }

    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    pub fn set_allowed_methods<I, S>(&mut self, methods: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        std::mem::replace(&mut self.allowed_methods, to_strings(methods))
    }

    pub fn allowed_headers(&self) -> &[String] {
        &self.allowed_headers
    }

    pub fn set_allowed_headers<I, S>(&mut self, headers: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        std::mem::replace(&mut self.allowed_headers, to_strings(headers))
    }

    pub fn exposed_headers(&self) -> &[String] {
        &self.exposed_headers
    }

    pub fn set_exposed_headers<I, S>(&mut self, headers: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        std::mem::replace(&mut self.exposed_headers, to_strings(headers))
    }

    pub fn allow_credentials(&self) -> bool {
        self.allow_credentials
    }

    pub fn set_allow_credentials(&mut self, allow: bool) -> bool {
        std::mem::replace(&mut self.allow_credentials, allow)
    }

    pub fn vary(&self) -> VaryMode {
        self.vary
    }

    pub fn set_vary(&mut self, vary: VaryMode) -> VaryMode {
        std::mem::replace(&mut self.vary, vary)
    }

    /// `true` when any origin is allowed.
    pub fn is_wildcard(&self) -> bool {
        self.origins.iter().any(|o| o == WILDCARD)
    }

    /// Write the CORS headers for a request with `origin` into `headers`.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) -> CorsOutcome {
        let Some(origin) = origin else {
            return CorsOutcome::NoOrigin;
        };

        let outcome = if self.origins.is_empty() {
            CorsOutcome::NoOriginsConfigured
        } else if self.is_wildcard() {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(WILDCARD));
            CorsOutcome::Wildcard
        } else if self.is_listed(origin) {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            let vary = match self.vary {
                VaryMode::Origin => HeaderValue::from_static("Origin"),
                VaryMode::OriginValue => origin.clone(),
            };
            headers.append(header::VARY, vary);
            CorsOutcome::Matched
        } else {
            CorsOutcome::Rejected
        };

        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }

        insert_list(headers, header::ACCESS_CONTROL_ALLOW_METHODS, &self.allowed_methods);
        insert_list(headers, header::ACCESS_CONTROL_ALLOW_HEADERS, &self.allowed_headers);
        insert_list(headers, header::ACCESS_CONTROL_EXPOSE_HEADERS, &self.exposed_headers);

        outcome
    }

    fn is_listed(&self, origin: &HeaderValue) -> bool {
        origin
            .to_str()
            .map(|origin| self.origins.iter().any(|o| o == origin))
            .unwrap_or(false)
    }
}

/// Comma-join `values` into `name`; empty lists leave the header unset.
fn insert_list(headers: &mut HeaderMap, name: HeaderName, values: &[String]) {
    if values.is_empty() {
        return;
    }
    match HeaderValue::from_str(&values.join(",")) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => {
            tracing::warn!(header = %name, ?values, "Skipping CORS header with invalid characters");
        }
    }
}

/// Middleware function applying `policy` to every response.
pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();
    let mut response = next.run(request).await;

    let outcome = policy.apply(origin.as_ref(), response.headers_mut());
    if outcome == CorsOutcome::Rejected {
        tracing::debug!(origin = ?origin, "CORS origin not allowed");
    }
    metrics::record_cors(outcome.as_str());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(value: &'static str) -> HeaderValue {
        HeaderValue::from_static(value)
    }

    #[test]
    fn test_no_origin_leaves_headers_untouched() {
        let mut policy = CorsPolicy::for_origins(["*"], true);
        policy.set_allowed_methods(["GET"]);
        let mut headers = HeaderMap::new();

        assert_eq!(policy.apply(None, &mut headers), CorsOutcome::NoOrigin);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_listed_origin_is_echoed() {
        let policy = CorsPolicy::for_origins(["https://a.com", "https://b.com"], false);
        let mut headers = HeaderMap::new();

        let outcome = policy.apply(Some(&origin("https://b.com")), &mut headers);
        assert_eq!(outcome, CorsOutcome::Matched);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "https://b.com");
        assert_eq!(headers[header::VARY], "Origin");
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
    }

    #[test]
    fn test_vary_by_origin_value() {
        let mut policy = CorsPolicy::for_origins(["https://a.com"], false);
        assert_eq!(policy.set_vary(VaryMode::OriginValue), VaryMode::Origin);
        let mut headers = HeaderMap::new();

        policy.apply(Some(&origin("https://a.com")), &mut headers);
        assert_eq!(headers[header::VARY], "https://a.com");
    }

    #[test]
    fn test_wildcard_ignores_request_origin() {
        let policy = CorsPolicy::for_origins(["https://a.com", "*"], false);
        let mut headers = HeaderMap::new();

        let outcome = policy.apply(Some(&origin("https://evil.example")), &mut headers);
        assert_eq!(outcome, CorsOutcome::Wildcard);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(!headers.contains_key(header::VARY));
    }

    #[test]
    fn test_credentials_sent_even_when_rejected() {
        let policy = CorsPolicy::for_origins(["https://a.com"], true);
        let mut headers = HeaderMap::new();

        let outcome = policy.apply(Some(&origin("https://other.com")), &mut headers);
        assert_eq!(outcome, CorsOutcome::Rejected);
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let mut policy = CorsPolicy::new();
        policy.set_allow_credentials(false);
        policy.set_allowed_methods(["GET", "POST"]);
        policy.set_allowed_headers(["Content-Type", "X-Token"]);
        policy.set_exposed_headers(["X-Total"]);
        let mut headers = HeaderMap::new();

        let outcome = policy.apply(Some(&origin("https://a.com")), &mut headers);
        assert_eq!(outcome, CorsOutcome::NoOriginsConfigured);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET,POST");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type,X-Token");
        assert_eq!(headers[header::ACCESS_CONTROL_EXPOSE_HEADERS], "X-Total");
        assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[test]
    fn test_setters_return_previous_values() {
        let mut policy = CorsPolicy::for_origins(["https://a.com"], true);

        assert_eq!(policy.set_origins(["https://b.com"]), vec!["https://a.com"]);
        assert_eq!(policy.origins(), ["https://b.com"]);
        assert!(policy.set_allow_credentials(false));
        assert!(!policy.allow_credentials());
        assert!(policy.set_allowed_methods(["PUT"]).is_empty());
        assert_eq!(policy.allowed_methods(), ["PUT"]);
        assert!(policy.set_exposed_headers(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = CorsConfig {
            origins: vec!["*".into()],
            allowed_methods: vec!["GET".into()],
            ..CorsConfig::default()
        };
        let policy = CorsPolicy::from(&config);

        assert!(policy.is_wildcard());
        assert!(policy.allow_credentials());
        assert_eq!(policy.allowed_methods(), ["GET"]);
    }
}
