//! HTTP header name catalog.
//!
//! Standard names are re-exported from `axum::http::header` so they compare
//! equal to the ones the framework uses; names the `http` crate does not
//! define are declared here.

use axum::http::HeaderName;

pub use axum::http::header::{
    ACCEPT_CHARSET, ACCEPT_ENCODING, ACCEPT_LANGUAGE, ACCEPT_RANGES,
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, AGE, ALLOW, AUTHORIZATION,
    CACHE_CONTROL, CONNECTION, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE,
    CONTENT_LENGTH, CONTENT_LOCATION, CONTENT_RANGE, CONTENT_TYPE, DATE, ETAG, EXPECT, EXPIRES,
    FROM, HOST, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE, IF_UNMODIFIED_SINCE,
    LAST_MODIFIED, LINK, LOCATION, MAX_FORWARDS, ORIGIN, PRAGMA, PROXY_AUTHENTICATE,
    PROXY_AUTHORIZATION, RANGE, REFERER, RETRY_AFTER, SERVER, TE, TRAILER, TRANSFER_ENCODING,
    UPGRADE, USER_AGENT, VARY, VIA, WARNING, WWW_AUTHENTICATE,
};

pub const ALTERNATES: HeaderName = HeaderName::from_static("alternates");
pub const CONTENT_DESCRIPTION: HeaderName = HeaderName::from_static("content-description");
pub const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");
pub const CONTENT_TRANSFER_ENCODING: HeaderName =
    HeaderName::from_static("content-transfer-encoding");
pub const CONTENT_VERSION: HeaderName = HeaderName::from_static("content-version");
pub const DERIVED_FROM: HeaderName = HeaderName::from_static("derived-from");
pub const MIME_VERSION: HeaderName = HeaderName::from_static("mime-version");
pub const PUBLIC: HeaderName = HeaderName::from_static("public");
pub const TITLE: HeaderName = HeaderName::from_static("title");

/// Delegates file delivery to nginx (`internal` locations).
pub const X_ACCEL_REDIRECT: HeaderName = HeaderName::from_static("x-accel-redirect");

/// Format an `Allow` header value: upper-cased methods joined by `", "`.
pub fn allow<I, S>(methods: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    methods
        .into_iter()
        .map(|m| m.as_ref().to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_uppercases_and_joins() {
        assert_eq!(allow(["get", "Post", "DELETE"]), "GET, POST, DELETE");
        assert_eq!(allow(Vec::<String>::new()), "");
    }

    #[test]
    fn test_custom_names_render_canonically() {
        assert_eq!(X_ACCEL_REDIRECT.as_str(), "x-accel-redirect");
        assert_eq!(CONTENT_TRANSFER_ENCODING, "content-transfer-encoding");
    }
}
