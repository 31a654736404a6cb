//! Shared utilities for integration tests.

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use tower::ServiceExt;

/// Send a GET for `uri` with the given headers through `router`.
#[allow(dead_code)]
pub async fn get(router: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Header value as text, `None` when absent.
#[allow(dead_code)]
pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).map(|v| v.to_str().unwrap())
}
