//! Response construction facade.
//!
//! [`Responder`] turns handler output (text, bytes, JSON values, files) into
//! complete responses with `Content-Type` and `Content-Length` set. It is
//! cheap to clone and meant to live in router state.
//!
//! # Status defaults
//! - No explicit code and no content: `204 No Content`
//! - No explicit code with content: `200 OK`, even when the content is empty

use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;

use crate::http::content_type;
use crate::http::disposition;
use crate::http::error::{ResponderError, ResponderResult};
use crate::http::header;
use crate::http::json;
use crate::http::mime::{MimeTypeDetector, SniffingDetector};
use crate::observability::metrics;

/// Content handed to [`Responder::respond`].
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Text sent as-is; its type comes from the caller or the detector.
    Text(String),
    /// Raw bytes sent as-is; its type comes from the caller or the detector.
    Bytes(Bytes),
    /// Structured value, always encoded as `application/json`.
    Json(serde_json::Value),
}

impl Content {
    /// Capture any serializable value as JSON content.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> ResponderResult<Self> {
        Ok(Content::Json(json::to_value(value)?))
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(Bytes::from(bytes))
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Content::Json(value)
    }
}

/// Renders a named template for [`Responder::view`].
pub trait TemplateRenderer {
    fn render(
        &self,
        template: &str,
        params: &serde_json::Value,
    ) -> Result<String, Box<dyn StdError + Send + Sync>>;
}

/// Builds a URL for a named route for [`Responder::route`].
pub trait UrlGenerator {
    fn generate(
        &self,
        name: &str,
        params: &[(&str, &str)],
    ) -> Result<String, Box<dyn StdError + Send + Sync>>;
}

/// Builds HTTP responses from handler output.
#[derive(Clone)]
pub struct Responder {
    detector: Arc<dyn MimeTypeDetector>,
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(Arc::new(SniffingDetector::new()))
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}

impl Responder {
    /// Create a responder that guesses content types with `detector`.
    pub fn new(detector: Arc<dyn MimeTypeDetector>) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &Arc<dyn MimeTypeDetector> {
        &self.detector
    }

    /// Build a response from optional content.
    ///
    /// Structured content is encoded as JSON and typed `application/json`
    /// regardless of `content_type`. Other content uses `content_type` when
    /// given, the detector's guess otherwise.
    pub fn respond(
        &self,
        code: Option<StatusCode>,
        content: Option<Content>,
        content_type: Option<&str>,
    ) -> ResponderResult<Response> {
        let Some(content) = content else {
            let status = code.unwrap_or(StatusCode::NO_CONTENT);
            metrics::record_response(status);
            return Ok(Response::builder().status(status).body(Body::empty())?);
        };

        let status = code.unwrap_or(StatusCode::OK);
        let (bytes, content_type) = match content {
            Content::Json(value) => (
                Bytes::from(serde_json::to_vec(&value)?),
                content_type::APPLICATION_JSON.to_string(),
            ),
            Content::Text(text) => self.typed(Bytes::from(text), content_type),
            Content::Bytes(bytes) => self.typed(bytes, content_type),
        };

        let response = Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, bytes.len())
            .body(Body::from(bytes))?;

        metrics::record_response(status);
        Ok(response)
    }

    fn typed(&self, bytes: Bytes, content_type: Option<&str>) -> (Bytes, String) {
        let content_type = match content_type {
            Some(ct) => ct.to_string(),
            None => self.detector.detect_mime_type(&bytes),
        };
        (bytes, content_type)
    }

    /// `204 No Content`.
    pub fn no_content(&self) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::NO_CONTENT), None, None)
    }

    /// Serialize `content` as the JSON body.
    pub fn json<T: Serialize + ?Sized>(
        &self,
        code: StatusCode,
        content: &T,
    ) -> ResponderResult<Response> {
        let encoded = json::to_vec(content)?;
        self.respond(
            Some(code),
            Some(Content::Bytes(Bytes::from(encoded))),
            Some(content_type::APPLICATION_JSON),
        )
    }

    /// Send `text` as JSON: verbatim when it already is a JSON document,
    /// encoded as a JSON string otherwise.
    pub fn json_str(&self, code: StatusCode, text: &str) -> ResponderResult<Response> {
        if serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok() {
            return self.respond(
                Some(code),
                Some(Content::from(text)),
                Some(content_type::APPLICATION_JSON),
            );
        }
        self.json(code, text)
    }

    /// `200 OK` typed `text/html`.
    pub fn html(&self, content: impl Into<Content>) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::OK), Some(content.into()), Some(content_type::TEXT_HTML))
    }

    /// `200 OK` typed `text/plain`.
    pub fn text(&self, content: impl Into<Content>) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::OK), Some(content.into()), Some(content_type::TEXT_PLAIN))
    }

    pub fn ok(&self, content: impl Into<Content>) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::OK), Some(content.into()), None)
    }

    pub fn bad(&self, content: impl Into<Content>) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::BAD_REQUEST), Some(content.into()), None)
    }

    pub fn not_found(&self, content: Option<Content>) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::NOT_FOUND), content, None)
    }

    pub fn server_error(&self, content: Option<Content>) -> ResponderResult<Response> {
        self.respond(Some(StatusCode::INTERNAL_SERVER_ERROR), content, None)
    }

    /// Redirect to `location`. Codes outside `300..=308` fall back to 302.
    pub fn redirect(&self, location: &str, code: u16) -> ResponderResult<Response> {
        let status = if (300..=308).contains(&code) {
            StatusCode::from_u16(code).unwrap_or(StatusCode::FOUND)
        } else {
            StatusCode::FOUND
        };

        let mut response = self.respond(Some(status), None, None)?;
        response
            .headers_mut()
            .insert(header::LOCATION, HeaderValue::try_from(location)?);
        Ok(response)
    }

    /// `302 Found` redirect.
    pub fn redirect_found(&self, location: &str) -> ResponderResult<Response> {
        self.redirect(location, StatusCode::FOUND.as_u16())
    }

    /// Send the file at `path`, displayed inline or offered as a download.
    pub async fn file(&self, path: impl AsRef<Path>, inline: bool) -> ResponderResult<Response> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => ResponderError::FileNotFound(path.to_path_buf()),
            _ => ResponderError::FileUnreadable {
                path: path.to_path_buf(),
                source: err,
            },
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = self.detector.detect_file(path, &data);
        let disposition = if inline {
            disposition::inline(&filename)
        } else {
            disposition::attachment(&filename)
        };

        tracing::debug!(
            path = %path.display(),
            size = data.len(),
            content_type = %content_type,
            inline,
            "Sending file"
        );

        let mut response = self.respond(None, Some(Content::from(data)), Some(&content_type))?;
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_DISPOSITION, HeaderValue::try_from(disposition)?);
        for (name, value) in FILE_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
        Ok(response)
    }

    /// Send the file at `path` as an attachment.
    pub async fn download(&self, path: impl AsRef<Path>) -> ResponderResult<Response> {
        self.file(path, false).await
    }

    /// Empty response asking nginx to serve `filename` itself.
    pub fn nginx(&self, filename: &str) -> ResponderResult<Response> {
        let mut response = self.respond(None, None, None)?;
        response
            .headers_mut()
            .insert(header::X_ACCEL_REDIRECT, HeaderValue::try_from(filename)?);
        Ok(response)
    }

    /// Render `template` through `renderer` as an HTML page.
    pub fn view<R>(
        &self,
        renderer: &R,
        template: &str,
        params: &serde_json::Value,
    ) -> ResponderResult<Response>
    where
        R: TemplateRenderer + ?Sized,
    {
        let page = renderer
            .render(template, params)
            .map_err(|err| ResponderError::Render(format!("template {template}: {err}")))?;
        self.html(page)
    }

    /// Redirect to the URL `generator` builds for the route `name`.
    pub fn route<G>(
        &self,
        generator: &G,
        name: &str,
        params: &[(&str, &str)],
        permanent: bool,
    ) -> ResponderResult<Response>
    where
        G: UrlGenerator + ?Sized,
    {
        let url = generator
            .generate(name, params)
            .map_err(|err| ResponderError::Render(format!("route {name}: {err}")))?;
        let code = if permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        };
        self.redirect(&url, code.as_u16())
    }
}

/// Headers every file response carries besides its disposition.
const FILE_HEADERS: [(HeaderName, &str); 5] = [
    (header::CONTENT_DESCRIPTION, "File-transfer"),
    (header::CONTENT_TRANSFER_ENCODING, "binary"),
    (header::EXPIRES, "0"),
    (header::CACHE_CONTROL, "must-revalidate"),
    (header::PRAGMA, "public"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    async fn body_bytes(response: Response) -> Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    fn header_str<'a>(response: &'a Response, name: &HeaderName) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_respond_text_sets_length_and_detected_type() {
        let responder = Responder::default();
        let response = responder
            .respond(None, Some("héllo".into()), None)
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, &header::CONTENT_TYPE), "text/plain");
        assert_eq!(header_str(&response, &header::CONTENT_LENGTH), "6");
        assert_eq!(body_bytes(response).await, "héllo".as_bytes());
    }

    #[tokio::test]
    async fn test_respond_without_content_is_no_content() {
        let responder = Responder::default();
        let response = responder.respond(None, None, None).unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_respond_empty_text_keeps_ok() {
        let responder = Responder::default();
        let response = responder.respond(None, Some("".into()), None).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, &header::CONTENT_LENGTH), "0");
    }

    #[test]
    fn test_structured_content_forces_json_type() {
        let responder = Responder::default();
        let response = responder
            .respond(
                Some(StatusCode::CREATED),
                Some(serde_json::json!({"id": 7}).into()),
                Some("text/html"),
            )
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(header_str(&response, &header::CONTENT_TYPE), "application/json");
    }

    #[tokio::test]
    async fn test_json_round_trips() {
        #[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
        struct User {
            name: String,
            tags: Vec<String>,
        }
        let user = User {
            name: "ada".into(),
            tags: vec!["admin".into()],
        };

        let response = Responder::default().json(StatusCode::OK, &user).unwrap();
        assert_eq!(header_str(&response, &header::CONTENT_TYPE), "application/json");

        let decoded: User = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(decoded, user);
    }

    #[test]
    fn test_json_rejects_non_string_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "point");

        let err = Responder::default().json(StatusCode::OK, &map).unwrap_err();
        assert!(matches!(err, ResponderError::Serialization(_)));
    }

    #[test]
    fn test_json_rejects_non_finite_floats() {
        let responder = Responder::default();

        let err = responder.json(StatusCode::OK, &f64::NAN).unwrap_err();
        assert!(matches!(err, ResponderError::Serialization(_)));

        let err = responder.json(StatusCode::OK, &[0.5, f64::INFINITY]).unwrap_err();
        assert!(matches!(err, ResponderError::Serialization(_)));

        assert!(matches!(
            Content::json(&f64::INFINITY),
            Err(ResponderError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_json_str_passes_documents_through() {
        let responder = Responder::default();

        let response = responder.json_str(StatusCode::OK, r#"{"ok":true}"#).unwrap();
        assert_eq!(body_bytes(response).await, r#"{"ok":true}"#.as_bytes());

        let response = responder.json_str(StatusCode::OK, "plain").unwrap();
        assert_eq!(body_bytes(response).await, r#""plain""#.as_bytes());
    }

    #[test]
    fn test_html_and_text_types() {
        let responder = Responder::default();
        let html = responder.html("<p>hi</p>").unwrap();
        let text = responder.text("<p>hi</p>").unwrap();

        assert_eq!(header_str(&html, &header::CONTENT_TYPE), "text/html");
        assert_eq!(header_str(&text, &header::CONTENT_TYPE), "text/plain");
    }

    #[test]
    fn test_status_wrappers() {
        let responder = Responder::default();
        assert_eq!(responder.not_found(None).unwrap().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            responder.server_error(Some("boom".into())).unwrap().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(responder.bad("nope").unwrap().status(), StatusCode::BAD_REQUEST);

        let ok = responder.ok(serde_json::json!([1, 2])).unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(header_str(&ok, &header::CONTENT_TYPE), "application/json");
    }

    #[test]
    fn test_redirect_clamps_code() {
        let responder = Responder::default();
        for (code, expected) in [(301, 301), (300, 300), (308, 308), (200, 302), (309, 302), (0, 302)] {
            let response = responder.redirect("/login", code).unwrap();
            assert_eq!(response.status().as_u16(), expected, "code {code}");
            assert_eq!(header_str(&response, &header::LOCATION), "/login");
        }
    }

    #[test]
    fn test_redirect_rejects_invalid_location() {
        let err = Responder::default().redirect("/a\nb", 302).unwrap_err();
        assert!(matches!(err, ResponderError::InvalidHeader(_)));
    }

    #[tokio::test]
    async fn test_file_download_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report 2024.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let response = Responder::default().download(&path).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, &header::CONTENT_TYPE), "text/csv");
        assert_eq!(header_str(&response, &header::CONTENT_LENGTH), "8");
        assert_eq!(
            header_str(&response, &header::CONTENT_DISPOSITION),
            "attachment; filename=\"report 2024.csv\"; filename*=UTF-8''report%202024.csv"
        );
        assert_eq!(header_str(&response, &header::CONTENT_DESCRIPTION), "File-transfer");
        assert_eq!(header_str(&response, &header::CONTENT_TRANSFER_ENCODING), "binary");
        assert_eq!(header_str(&response, &header::EXPIRES), "0");
        assert_eq!(header_str(&response, &header::CACHE_CONTROL), "must-revalidate");
        assert_eq!(header_str(&response, &header::PRAGMA), "public");
        assert_eq!(body_bytes(response).await, "a,b\n1,2\n".as_bytes());
    }

    #[tokio::test]
    async fn test_file_inline_disposition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes");
        std::fs::write(&path, "just words").unwrap();

        let response = Responder::default().file(&path, true).await.unwrap();
        assert!(header_str(&response, &header::CONTENT_DISPOSITION).starts_with("inline; "));
        assert_eq!(header_str(&response, &header::CONTENT_TYPE), "text/plain");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Responder::default()
            .file(dir.path().join("gone.txt"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ResponderError::FileNotFound(_)));
    }

    #[test]
    fn test_nginx_accel_redirect() {
        let response = Responder::default().nginx("/protected/a.iso").unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(header_str(&response, &header::X_ACCEL_REDIRECT), "/protected/a.iso");
    }

    struct Templates;

    impl TemplateRenderer for Templates {
        fn render(
            &self,
            template: &str,
            params: &serde_json::Value,
        ) -> Result<String, Box<dyn StdError + Send + Sync>> {
            match template {
                "hello" => Ok(format!("<h1>Hello {}</h1>", params["name"].as_str().unwrap_or("?"))),
                _ => Err("unknown template".into()),
            }
        }
    }

    struct Routes;

    impl UrlGenerator for Routes {
        fn generate(
            &self,
            name: &str,
            params: &[(&str, &str)],
        ) -> Result<String, Box<dyn StdError + Send + Sync>> {
            match (name, params) {
                ("user", [("id", id)]) => Ok(format!("/users/{id}")),
                _ => Err("no such route".into()),
            }
        }
    }

    #[tokio::test]
    async fn test_view_renders_html() {
        let responder = Responder::default();
        let response = responder
            .view(&Templates, "hello", &serde_json::json!({"name": "Ada"}))
            .unwrap();
        assert_eq!(header_str(&response, &header::CONTENT_TYPE), "text/html");
        assert_eq!(body_bytes(response).await, "<h1>Hello Ada</h1>".as_bytes());

        let err = responder
            .view(&Templates, "missing", &serde_json::Value::Null)
            .unwrap_err();
        assert!(matches!(err, ResponderError::Render(_)));
    }

    #[test]
    fn test_route_redirects() {
        let responder = Responder::default();
        let response = responder.route(&Routes, "user", &[("id", "42")], true).unwrap();
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(header_str(&response, &header::LOCATION), "/users/42");

        let response = responder.route(&Routes, "user", &[("id", "42")], false).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }
}
