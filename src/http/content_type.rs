//! MIME type constants used by the responder and the detectors.

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_CSS: &str = "text/css";
pub const TEXT_XML: &str = "text/xml";
pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_XML: &str = "application/xml";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const APPLICATION_ZIP: &str = "application/zip";
pub const APPLICATION_GZIP: &str = "application/gzip";
pub const APPLICATION_WASM: &str = "application/wasm";
pub const OCTET_STREAM: &str = "application/octet-stream";
/// Reported for zero-length content.
pub const EMPTY: &str = "application/x-empty";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_WEBP: &str = "image/webp";
pub const IMAGE_BMP: &str = "image/bmp";
pub const IMAGE_SVG: &str = "image/svg+xml";
pub const AUDIO_MPEG: &str = "audio/mpeg";
pub const AUDIO_OGG: &str = "audio/ogg";
pub const AUDIO_WAV: &str = "audio/x-wav";
pub const VIDEO_MP4: &str = "video/mp4";
pub const FONT_WOFF: &str = "font/woff";
pub const FONT_WOFF2: &str = "font/woff2";
