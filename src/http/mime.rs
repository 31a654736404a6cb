//! MIME type detection.
//!
//! [`MimeTypeDetector`] is the seam the responder and the content-type
//! injection middleware use; [`SniffingDetector`] is the default, looking at
//! magic numbers and, when a file path is known, at its extension.

use std::path::Path;

use crate::http::content_type;

/// Guesses a MIME type for a piece of content.
pub trait MimeTypeDetector: Send + Sync {
    /// Detect from raw content only.
    fn detect_mime_type(&self, content: &[u8]) -> String;

    /// Detect content read from `path`. Defaults to ignoring the path.
    fn detect_file(&self, path: &Path, content: &[u8]) -> String {
        let _ = path;
        self.detect_mime_type(content)
    }
}

/// Magic-number detector with an extension lookup for files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SniffingDetector;

/// Leading byte signatures, checked in order.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", content_type::IMAGE_PNG),
    (b"\xff\xd8\xff", content_type::IMAGE_JPEG),
    (b"GIF87a", content_type::IMAGE_GIF),
    (b"GIF89a", content_type::IMAGE_GIF),
    (b"%PDF-", content_type::APPLICATION_PDF),
    (b"PK\x03\x04", content_type::APPLICATION_ZIP),
    (b"\x1f\x8b", content_type::APPLICATION_GZIP),
    (b"\0asm", content_type::APPLICATION_WASM),
    (b"ID3", content_type::AUDIO_MPEG),
    (b"OggS", content_type::AUDIO_OGG),
    (b"wOFF", content_type::FONT_WOFF),
    (b"wOF2", content_type::FONT_WOFF2),
];

impl SniffingDetector {
    pub fn new() -> Self {
        Self
    }

    fn sniff_binary(content: &[u8]) -> Option<&'static str> {
        if let Some(&(_, mime)) = SIGNATURES.iter().find(|(sig, _)| content.starts_with(sig)) {
            return Some(mime);
        }
        // RIFF containers carry the format at offset 8
        if content.len() >= 12 && content.starts_with(b"RIFF") {
            return match &content[8..12] {
                b"WEBP" => Some(content_type::IMAGE_WEBP),
                b"WAVE" => Some(content_type::AUDIO_WAV),
                _ => None,
            };
        }
        if content.len() >= 12 && &content[4..8] == b"ftyp" {
            return Some(content_type::VIDEO_MP4);
        }
        None
    }

    fn sniff_text(text: &str) -> Option<&'static str> {
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        let lower: String = trimmed.chars().take(64).collect::<String>().to_ascii_lowercase();

        if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
            return Some(content_type::TEXT_HTML);
        }
        if lower.starts_with("<?xml") {
            return Some(if lower.contains("<svg") || trimmed.contains("<svg") {
                content_type::IMAGE_SVG
            } else {
                content_type::TEXT_XML
            });
        }
        if lower.starts_with("<svg") {
            return Some(content_type::IMAGE_SVG);
        }
        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
        {
            return Some(content_type::APPLICATION_JSON);
        }
        if lower.starts_with('<') && (lower.contains("<head") || lower.contains("<body")) {
            return Some(content_type::TEXT_HTML);
        }
        if text.chars().any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0c')) {
            return None;
        }
        Some(content_type::TEXT_PLAIN)
    }
}

impl MimeTypeDetector for SniffingDetector {
    fn detect_mime_type(&self, content: &[u8]) -> String {
        if content.is_empty() {
            return content_type::EMPTY.to_string();
        }
        if let Some(mime) = Self::sniff_binary(content) {
            return mime.to_string();
        }
        std::str::from_utf8(content)
            .ok()
            .and_then(Self::sniff_text)
            .unwrap_or(content_type::OCTET_STREAM)
            .to_string()
    }

    fn detect_file(&self, path: &Path, content: &[u8]) -> String {
        match mime_guess::from_path(path).first() {
            Some(mime) => mime.essence_str().to_string(),
            None => self.detect_mime_type(content),
        }
    }
}
