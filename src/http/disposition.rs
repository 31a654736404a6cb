//! `Content-Disposition` value formatting.
//!
//! Values follow `<type>; filename="<escaped>"; filename*=UTF-8''<encoded>`.
//! The quoted `filename` parameter is an ASCII fallback for old clients; the
//! extended `filename*` parameter (RFC 5987) carries the exact name.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const INLINE: &str = "inline";
pub const ATTACHMENT: &str = "attachment";
pub const FORM_DATA: &str = "form-data";

/// RFC 5987 `attr-char` minus alphanumerics; everything else gets encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Disposition type of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
    FormData,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => INLINE,
            Disposition::Attachment => ATTACHMENT,
            Disposition::FormData => FORM_DATA,
        }
    }

    /// Full header value for a file named `filename`.
    pub fn with_filename(self, filename: &str) -> String {
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            self.as_str(),
            ascii_fallback(filename),
            utf8_percent_encode(filename, ATTR_CHAR)
        )
    }
}

/// `attachment` value: the client is asked to save the body.
pub fn attachment(filename: &str) -> String {
    Disposition::Attachment.with_filename(filename)
}

/// `inline` value: the client may display the body.
pub fn inline(filename: &str) -> String {
    Disposition::Inline.with_filename(filename)
}

/// `form-data; name="<field>"; filename="<file>"` for a multipart file part.
pub fn form_data(field_name: &str, filename: &str) -> String {
    form_data_fields([("name", field_name), ("filename", filename)])
}

/// `form-data` value with arbitrary quoted parameters, in the given order.
pub fn form_data_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut value = String::from(FORM_DATA);
    for (name, field) in fields {
        value.push_str("; ");
        value.push_str(name);
        value.push_str("=\"");
        value.push_str(&ascii_fallback(field));
        value.push('"');
    }
    value
}

/// Quoted-string safe ASCII rendition of `name`.
///
/// Non-ASCII and control characters become `_`; `\` and `"` are escaped.
fn ascii_fallback(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('_'),
        }
    }
    out
}
