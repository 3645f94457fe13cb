//! Charset detection and transcoding for text bodies

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{HttpError, Result};

static CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)charset=([():.\w-]+)").expect("charset pattern is valid")
});

/// Extract the `charset=` parameter of a `Content-Type` value
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    CHARSET
        .captures(content_type)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

fn is_utf8(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}

/// Decode `body` as text according to the declared content type.
///
/// Only a declared non-UTF-8 charset triggers transcoding. Without one the
/// bytes are taken as UTF-8, with invalid sequences replaced.
pub fn decode_text(body: &[u8], content_type: Option<&str>) -> Result<String> {
    let label = match content_type.and_then(charset_from_content_type) {
        Some(label) if !is_utf8(label) => label,
        _ => return Ok(String::from_utf8_lossy(body).into_owned()),
    };

    let encoding = Encoding::for_label(label.as_bytes())
        .ok_or_else(|| HttpError::UnsupportedCharset(label.to_string()))?;

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or_else(|| HttpError::Decode {
            charset: encoding.name().to_string(),
        })
}
