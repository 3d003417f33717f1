//! Encoding detection and conversion utilities
//!
//! Sheet exports are UTF-8, but files saved by hand may carry a BOM or come
//! from a UTF-16 editor.

use encoding_rs::{Encoding, UTF_8};

/// Detect encoding from a byte-order mark, defaulting to UTF-8
pub fn detect_encoding(data: &[u8]) -> &'static Encoding {
    Encoding::for_bom(data)
        .map(|(encoding, _)| encoding)
        .unwrap_or(UTF_8)
}

/// Decode raw bytes into text, stripping any BOM.
///
/// Malformed sequences are replaced rather than rejected.
pub fn decode_text(data: &[u8]) -> (String, &'static Encoding) {
    let (text, encoding, had_errors) = detect_encoding(data).decode(data);
    if had_errors {
        tracing::debug!("Replaced malformed {} sequences while decoding", encoding.name());
    }
    (text.into_owned(), encoding)
}
