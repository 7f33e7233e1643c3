//! # Transport Encoding
//!
//! Base64 data URIs for documents and images. Decoding a document also
//! decodes and validates its image.

use crate::errors::CodecError;
use crate::metadata::document::MetadataDocument;
use crate::metadata::svg::check_well_formed;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Media prefix of an encoded document.
pub const JSON_URI_PREFIX: &str = "data:application/json;base64,";

/// Media prefix of an encoded image.
pub const SVG_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Wrap raw SVG text in a data URI.
#[must_use]
pub fn encode_image(svg: &str) -> String {
    format!("{SVG_URI_PREFIX}{}", STANDARD.encode(svg.as_bytes()))
}

/// Recover and validate the SVG text in an image URI.
///
/// # Errors
///
/// `MissingMediaPrefix`, `Base64`, `Utf8`, `MalformedImage`.
pub fn decode_image(uri: &str) -> Result<String, CodecError> {
    let svg = decode_payload(uri, SVG_URI_PREFIX)?;
    check_well_formed(&svg)?;
    Ok(svg)
}

/// Encode a document as a JSON data URI.
///
/// # Errors
///
/// `Json` if serialization fails.
pub fn encode_document(doc: &MetadataDocument) -> Result<String, CodecError> {
    let json = serde_json::to_string(doc).map_err(|e| CodecError::Json(e.to_string()))?;
    Ok(format!("{JSON_URI_PREFIX}{}", STANDARD.encode(json.as_bytes())))
}

/// Decode a JSON data URI back into a document.
///
/// # Errors
///
/// `MissingMediaPrefix`, `Base64`, `Utf8`, `Json`, or any image error.
pub fn decode_document(uri: &str) -> Result<MetadataDocument, CodecError> {
    let json = decode_payload(uri, JSON_URI_PREFIX)?;
    let doc: MetadataDocument =
        serde_json::from_str(&json).map_err(|e| CodecError::Json(e.to_string()))?;
    decode_image(&doc.image)?;
    Ok(doc)
}

fn decode_payload(uri: &str, prefix: &'static str) -> Result<String, CodecError> {
    let payload = uri
        .strip_prefix(prefix)
        .ok_or(CodecError::MissingMediaPrefix { expected: prefix })?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CodecError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::Utf8(e.to_string()))
}
