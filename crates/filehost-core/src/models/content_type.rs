//! Content types accepted for upload and the MIME types used when serving files.

use super::metadata::file_extension;

/// Content types accepted by the upload endpoint, with the extension each implies.
///
/// Anything outside this list is rejected instead of guessed.
pub const ACCEPTED_CONTENT_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("text/html", "html"),
    ("text/plain", "txt"),
];

/// Served MIME type per extension. Unknown extensions fall back to an opaque type.
const SERVED_MIME_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
];

const OPAQUE_MIME_TYPE: &str = "application/octet-stream";

/// Strip parameters and lowercase (e.g. "Text/Plain; charset=utf-8" -> "text/plain").
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_lowercase()
}

/// Extension implied by an accepted content type, or `None` if the type is not accepted.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let normalized = normalize_content_type(content_type);
    ACCEPTED_CONTENT_TYPES
        .iter()
        .find(|(mime, _)| *mime == normalized)
        .map(|(_, ext)| *ext)
}

/// MIME type to serve a stored file with, derived from its trailing extension.
pub fn mime_for_filename(filename: &str) -> &'static str {
    file_extension(filename)
        .and_then(|ext| {
            SERVED_MIME_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(OPAQUE_MIME_TYPE)
}
