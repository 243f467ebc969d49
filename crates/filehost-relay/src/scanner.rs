//! Hosted-link detection in chat text.
//!
//! This is a heuristic, not a URL parser: a link starts at `{public_url}/`,
//! runs to the next whitespace or control character, and loses any trailing
//! punctuation from a fixed set. It will occasionally be wrong at the edges.
//!
//! Only the link's shape is checked. Whether the named file exists in storage
//! is not, so a well-formed link to a missing file is still tagged.

use filehost_core::sanitize_filename;

const TRAILING_PUNCTUATION: &[char] = &[
    ',', '.', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '{', '}',
];

/// A hosted file linked from a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Stored-file name the link resolves to
    pub filename: String,
}

/// Find the first link in `text` whose path resolves to a valid stored-file name.
pub fn scan(text: &str, public_url: &str) -> Option<Link> {
    let prefix = format!("{}/", public_url);

    for (start, _) in text.match_indices(&prefix) {
        let rest = &text[start..];
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() || c.is_control())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let url = rest[..end].trim_end_matches(TRAILING_PUNCTUATION);

        let Some(path) = url.get(prefix.len()..) else {
            continue;
        };
        if let Some(filename) = resolve_filename(path) {
            return Some(Link {
                url: url.to_string(),
                filename,
            });
        }
    }
    None
}

/// Map the path after the prefix to a stored-file name, as retrieval would.
fn resolve_filename(path: &str) -> Option<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path).ok()?;
    sanitize_filename(&decoded)
}
