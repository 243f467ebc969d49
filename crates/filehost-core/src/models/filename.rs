//! Filename sanitization shared by upload, retrieval and link scanning.
//!
//! A sanitized name never contains `/`, `\` or control characters and is never
//! `.` or `..`, so joining it onto the storage root always yields a direct child.

/// Placeholder substituted for separators and control characters.
pub const PLACEHOLDER: char = '_';

/// Replace every path separator (and control character) with [`PLACEHOLDER`].
pub fn neutralize_separators(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                PLACEHOLDER
            } else {
                c
            }
        })
        .collect()
}

/// Sanitize a client-supplied filename. Returns `None` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let neutralized = neutralize_separators(name);
    match neutralized.as_str() {
        "" | "." | ".." => None,
        _ => Some(neutralized),
    }
}
