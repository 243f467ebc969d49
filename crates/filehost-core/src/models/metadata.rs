//! File metadata derived from a filename.
//!
//! Classification is a pure table lookup on the lowercased extension, so every
//! filename maps to exactly one [`FileCategory`].

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Broad file type category announced alongside a file link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Image,
    Text,
    Document,
    Archive,
    Binary,
    Unknown,
}

impl Display for FileCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileCategory::Image => write!(f, "image"),
            FileCategory::Text => write!(f, "text"),
            FileCategory::Document => write!(f, "document"),
            FileCategory::Archive => write!(f, "archive"),
            FileCategory::Binary => write!(f, "binary"),
            FileCategory::Unknown => write!(f, "unknown"),
        }
    }
}

static EXTENSION_CATEGORIES: &[(&str, FileCategory)] = &[
    // images
    ("png", FileCategory::Image),
    ("jpg", FileCategory::Image),
    ("jpeg", FileCategory::Image),
    ("gif", FileCategory::Image),
    ("webp", FileCategory::Image),
    ("bmp", FileCategory::Image),
    ("svg", FileCategory::Image),
    ("ico", FileCategory::Image),
    ("tif", FileCategory::Image),
    ("tiff", FileCategory::Image),
    ("avif", FileCategory::Image),
    // text
    ("txt", FileCategory::Text),
    ("md", FileCategory::Text),
    ("log", FileCategory::Text),
    ("csv", FileCategory::Text),
    ("json", FileCategory::Text),
    ("xml", FileCategory::Text),
    ("html", FileCategory::Text),
    ("htm", FileCategory::Text),
    ("yaml", FileCategory::Text),
    ("yml", FileCategory::Text),
    ("ini", FileCategory::Text),
    // documents
    ("pdf", FileCategory::Document),
    ("doc", FileCategory::Document),
    ("docx", FileCategory::Document),
    ("odt", FileCategory::Document),
    ("rtf", FileCategory::Document),
    ("xls", FileCategory::Document),
    ("xlsx", FileCategory::Document),
    ("ods", FileCategory::Document),
    ("ppt", FileCategory::Document),
    ("pptx", FileCategory::Document),
    ("odp", FileCategory::Document),
    ("epub", FileCategory::Document),
    // archives
    ("zip", FileCategory::Archive),
    ("tar", FileCategory::Archive),
    ("gz", FileCategory::Archive),
    ("tgz", FileCategory::Archive),
    ("bz2", FileCategory::Archive),
    ("xz", FileCategory::Archive),
    ("zst", FileCategory::Archive),
    ("7z", FileCategory::Archive),
    ("rar", FileCategory::Archive),
];

/// Lowercased trailing extension of `filename`.
///
/// Names without a dot, with only a leading dot (`.bashrc`) or ending in a dot
/// have no extension.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Classify a filename by its extension.
pub fn classify(filename: &str) -> FileCategory {
    match file_extension(filename) {
        None => FileCategory::Unknown,
        Some(ext) => EXTENSION_CATEGORIES
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, category)| *category)
            .unwrap_or(FileCategory::Binary),
    }
}

/// Metadata record attached to messages that link to a hosted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub category: FileCategory,
}

impl FileMetadata {
    /// Build the record for a link; the category is `unknown` when no filename resolved.
    pub fn from_link(url: impl Into<String>, filename: Option<String>) -> Self {
        let category = filename
            .as_deref()
            .map(classify)
            .unwrap_or(FileCategory::Unknown);
        Self {
            url: url.into(),
            filename,
            category,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
