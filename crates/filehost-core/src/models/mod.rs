pub mod content_type;
pub mod filename;
pub mod metadata;
pub mod tag;

pub use content_type::{
    extension_for_content_type, mime_for_filename, normalize_content_type, ACCEPTED_CONTENT_TYPES,
};
pub use filename::{neutralize_separators, sanitize_filename};
pub use metadata::{classify, file_extension, FileCategory, FileMetadata};
pub use tag::{ProtocolTag, TagError, TagMessage};
