//! Message tags and tag-only companion messages.

use crate::constants::{MAX_TAG_VALUE_BYTES, METADATA_TAG_KEY};
use crate::models::metadata::FileMetadata;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TagError {
    #[error("Invalid tag key: {0:?}")]
    InvalidKey(String),

    #[error("Tag value is {size} bytes escaped, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to serialize tag value: {0}")]
    Serialization(String),
}

/// A key/value annotation on a single chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolTag {
    key: String,
    value: String,
}

impl ProtocolTag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self, TagError> {
        let key = key.into();
        if !is_valid_key(&key) {
            return Err(TagError::InvalidKey(key));
        }
        let value = value.into();
        let size = escape_tag_value(&value).len();
        if size > MAX_TAG_VALUE_BYTES {
            return Err(TagError::TooLarge {
                size,
                limit: MAX_TAG_VALUE_BYTES,
            });
        }
        Ok(Self { key, value })
    }

    /// Tag carrying serialized file metadata.
    pub fn file_metadata(metadata: &FileMetadata) -> Result<Self, TagError> {
        let json = metadata
            .to_json()
            .map_err(|e| TagError::Serialization(e.to_string()))?;
        Self::new(METADATA_TAG_KEY, json)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Unescaped value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// `key=escaped-value` as written on the wire.
    pub fn to_wire(&self) -> String {
        format!("{}={}", self.key, escape_tag_value(&self.value))
    }
}

/// Escape a tag value per the IRCv3 message-tags rules.
fn escape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => out.push_str("\\:"),
            ' ' => out.push_str("\\s"),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// A metadata-only message (`TAGMSG`) sent alongside a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMessage {
    /// Prefix of the original sender, e.g. `nick!user@host`
    pub source: String,
    /// Target of the original message (channel or nick)
    pub target: String,
    pub tags: Vec<ProtocolTag>,
}

impl TagMessage {
    pub fn to_wire(&self) -> String {
        let tags = self
            .tags
            .iter()
            .map(ProtocolTag::to_wire)
            .collect::<Vec<_>>()
            .join(";");
        if tags.is_empty() {
            format!(":{} TAGMSG {}", self.source, self.target)
        } else {
            format!("@{} :{} TAGMSG {}", tags, self.source, self.target)
        }
    }
}

/// `[+][vendor/]name`, where vendor is a host name and name is alphanumerics and `-`.
fn is_valid_key(key: &str) -> bool {
    let key = key.strip_prefix('+').unwrap_or(key);
    let (vendor, name) = match key.rsplit_once('/') {
        Some((vendor, name)) => (Some(vendor), name),
        None => (None, key),
    };
    let vendor_ok = vendor.is_none_or(|vendor| {
        !vendor.is_empty()
            && vendor
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    });
    vendor_ok
        && !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
