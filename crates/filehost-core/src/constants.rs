//! Protocol names and defaults shared across the workspace.

/// Capability peers negotiate to receive file metadata tags and companion messages.
pub const CAPABILITY_NAME: &str = "draft/filehost";

/// Key of the message tag carrying serialized [`crate::FileMetadata`].
pub const METADATA_TAG_KEY: &str = "draft/filehost";

/// Discovery (ISUPPORT) key under which the public URL is published.
pub const DISCOVERY_KEY: &str = "FILEHOST";

/// Name of the chat command that hands out upload URLs.
pub const COMMAND_NAME: &str = "FILEHOST";

/// Upper bound on an escaped tag value, in bytes.
pub const MAX_TAG_VALUE_BYTES: usize = 4094;

/// Realm advertised in `WWW-Authenticate` challenges.
pub const AUTH_REALM: &str = "filehost";

/// Length of generated filenames (without extension).
pub const GENERATED_NAME_LEN: usize = 16;

/// Subdirectory of the storage root holding uploads that are still being written.
pub const PARTIAL_DIR: &str = ".partial";
