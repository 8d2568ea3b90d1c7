use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The default per-file size cap: 10 MiB.
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Opaque reference to an attachment's bytes.
///
/// The tracker never reads the payload; whoever produced the handle owns the
/// data behind it and decides how long it lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHandle(String);

impl ContentHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// File metadata attached to exactly one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    pub mime_type: String,
    pub content_handle: ContentHandle,
}

/// Input for attaching a file to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAttachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub content_handle: ContentHandle,
}
