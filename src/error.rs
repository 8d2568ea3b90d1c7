use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// The kind of entity a failed lookup referred to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Workspace,
    Project,
    Issue,
    Attachment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Project => "project",
            Self::Issue => "issue",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by the tracker core.
///
/// Every variant is recoverable: a failed operation leaves the store as it was
/// and records nothing in the activity log.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("file \"{name}\" is too large ({size} bytes, max {max})")]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl TrackerError {
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::InvalidReference(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
