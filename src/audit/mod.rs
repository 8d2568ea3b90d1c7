//! Append-only activity log.
//!
//! Entries are stored oldest first. Newest-first presentation, truncation for
//! display and text rendering all live in [`render`]; the log itself never
//! edits or drops an entry.

pub mod render;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{ActivityAction, ActivityDetails, ActivityLogEntry};

#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Vec<ActivityLogEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with a fresh id and the current time.
    pub fn record(
        &mut self,
        action: ActivityAction,
        actor_name: Option<String>,
        details: ActivityDetails,
    ) -> &ActivityLogEntry {
        let entry = ActivityLogEntry {
            id: Uuid::new_v4(),
            action,
            timestamp: Utc::now(),
            actor_name,
            details,
        };
        tracing::debug!(action = %entry.action, id = %entry.id, "Activity recorded");
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// Every entry, oldest first.
    pub fn entries(&self) -> &[ActivityLogEntry] {
        &self.entries
    }

    /// Every entry, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = &ActivityLogEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&ActivityLogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
