use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activity::ActivityAction;
use super::attachment::Attachment;
use crate::error::TrackerError;

/// A tracked unit of work inside a project.
///
/// `project_id` and `workspace_id` are both stored so an issue can be scoped
/// without walking the hierarchy. They are checked against each other when the
/// issue is created and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub project_id: Uuid,
    pub workspace_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Attachments in the order they were added.
    pub attachments: Vec<Attachment>,
}

impl Issue {
    /// Advance `updated_at` to now.
    ///
    /// The timestamp strictly increases on every call, even when the clock has
    /// not moved since the previous mutation.
    pub(crate) fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        };
    }

    /// The description as rendered in diffs and exports (empty when absent).
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// The kind of work an issue describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueType {
    Epic,
    Story,
    Task,
    Bug,
}

impl IssueType {
    pub const ALL: [IssueType; 4] = [Self::Epic, Self::Story, Self::Task, Self::Bug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Epic => "Epic",
            Self::Story => "Story",
            Self::Task => "Task",
            Self::Bug => "Bug",
        }
    }
}

/// Workflow status of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueStatus {
    ToDo,
    InProgress,
    Done,
    Blocked,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [Self::ToDo, Self::InProgress, Self::Done, Self::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDo => "ToDo",
            Self::InProgress => "InProgress",
            Self::Done => "Done",
            Self::Blocked => "Blocked",
        }
    }
}

/// Issue priority. Ordering follows [`IssuePriority::rank`], so `High` sorts
/// above `Medium` above `Low` rather than alphabetically.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
}

impl IssuePriority {
    pub const ALL: [IssuePriority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

/// Strips separators and case so `in_progress`, `In Progress` and
/// `InProgress` all parse to the same value.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! impl_display_parse {
    ($ty:ty, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TrackerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize(s);
                Self::ALL
                    .into_iter()
                    .find(|v| normalize(v.as_str()) == wanted)
                    .ok_or_else(|| {
                        TrackerError::invalid_input(format!("unknown {}: {:?}", $label, s))
                    })
            }
        }
    };
}

impl_display_parse!(IssueType, "issue type");
impl_display_parse!(IssueStatus, "issue status");
impl_display_parse!(IssuePriority, "priority");

/// The editable fields of an issue, as named in activity entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueField {
    Title,
    Description,
    Type,
    Status,
    Priority,
}

impl IssueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Type => "type",
            Self::Status => "status",
            Self::Priority => "priority",
        }
    }

    /// The activity action recorded when this field changes.
    pub fn action(&self) -> ActivityAction {
        match self {
            Self::Title => ActivityAction::UpdateIssueTitle,
            Self::Description => ActivityAction::UpdateIssueDescription,
            Self::Type => ActivityAction::UpdateIssueType,
            Self::Status => ActivityAction::UpdateIssueStatus,
            Self::Priority => ActivityAction::UpdateIssuePriority,
        }
    }
}

/// One field that actually changed during an update, with both values in
/// their string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: IssueField,
    pub old_value: String,
    pub new_value: String,
}

/// The issue after an update, plus the fields that differed.
///
/// `changes` is empty when every supplied value matched the stored one; in
/// that case the issue was left untouched, `updated_at` included.
#[derive(Debug, Clone)]
pub struct IssueUpdate {
    pub issue: Issue,
    pub changes: Vec<FieldChange>,
}

/// Input for creating a new issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssueInput {
    pub project_id: Uuid,
    /// Must match the project's workspace.
    pub workspace_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: IssueStatus,
    /// Defaults to `Medium` if not specified.
    pub priority: Option<IssuePriority>,
}

impl CreateIssueInput {
    /// A `Task` in `ToDo` with no description and the default priority.
    pub fn new(project_id: Uuid, workspace_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            project_id,
            workspace_id,
            title: title.into(),
            description: None,
            issue_type: IssueType::Task,
            status: IssueStatus::ToDo,
            priority: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: IssuePriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Input for updating an issue. All fields are optional for partial updates.
///
/// An empty `description` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateIssueInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
}
