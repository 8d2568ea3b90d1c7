use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable record of one mutation.
///
/// Entries outlive the entities they describe, so `details` carries the names
/// that were current when the action happened. A renderer never needs the
/// store to turn an entry into text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub action: ActivityAction,
    pub timestamp: DateTime<Utc>,
    /// Who performed the action. Absent for system-driven changes.
    pub actor_name: Option<String>,
    pub details: ActivityDetails,
}

/// What kind of mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    CreateWorkspace,
    DeleteWorkspace,
    CreateProject,
    DeleteProject,
    CreateIssue,
    DeleteIssue,
    UpdateIssueTitle,
    #[serde(rename = "UPDATE_ISSUE_DESC")]
    UpdateIssueDescription,
    UpdateIssueType,
    UpdateIssueStatus,
    UpdateIssuePriority,
    AddAttachment,
    DeleteAttachment,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateWorkspace => "CREATE_WORKSPACE",
            Self::DeleteWorkspace => "DELETE_WORKSPACE",
            Self::CreateProject => "CREATE_PROJECT",
            Self::DeleteProject => "DELETE_PROJECT",
            Self::CreateIssue => "CREATE_ISSUE",
            Self::DeleteIssue => "DELETE_ISSUE",
            Self::UpdateIssueTitle => "UPDATE_ISSUE_TITLE",
            Self::UpdateIssueDescription => "UPDATE_ISSUE_DESC",
            Self::UpdateIssueType => "UPDATE_ISSUE_TYPE",
            Self::UpdateIssueStatus => "UPDATE_ISSUE_STATUS",
            Self::UpdateIssuePriority => "UPDATE_ISSUE_PRIORITY",
            Self::AddAttachment => "ADD_ATTACHMENT",
            Self::DeleteAttachment => "DELETE_ATTACHMENT",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Denormalized context captured alongside an action.
///
/// Every key is optional; which ones are set depends on the action. Absent
/// keys are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    /// Set on field updates: `title`, `description`, `type`, `status`, `priority`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    /// Number of projects removed along with a deleted workspace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_projects: Option<usize>,
    /// Number of issues removed along with a deleted workspace or project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_issues: Option<usize>,
}
