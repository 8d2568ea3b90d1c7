mod index;
mod table;

use uuid::Uuid;

use crate::error::{EntityKind, Result, TrackerError};
use crate::models::*;
use crate::seed::Seed;

use self::index::HierarchyIndex;
use self::table::Table;

/// Everything removed by a workspace delete.
#[derive(Debug, Clone)]
pub struct WorkspaceRemoval {
    pub workspace: Workspace,
    pub projects: Vec<Project>,
    pub issues: Vec<Issue>,
}

/// Everything removed by a project delete.
#[derive(Debug, Clone)]
pub struct ProjectRemoval {
    pub project: Project,
    pub issues: Vec<Issue>,
}

/// Canonical owner of workspaces, projects and issues.
///
/// The store validates every reference and performs cascades, but knows
/// nothing about the activity log. Callers that need audited mutations go
/// through [`crate::tracker::Tracker`].
pub struct Store {
    workspaces: Table<Workspace>,
    projects: Table<Project>,
    issues: Table<Issue>,
    index: HierarchyIndex,
    max_attachment_bytes: u64,
}

impl Store {
    pub fn new(max_attachment_bytes: u64) -> Self {
        Self {
            workspaces: Table::default(),
            projects: Table::default(),
            issues: Table::default(),
            index: HierarchyIndex::default(),
            max_attachment_bytes,
        }
    }

    /// Build a store pre-populated from `seed`.
    pub fn from_seed(seed: &Seed, max_attachment_bytes: u64) -> Result<Self> {
        let mut store = Self::new(max_attachment_bytes);
        for ws in &seed.workspaces {
            let workspace_id = store.create_workspace(&ws.name)?.id;
            for proj in &ws.projects {
                let project_id = store.create_project(&proj.name, workspace_id)?.id;
                for issue in &proj.issues {
                    store.create_issue(issue.to_input(project_id, workspace_id))?;
                }
            }
        }
        Ok(store)
    }

    // ============================================================
    // Workspace operations
    // ============================================================

    pub fn get_workspace(&self, id: Uuid) -> Option<&Workspace> {
        self.workspaces.get(id)
    }

    pub fn workspaces(&self) -> impl Iterator<Item = &Workspace> {
        self.workspaces.iter()
    }

    pub fn create_workspace(&mut self, name: &str) -> Result<Workspace> {
        let name = required(name, "workspace name")?;
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name,
        };
        Ok(self.workspaces.insert(workspace).clone())
    }

    /// Remove a workspace together with its projects and their issues.
    pub fn delete_workspace(&mut self, id: Uuid) -> Result<WorkspaceRemoval> {
        let workspace = self
            .workspaces
            .remove(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Workspace, id))?;

        let mut projects = Vec::new();
        let mut issues = Vec::new();
        for project_id in self.index.take_workspace(id) {
            if let Some(project) = self.projects.remove(project_id) {
                issues.extend(self.remove_project_issues(project_id));
                projects.push(project);
            }
        }

        Ok(WorkspaceRemoval {
            workspace,
            projects,
            issues,
        })
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_project(&self, id: Uuid) -> Option<&Project> {
        self.projects.get(id)
    }

    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn projects_in_workspace(&self, workspace_id: Uuid) -> Vec<&Project> {
        self.index
            .projects_of(workspace_id)
            .iter()
            .filter_map(|id| self.projects.get(*id))
            .collect()
    }

    pub fn create_project(&mut self, name: &str, workspace_id: Uuid) -> Result<Project> {
        let name = required(name, "project name")?;
        if !self.workspaces.contains(workspace_id) {
            return Err(TrackerError::not_found(EntityKind::Workspace, workspace_id));
        }

        let project = Project {
            id: Uuid::new_v4(),
            name,
            workspace_id,
        };
        self.index.link_project(workspace_id, project.id);
        Ok(self.projects.insert(project).clone())
    }

    /// Remove a project together with its issues.
    pub fn delete_project(&mut self, id: Uuid) -> Result<ProjectRemoval> {
        let project = self
            .projects
            .remove(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Project, id))?;
        self.index.unlink_project(project.workspace_id, id);
        let issues = self.remove_project_issues(id);

        Ok(ProjectRemoval { project, issues })
    }

    fn remove_project_issues(&mut self, project_id: Uuid) -> Vec<Issue> {
        self.index
            .take_project(project_id)
            .into_iter()
            .filter_map(|issue_id| self.issues.remove(issue_id))
            .collect()
    }

    // ============================================================
    // Issue operations
    // ============================================================

    pub fn get_issue(&self, id: Uuid) -> Option<&Issue> {
        self.issues.get(id)
    }

    /// All issues, in creation order.
    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    /// Issues of one project, in creation order.
    pub fn project_issues(&self, project_id: Uuid) -> Vec<&Issue> {
        self.index
            .issues_of(project_id)
            .iter()
            .filter_map(|id| self.issues.get(*id))
            .collect()
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn create_issue(&mut self, input: CreateIssueInput) -> Result<Issue> {
        let title = required(&input.title, "issue title")?;

        let project = self.projects.get(input.project_id).ok_or_else(|| {
            TrackerError::invalid_reference(format!("project {} does not exist", input.project_id))
        })?;
        if project.workspace_id != input.workspace_id {
            return Err(TrackerError::invalid_reference(format!(
                "project {} belongs to workspace {}, not {}",
                project.id, project.workspace_id, input.workspace_id
            )));
        }
        if !self.workspaces.contains(input.workspace_id) {
            return Err(TrackerError::invalid_reference(format!(
                "workspace {} does not exist",
                input.workspace_id
            )));
        }

        let now = chrono::Utc::now();
        let issue = Issue {
            id: Uuid::new_v4(),
            title,
            description: optional_text(input.description),
            issue_type: input.issue_type,
            status: input.status,
            priority: input.priority.unwrap_or_default(),
            project_id: input.project_id,
            workspace_id: input.workspace_id,
            created_at: now,
            updated_at: now,
            attachments: Vec::new(),
        };
        self.index.link_issue(issue.project_id, issue.id);
        Ok(self.issues.insert(issue).clone())
    }

    /// Apply a partial update.
    ///
    /// Only values that differ from the stored ones are written and reported
    /// in [`IssueUpdate::changes`]; `updated_at` moves only if something did.
    pub fn update_issue(&mut self, id: Uuid, input: UpdateIssueInput) -> Result<IssueUpdate> {
        let title = input
            .title
            .as_deref()
            .map(|t| required(t, "issue title"))
            .transpose()?;

        let issue = self
            .issues
            .get_mut(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Issue, id))?;

        let mut changes = Vec::new();

        if let Some(title) = title {
            if title != issue.title {
                changes.push(FieldChange {
                    field: IssueField::Title,
                    old_value: std::mem::replace(&mut issue.title, title.clone()),
                    new_value: title,
                });
            }
        }
        if let Some(description) = input.description {
            let description = optional_text(Some(description));
            if description != issue.description {
                let old = std::mem::replace(&mut issue.description, description);
                changes.push(FieldChange {
                    field: IssueField::Description,
                    old_value: old.unwrap_or_default(),
                    new_value: issue.description_text().to_string(),
                });
            }
        }
        if let Some(issue_type) = input.issue_type {
            if issue_type != issue.issue_type {
                changes.push(FieldChange {
                    field: IssueField::Type,
                    old_value: issue.issue_type.to_string(),
                    new_value: issue_type.to_string(),
                });
                issue.issue_type = issue_type;
            }
        }
        if let Some(status) = input.status {
            if status != issue.status {
                changes.push(FieldChange {
                    field: IssueField::Status,
                    old_value: issue.status.to_string(),
                    new_value: status.to_string(),
                });
                issue.status = status;
            }
        }
        if let Some(priority) = input.priority {
            if priority != issue.priority {
                changes.push(FieldChange {
                    field: IssueField::Priority,
                    old_value: issue.priority.to_string(),
                    new_value: priority.to_string(),
                });
                issue.priority = priority;
            }
        }

        if !changes.is_empty() {
            issue.touch();
        }

        Ok(IssueUpdate {
            issue: issue.clone(),
            changes,
        })
    }

    pub fn delete_issue(&mut self, id: Uuid) -> Result<Issue> {
        let issue = self
            .issues
            .remove(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Issue, id))?;
        self.index.unlink_issue(issue.project_id, id);
        Ok(issue)
    }

    // ============================================================
    // Attachment operations
    // ============================================================

    /// Append an attachment to an issue.
    ///
    /// The size cap is checked before anything else, so an oversized file is
    /// rejected even when the issue id is also wrong.
    pub fn add_attachment(&mut self, issue_id: Uuid, input: NewAttachment) -> Result<Attachment> {
        if input.size > self.max_attachment_bytes {
            return Err(TrackerError::TooLarge {
                name: input.name,
                size: input.size,
                max: self.max_attachment_bytes,
            });
        }
        let name = required(&input.name, "attachment name")?;

        let issue = self
            .issues
            .get_mut(issue_id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Issue, issue_id))?;

        let attachment = Attachment {
            id: Uuid::new_v4(),
            name,
            size: input.size,
            mime_type: input.mime_type,
            content_handle: input.content_handle,
        };
        issue.attachments.push(attachment.clone());
        issue.touch();

        Ok(attachment)
    }

    pub fn remove_attachment(&mut self, issue_id: Uuid, attachment_id: Uuid) -> Result<Attachment> {
        let issue = self
            .issues
            .get_mut(issue_id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Issue, issue_id))?;
        let pos = issue
            .attachments
            .iter()
            .position(|a| a.id == attachment_id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Attachment, attachment_id))?;

        let attachment = issue.attachments.remove(pos);
        issue.touch();

        Ok(attachment)
    }
}

/// Trimmed copy of a required text field, rejecting blanks.
fn required(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::invalid_input(format!("{} cannot be blank", what)));
    }
    Ok(trimmed.to_string())
}

/// Whitespace-only text counts as absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
