//! The mutation entry point.
//!
//! [`Tracker`] owns the [`Store`] and the [`AuditLog`] behind a single lock.
//! Every mutation validates and applies the change in the store, then records
//! activity while still holding the lock, so readers never observe a change
//! without its log entry or half of a cascade. A rejected operation changes
//! nothing and records nothing.

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::audit::render::{self, Feed};
use crate::audit::AuditLog;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::models::*;
use crate::query::{run_query, IssueQuery};
use crate::seed::Seed;
use crate::store::{ProjectRemoval, Store, WorkspaceRemoval};

struct TrackerState {
    store: Store,
    log: AuditLog,
}

impl TrackerState {
    /// Names and ids describing an issue and its parents as they are now.
    fn issue_details(&self, issue: &Issue) -> ActivityDetails {
        let project = self.store.get_project(issue.project_id);
        let workspace = self.store.get_workspace(issue.workspace_id);
        ActivityDetails {
            issue_id: Some(issue.id),
            issue_title: Some(issue.title.clone()),
            project_id: Some(issue.project_id),
            project_name: project.map(|p| p.name.clone()),
            workspace_id: Some(issue.workspace_id),
            workspace_name: workspace.map(|w| w.name.clone()),
            ..Default::default()
        }
    }
}

/// Log a rejected operation and pass the error through.
fn rejected(op: &'static str) -> impl Fn(TrackerError) -> TrackerError {
    move |e| {
        tracing::warn!("{} rejected: {}", op, e);
        e
    }
}

pub struct Tracker {
    state: Arc<Mutex<TrackerState>>,
    actor_name: Option<String>,
    feed_limit: usize,
}

impl Tracker {
    /// An empty session.
    pub fn new(config: &TrackerConfig) -> Self {
        Self::with_store(Store::new(config.max_attachment_bytes), config)
    }

    /// A session pre-populated from `seed`. Seeding records no activity.
    pub fn from_seed(seed: &Seed, config: &TrackerConfig) -> Result<Self> {
        let store = Store::from_seed(seed, config.max_attachment_bytes)?;
        tracing::info!(
            workspaces = seed.workspaces.len(),
            issues = store.issue_count(),
            "Session seeded"
        );
        Ok(Self::with_store(store, config))
    }

    fn with_store(store: Store, config: &TrackerConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                store,
                log: AuditLog::new(),
            })),
            actor_name: config.actor_name.clone(),
            feed_limit: config.feed_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().expect("tracker lock poisoned")
    }

    fn record(&self, state: &mut TrackerState, action: ActivityAction, details: ActivityDetails) {
        state.log.record(action, self.actor_name.clone(), details);
    }

    // ============================================================
    // Workspace operations
    // ============================================================

    pub fn get_workspace(&self, id: Uuid) -> Option<Workspace> {
        self.lock().store.get_workspace(id).cloned()
    }

    pub fn list_workspaces(&self) -> Vec<Workspace> {
        self.lock().store.workspaces().cloned().collect()
    }

    pub fn create_workspace(&self, name: &str) -> Result<Workspace> {
        let mut state = self.lock();
        let workspace = state
            .store
            .create_workspace(name)
            .map_err(rejected("create_workspace"))?;

        self.record(
            &mut state,
            ActivityAction::CreateWorkspace,
            ActivityDetails {
                workspace_id: Some(workspace.id),
                workspace_name: Some(workspace.name.clone()),
                ..Default::default()
            },
        );
        tracing::info!(workspace_id = %workspace.id, "Workspace \"{}\" created", workspace.name);
        Ok(workspace)
    }

    /// Delete a workspace and everything in it.
    ///
    /// One activity entry is recorded for the workspace; the removed projects
    /// and issues are counted in its details but not logged individually.
    pub fn delete_workspace(&self, id: Uuid) -> Result<WorkspaceRemoval> {
        let mut state = self.lock();
        let removal = state
            .store
            .delete_workspace(id)
            .map_err(rejected("delete_workspace"))?;

        self.record(
            &mut state,
            ActivityAction::DeleteWorkspace,
            ActivityDetails {
                workspace_id: Some(removal.workspace.id),
                workspace_name: Some(removal.workspace.name.clone()),
                removed_projects: Some(removal.projects.len()),
                removed_issues: Some(removal.issues.len()),
                ..Default::default()
            },
        );
        tracing::info!(
            workspace_id = %id,
            projects = removal.projects.len(),
            issues = removal.issues.len(),
            "Workspace \"{}\" and its contents deleted",
            removal.workspace.name
        );
        Ok(removal)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_project(&self, id: Uuid) -> Option<Project> {
        self.lock().store.get_project(id).cloned()
    }

    /// Projects in creation order, optionally limited to one workspace.
    pub fn list_projects(&self, workspace_id: Option<Uuid>) -> Vec<Project> {
        let state = self.lock();
        match workspace_id {
            Some(ws) => state
                .store
                .projects_in_workspace(ws)
                .into_iter()
                .cloned()
                .collect(),
            None => state.store.projects().cloned().collect(),
        }
    }

    pub fn create_project(&self, name: &str, workspace_id: Uuid) -> Result<Project> {
        let mut state = self.lock();
        let project = state
            .store
            .create_project(name, workspace_id)
            .map_err(rejected("create_project"))?;
        let workspace_name = state.store.get_workspace(workspace_id).map(|w| w.name.clone());

        self.record(
            &mut state,
            ActivityAction::CreateProject,
            ActivityDetails {
                project_id: Some(project.id),
                project_name: Some(project.name.clone()),
                workspace_id: Some(workspace_id),
                workspace_name,
                ..Default::default()
            },
        );
        tracing::info!(project_id = %project.id, "Project \"{}\" created", project.name);
        Ok(project)
    }

    /// Delete a project and its issues, recording a single activity entry.
    pub fn delete_project(&self, id: Uuid) -> Result<ProjectRemoval> {
        let mut state = self.lock();
        let removal = state
            .store
            .delete_project(id)
            .map_err(rejected("delete_project"))?;
        let workspace_id = removal.project.workspace_id;
        let workspace_name = state.store.get_workspace(workspace_id).map(|w| w.name.clone());

        self.record(
            &mut state,
            ActivityAction::DeleteProject,
            ActivityDetails {
                project_id: Some(removal.project.id),
                project_name: Some(removal.project.name.clone()),
                workspace_id: Some(workspace_id),
                workspace_name,
                removed_issues: Some(removal.issues.len()),
                ..Default::default()
            },
        );
        tracing::info!(
            project_id = %id,
            issues = removal.issues.len(),
            "Project \"{}\" and its issues deleted",
            removal.project.name
        );
        Ok(removal)
    }

    // ============================================================
    // Issue operations
    // ============================================================

    pub fn get_issue(&self, id: Uuid) -> Option<Issue> {
        self.lock().store.get_issue(id).cloned()
    }

    /// Every issue of a project in creation order, unfiltered.
    pub fn project_issues(&self, project_id: Uuid) -> Vec<Issue> {
        self.lock()
            .store
            .project_issues(project_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run an issue list query against the current issues.
    pub fn query_issues(&self, query: &IssueQuery) -> Vec<Issue> {
        let state = self.lock();
        let rows: Vec<Issue> = run_query(state.store.issues(), query)
            .into_iter()
            .cloned()
            .collect();
        tracing::debug!(project_id = %query.project_id, rows = rows.len(), "Issue query");
        rows
    }

    pub fn create_issue(&self, input: CreateIssueInput) -> Result<Issue> {
        let mut state = self.lock();
        let issue = state
            .store
            .create_issue(input)
            .map_err(rejected("create_issue"))?;

        let details = state.issue_details(&issue);
        self.record(&mut state, ActivityAction::CreateIssue, details);
        tracing::info!(issue_id = %issue.id, "Issue \"{}\" created", issue.title);
        Ok(issue)
    }

    /// Create one `Task`/`ToDo`/`Medium` issue per non-blank line of `titles`.
    ///
    /// Fails with `InvalidInput` when no line has content. Each created issue
    /// gets its own `CREATE_ISSUE` entry.
    pub fn create_issues_bulk(
        &self,
        titles: &str,
        project_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<Vec<Issue>> {
        let titles: Vec<&str> = titles
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if titles.is_empty() {
            return Err(rejected("create_issues_bulk")(TrackerError::invalid_input(
                "at least one issue title is required",
            )));
        }

        let mut state = self.lock();
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            let input = CreateIssueInput::new(project_id, workspace_id, title)
                .with_priority(IssuePriority::Medium);
            let issue = state
                .store
                .create_issue(input)
                .map_err(rejected("create_issues_bulk"))?;
            let details = state.issue_details(&issue);
            self.record(&mut state, ActivityAction::CreateIssue, details);
            created.push(issue);
        }

        tracing::info!(project_id = %project_id, count = created.len(), "Bulk issues created");
        Ok(created)
    }

    /// Apply a partial update, recording one activity entry per field that
    /// actually changed.
    pub fn update_issue(&self, id: Uuid, input: UpdateIssueInput) -> Result<Issue> {
        let mut state = self.lock();
        let IssueUpdate { issue, changes } = state
            .store
            .update_issue(id, input)
            .map_err(rejected("update_issue"))?;

        let context = state.issue_details(&issue);
        for change in &changes {
            let details = ActivityDetails {
                field_name: Some(change.field.as_str().to_string()),
                old_value: Some(change.old_value.clone()),
                new_value: Some(change.new_value.clone()),
                ..context.clone()
            };
            self.record(&mut state, change.field.action(), details);
        }
        tracing::debug!(issue_id = %id, changed = changes.len(), "Issue updated");
        Ok(issue)
    }

    pub fn delete_issue(&self, id: Uuid) -> Result<Issue> {
        let mut state = self.lock();
        let issue = state
            .store
            .delete_issue(id)
            .map_err(rejected("delete_issue"))?;

        let details = state.issue_details(&issue);
        self.record(&mut state, ActivityAction::DeleteIssue, details);
        tracing::info!(issue_id = %id, "Issue \"{}\" deleted", issue.title);
        Ok(issue)
    }

    // ============================================================
    // Attachment operations
    // ============================================================

    pub fn add_attachment(&self, issue_id: Uuid, input: NewAttachment) -> Result<Attachment> {
        let mut state = self.lock();
        let attachment = state
            .store
            .add_attachment(issue_id, input)
            .map_err(rejected("add_attachment"))?;

        let mut details = match state.store.get_issue(issue_id) {
            Some(issue) => state.issue_details(issue),
            None => ActivityDetails::default(),
        };
        details.attachment_name = Some(attachment.name.clone());
        self.record(&mut state, ActivityAction::AddAttachment, details);
        tracing::info!(issue_id = %issue_id, size = attachment.size, "Attachment \"{}\" added", attachment.name);
        Ok(attachment)
    }

    pub fn remove_attachment(&self, issue_id: Uuid, attachment_id: Uuid) -> Result<Attachment> {
        let mut state = self.lock();
        let attachment = state
            .store
            .remove_attachment(issue_id, attachment_id)
            .map_err(rejected("remove_attachment"))?;

        let mut details = match state.store.get_issue(issue_id) {
            Some(issue) => state.issue_details(issue),
            None => ActivityDetails::default(),
        };
        details.attachment_name = Some(attachment.name.clone());
        self.record(&mut state, ActivityAction::DeleteAttachment, details);
        tracing::info!(issue_id = %issue_id, "Attachment \"{}\" deleted", attachment.name);
        Ok(attachment)
    }

    // ============================================================
    // Activity
    // ============================================================

    /// Every activity entry, oldest first.
    pub fn activity(&self) -> Vec<ActivityLogEntry> {
        self.lock().log.entries().to_vec()
    }

    pub fn latest_activity(&self) -> Option<ActivityLogEntry> {
        self.lock().log.latest().cloned()
    }

    pub fn activity_count(&self) -> usize {
        self.lock().log.len()
    }

    /// The downloadable summary: every entry, newest first.
    pub fn activity_summary(&self) -> String {
        render::summary_text(self.lock().log.newest_first())
    }

    /// The newest entries, capped at the configured feed limit, using current
    /// issue titles where the issue still exists.
    pub fn activity_feed(&self) -> Feed {
        let state = self.lock();
        render::feed(state.log.entries(), self.feed_limit, |issue_id| {
            state.store.get_issue(issue_id).map(|i| i.title.clone())
        })
    }
}

impl Clone for Tracker {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            actor_name: self.actor_name.clone(),
            feed_limit: self.feed_limit,
        }
    }
}
