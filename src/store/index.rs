//! Parent-to-children lookups used by cascading deletes.

use std::collections::HashMap;

use uuid::Uuid;

/// Child ids per parent, kept next to the primary tables.
///
/// Children are listed in the order they were linked.
#[derive(Debug, Default)]
pub(crate) struct HierarchyIndex {
    projects_by_workspace: HashMap<Uuid, Vec<Uuid>>,
    issues_by_project: HashMap<Uuid, Vec<Uuid>>,
}

impl HierarchyIndex {
    pub fn link_project(&mut self, workspace_id: Uuid, project_id: Uuid) {
        self.projects_by_workspace
            .entry(workspace_id)
            .or_default()
            .push(project_id);
    }

    pub fn link_issue(&mut self, project_id: Uuid, issue_id: Uuid) {
        self.issues_by_project
            .entry(project_id)
            .or_default()
            .push(issue_id);
    }

    pub fn unlink_issue(&mut self, project_id: Uuid, issue_id: Uuid) {
        if let Some(ids) = self.issues_by_project.get_mut(&project_id) {
            ids.retain(|id| *id != issue_id);
        }
    }

    pub fn unlink_project(&mut self, workspace_id: Uuid, project_id: Uuid) {
        if let Some(ids) = self.projects_by_workspace.get_mut(&workspace_id) {
            ids.retain(|id| *id != project_id);
        }
    }

    pub fn projects_of(&self, workspace_id: Uuid) -> &[Uuid] {
        self.projects_by_workspace
            .get(&workspace_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn issues_of(&self, project_id: Uuid) -> &[Uuid] {
        self.issues_by_project
            .get(&project_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Forget a workspace, returning the projects that were linked to it.
    pub fn take_workspace(&mut self, workspace_id: Uuid) -> Vec<Uuid> {
        self.projects_by_workspace
            .remove(&workspace_id)
            .unwrap_or_default()
    }

    /// Forget a project, returning the issues that were linked to it.
    pub fn take_project(&mut self, project_id: Uuid) -> Vec<Uuid> {
        self.issues_by_project.remove(&project_id).unwrap_or_default()
    }
}
