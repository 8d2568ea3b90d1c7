//! Initial data a session starts from.
//!
//! Seeds are nested so a seed cannot describe an issue whose project lives in
//! another workspace. Seeding goes straight to the store and records no
//! activity.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CreateIssueInput, IssuePriority, IssueStatus, IssueType};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub workspaces: Vec<SeedWorkspace>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedWorkspace {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<SeedProject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProject {
    pub name: String,
    #[serde(default)]
    pub issues: Vec<SeedIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedIssue {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub status: IssueStatus,
    #[serde(default)]
    pub priority: Option<IssuePriority>,
}

impl SeedIssue {
    pub(crate) fn to_input(&self, project_id: Uuid, workspace_id: Uuid) -> CreateIssueInput {
        CreateIssueInput {
            project_id,
            workspace_id,
            title: self.title.clone(),
            description: self.description.clone(),
            issue_type: self.issue_type,
            status: self.status,
            priority: self.priority,
        }
    }
}

impl Seed {
    /// An empty session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a seed from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
        Ok(seed)
    }

    /// Two workspaces, three projects and five issues to explore with.
    pub fn demo() -> Self {
        fn issue(
            title: &str,
            description: &str,
            issue_type: IssueType,
            status: IssueStatus,
            priority: IssuePriority,
        ) -> SeedIssue {
            SeedIssue {
                title: title.to_string(),
                description: Some(description.to_string()),
                issue_type,
                status,
                priority: Some(priority),
            }
        }

        Self {
            workspaces: vec![
                SeedWorkspace {
                    name: "Personal Workspace".to_string(),
                    projects: vec![
                        SeedProject {
                            name: "Bug Tracker App".to_string(),
                            issues: vec![
                                issue(
                                    "Button not working on login page",
                                    "The main login button is unresponsive.",
                                    IssueType::Bug,
                                    IssueStatus::ToDo,
                                    IssuePriority::High,
                                ),
                                issue(
                                    "Implement user authentication",
                                    "Setup JWT authentication flow.",
                                    IssueType::Story,
                                    IssueStatus::InProgress,
                                    IssuePriority::Medium,
                                ),
                            ],
                        },
                        SeedProject {
                            name: "Website Redesign".to_string(),
                            issues: vec![issue(
                                "Design new landing page mockups",
                                "",
                                IssueType::Task,
                                IssueStatus::Done,
                                IssuePriority::Low,
                            )],
                        },
                    ],
                },
                SeedWorkspace {
                    name: "Team Alpha".to_string(),
                    projects: vec![SeedProject {
                        name: "API Development".to_string(),
                        issues: vec![
                            issue(
                                "Setup database schema",
                                "Define tables for users, projects, issues.",
                                IssueType::Task,
                                IssueStatus::ToDo,
                                IssuePriority::Medium,
                            ),
                            issue(
                                "Define API endpoints for user profiles",
                                "CRUD operations for user data.",
                                IssueType::Epic,
                                IssueStatus::ToDo,
                                IssuePriority::Medium,
                            ),
                        ],
                    }],
                },
            ],
        }
    }
}
