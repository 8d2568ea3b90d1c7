use issuedesk::config::TrackerConfig;
use issuedesk::models::*;
use issuedesk::query::IssueQuery;
use issuedesk::seed::Seed;
use issuedesk::{Tracker, TrackerError};
use speculate2::speculate;
use uuid::Uuid;

const MIB: u64 = 1024 * 1024;

fn setup() -> (Tracker, Workspace, Project) {
    let tracker = Tracker::new(&TrackerConfig::default());
    let workspace = tracker.create_workspace("W").expect("Failed to create workspace");
    let project = tracker
        .create_project("P", workspace.id)
        .expect("Failed to create project");
    (tracker, workspace, project)
}

fn new_issue(project: &Project, title: &str) -> CreateIssueInput {
    CreateIssueInput::new(project.id, project.workspace_id, title)
}

fn file(name: &str, size: u64) -> NewAttachment {
    NewAttachment {
        name: name.to_string(),
        size,
        mime_type: "image/png".to_string(),
        content_handle: ContentHandle::new(name),
    }
}

speculate! {
    before {
        let (tracker, workspace, project) = setup();
    }

    describe "creation logging" {
        it "records workspace and project creation with names" {
            let log = tracker.activity();

            assert_eq!(log.len(), 2);
            assert_eq!(log[0].action, ActivityAction::CreateWorkspace);
            assert_eq!(log[0].details.workspace_name.as_deref(), Some("W"));
            assert_eq!(log[1].action, ActivityAction::CreateProject);
            assert_eq!(log[1].details.project_name.as_deref(), Some("P"));
            assert_eq!(log[1].details.workspace_name.as_deref(), Some("W"));
        }

        it "records one CREATE_ISSUE with captured context" {
            let issue = tracker.create_issue(new_issue(&project, "Crash")).expect("Failed");

            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::CreateIssue);
            assert_eq!(entry.details.issue_id, Some(issue.id));
            assert_eq!(entry.details.issue_title.as_deref(), Some("Crash"));
            assert_eq!(entry.details.project_name.as_deref(), Some("P"));
            assert_eq!(entry.details.workspace_id, Some(workspace.id));
            assert_eq!(tracker.activity_count(), 3);
        }

        it "records the configured actor" {
            let config = TrackerConfig {
                actor_name: Some("Sam".to_string()),
                ..TrackerConfig::default()
            };
            let named = Tracker::new(&config);
            named.create_workspace("Mine").expect("Failed");

            assert_eq!(named.latest_activity().and_then(|e| e.actor_name).as_deref(), Some("Sam"));
        }
    }

    describe "update diff logging" {
        it "logs exactly one entry for a status change" {
            let issue = tracker.create_issue(new_issue(&project, "Login")).expect("Failed");
            let before = tracker.activity_count();

            tracker.update_issue(issue.id, UpdateIssueInput {
                status: Some(IssueStatus::Done),
                ..Default::default()
            }).expect("Failed to update");

            assert_eq!(tracker.activity_count(), before + 1);
            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::UpdateIssueStatus);
            assert_eq!(entry.details.field_name.as_deref(), Some("status"));
            assert_eq!(entry.details.old_value.as_deref(), Some("ToDo"));
            assert_eq!(entry.details.new_value.as_deref(), Some("Done"));
        }

        it "logs nothing when the value is unchanged" {
            let issue = tracker.create_issue(new_issue(&project, "Login")).expect("Failed");
            tracker.update_issue(issue.id, UpdateIssueInput {
                status: Some(IssueStatus::Done),
                ..Default::default()
            }).expect("Failed to update");
            let before = tracker.activity_count();

            tracker.update_issue(issue.id, UpdateIssueInput {
                status: Some(IssueStatus::Done),
                ..Default::default()
            }).expect("Failed to update");

            assert_eq!(tracker.activity_count(), before);
        }

        it "logs one entry per changed field" {
            let issue = tracker.create_issue(new_issue(&project, "Old title")).expect("Failed");
            let before = tracker.activity_count();

            tracker.update_issue(issue.id, UpdateIssueInput {
                title: Some("New title".to_string()),
                description: Some("Details".to_string()),
                issue_type: Some(IssueType::Bug),
                status: Some(IssueStatus::ToDo),
                priority: Some(IssuePriority::High),
            }).expect("Failed to update");

            let log = tracker.activity();
            let actions: Vec<_> = log[before..].iter().map(|e| e.action).collect();
            assert_eq!(actions, vec![
                ActivityAction::UpdateIssueTitle,
                ActivityAction::UpdateIssueDescription,
                ActivityAction::UpdateIssueType,
                ActivityAction::UpdateIssuePriority,
            ]);
            let title_entry = &log[before];
            assert_eq!(title_entry.details.old_value.as_deref(), Some("Old title"));
            assert_eq!(title_entry.details.new_value.as_deref(), Some("New title"));
            assert_eq!(title_entry.details.issue_title.as_deref(), Some("New title"));
        }

        it "logs nothing for a rejected update" {
            let before = tracker.activity_count();
            let result = tracker.update_issue(Uuid::new_v4(), UpdateIssueInput {
                status: Some(IssueStatus::Done),
                ..Default::default()
            });

            assert!(matches!(result, Err(TrackerError::NotFound { .. })));
            assert_eq!(tracker.activity_count(), before);
        }
    }

    describe "delete logging" {
        it "logs one entry for a workspace cascade" {
            tracker.create_issue(new_issue(&project, "A")).expect("Failed");
            tracker.create_issue(new_issue(&project, "B")).expect("Failed");
            let before = tracker.activity_count();

            tracker.delete_workspace(workspace.id).expect("Failed to delete");

            assert_eq!(tracker.activity_count(), before + 1);
            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::DeleteWorkspace);
            assert_eq!(entry.details.workspace_name.as_deref(), Some("W"));
            assert_eq!(entry.details.removed_projects, Some(1));
            assert_eq!(entry.details.removed_issues, Some(2));
            assert!(tracker.project_issues(project.id).is_empty());
            assert!(tracker.get_project(project.id).is_none());
        }

        it "logs one entry for a project cascade with the workspace name" {
            tracker.create_issue(new_issue(&project, "A")).expect("Failed");
            let before = tracker.activity_count();

            tracker.delete_project(project.id).expect("Failed to delete");

            assert_eq!(tracker.activity_count(), before + 1);
            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::DeleteProject);
            assert_eq!(entry.details.project_name.as_deref(), Some("P"));
            assert_eq!(entry.details.workspace_name.as_deref(), Some("W"));
            assert_eq!(entry.details.removed_issues, Some(1));
        }

        it "logs an issue delete with its title and project" {
            let issue = tracker.create_issue(new_issue(&project, "Doomed")).expect("Failed");

            tracker.delete_issue(issue.id).expect("Failed to delete");

            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::DeleteIssue);
            assert_eq!(entry.details.issue_title.as_deref(), Some("Doomed"));
            assert_eq!(entry.details.project_name.as_deref(), Some("P"));
            assert!(tracker.get_issue(issue.id).is_none());
        }
    }

    describe "attachments" {
        it "logs add and remove" {
            let issue = tracker.create_issue(new_issue(&project, "Pics")).expect("Failed");

            let added = tracker.add_attachment(issue.id, file("shot.png", 1024)).expect("Failed");
            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::AddAttachment);
            assert_eq!(entry.details.attachment_name.as_deref(), Some("shot.png"));
            assert_eq!(entry.details.issue_title.as_deref(), Some("Pics"));

            tracker.remove_attachment(issue.id, added.id).expect("Failed");
            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::DeleteAttachment);
            assert!(tracker.get_issue(issue.id).map(|i| i.attachments.is_empty()).unwrap_or(false));
        }
    }

    describe "bulk creation" {
        it "creates one task per non-blank line" {
            let before = tracker.activity_count();
            let created = tracker
                .create_issues_bulk("  First  \n\n Second\n   \n", project.id, workspace.id)
                .expect("Failed to bulk create");

            assert_eq!(created.len(), 2);
            assert_eq!(created[0].title, "First");
            assert_eq!(created[1].title, "Second");
            assert!(created.iter().all(|i| i.issue_type == IssueType::Task
                && i.status == IssueStatus::ToDo
                && i.priority == IssuePriority::Medium));
            assert_eq!(tracker.activity_count(), before + 2);
        }

        it "rejects input without titles" {
            let before = tracker.activity_count();
            let result = tracker.create_issues_bulk("\n  \n", project.id, workspace.id);

            assert!(matches!(result, Err(TrackerError::InvalidInput(_))));
            assert_eq!(tracker.activity_count(), before);
        }

        it "creates nothing for a mismatched workspace" {
            let other = tracker.create_workspace("Other").expect("Failed");
            let before = tracker.activity_count();
            let result = tracker.create_issues_bulk("One\nTwo", project.id, other.id);

            assert!(matches!(result, Err(TrackerError::InvalidReference(_))));
            assert!(tracker.project_issues(project.id).is_empty());
            assert_eq!(tracker.activity_count(), before);
        }
    }

    describe "end to end" {
        it "lowers a priority and narrates it" {
            let issue = tracker.create_issue(
                new_issue(&project, "Button not working").with_priority(IssuePriority::High),
            ).expect("Failed to create");

            tracker.update_issue(issue.id, UpdateIssueInput {
                priority: Some(IssuePriority::Low),
                ..Default::default()
            }).expect("Failed to update");

            let stored = tracker.get_issue(issue.id).expect("Issue vanished");
            assert_eq!(stored.priority, IssuePriority::Low);
            assert!(stored.updated_at > stored.created_at);

            let entry = tracker.latest_activity().expect("No activity");
            assert_eq!(entry.action, ActivityAction::UpdateIssuePriority);
            assert_eq!(entry.details.old_value.as_deref(), Some("High"));
            assert_eq!(entry.details.new_value.as_deref(), Some("Low"));
        }

        it "rejects an 11 MiB attachment without side effects" {
            let issue = tracker.create_issue(new_issue(&project, "Video")).expect("Failed");
            let before = tracker.activity_count();

            let result = tracker.add_attachment(issue.id, file("clip.mov", 11 * MIB));

            assert!(matches!(result, Err(TrackerError::TooLarge { .. })));
            assert_eq!(tracker.get_issue(issue.id), Some(issue));
            assert_eq!(tracker.activity_count(), before);
        }

        it "returns an empty list for a search without matches" {
            tracker.create_issue(new_issue(&project, "Login button")).expect("Failed");

            let rows = tracker.query_issues(&IssueQuery::for_project(project.id).search("xyz"));
            assert!(rows.is_empty());
        }

        it "shares state between clones" {
            let other = tracker.clone();
            let issue = other.create_issue(new_issue(&project, "Shared")).expect("Failed");

            assert!(tracker.get_issue(issue.id).is_some());
        }

        it "starts a seeded session without activity" {
            let seeded = Tracker::from_seed(&Seed::demo(), &TrackerConfig::default())
                .expect("Failed to seed");

            assert_eq!(seeded.activity_count(), 0);
            assert_eq!(seeded.list_workspaces().len(), 2);
            assert_eq!(seeded.list_projects(None).len(), 3);
        }
    }
}
