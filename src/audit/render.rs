//! Plain-text rendering of activity entries.
//!
//! Two views exist: the downloadable summary (every entry, newest first, one
//! timestamped line each) and the feed (newest first, capped, preferring live
//! issue titles). Both work from the entry alone; the feed optionally consults
//! a lookup for titles of issues that still exist.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ActivityAction, ActivityDetails, ActivityLogEntry};

const SYSTEM_ACTOR: &str = "System";
const SUMMARY_TIME_FORMAT: &str = "%m/%d/%Y, %I:%M %p";

/// One rendered feed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// The newest entries of a log, plus how many older ones were left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub items: Vec<FeedItem>,
    pub hidden: usize,
}

impl Feed {
    /// A footer telling the reader the feed is truncated, if it is.
    pub fn notice(&self) -> Option<String> {
        (self.hidden > 0).then(|| {
            format!(
                "Showing latest {} activities in feed. Full summary includes all logs.",
                self.items.len()
            )
        })
    }
}

fn actor(entry: &ActivityLogEntry) -> &str {
    entry.actor_name.as_deref().unwrap_or(SYSTEM_ACTOR)
}

/// Name if captured, otherwise the id, otherwise empty.
fn name_or_id(name: &Option<String>, id: &Option<Uuid>) -> String {
    match (name, id) {
        (Some(name), _) if !name.is_empty() => name.clone(),
        (_, Some(id)) => id.to_string(),
        _ => String::new(),
    }
}

fn value(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

/// First six characters of the last dash-separated segment of an id.
pub fn short_id(id: &Uuid) -> String {
    let full = id.to_string();
    let tail = full.rsplit('-').next().unwrap_or(&full);
    tail.chars().take(6).collect()
}

fn short_issue_id(details: &ActivityDetails) -> String {
    details.issue_id.as_ref().map(short_id).unwrap_or_default()
}

/// Render one entry as a summary line:
/// `<timestamp> - <actor> <verb phrase>.`
pub fn summary_line(entry: &ActivityLogEntry) -> String {
    let d = &entry.details;
    let issue_title = d.issue_title.as_deref().unwrap_or("an issue");
    let project = name_or_id(&d.project_name, &d.project_id);
    let workspace = name_or_id(&d.workspace_name, &d.workspace_id);

    let phrase = match entry.action {
        ActivityAction::CreateIssue => {
            format!("created issue \"{}\" in project \"{}\".", issue_title, project)
        }
        ActivityAction::DeleteIssue => format!(
            "deleted issue \"{}\" from project \"{}\".",
            name_or_id(&d.issue_title, &d.issue_id),
            project
        ),
        ActivityAction::UpdateIssueTitle => format!(
            "renamed issue \"{}\" to \"{}\" (ID: {}).",
            value(&d.old_value),
            value(&d.new_value),
            short_issue_id(d)
        ),
        ActivityAction::UpdateIssueDescription => format!(
            "updated the description for issue \"{}\" (ID: {}).",
            issue_title,
            short_issue_id(d)
        ),
        ActivityAction::UpdateIssueType => format!(
            "changed type for issue \"{}\" from \"{}\" to \"{}\".",
            issue_title,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::UpdateIssueStatus => format!(
            "changed status for issue \"{}\" from \"{}\" to \"{}\".",
            issue_title,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::UpdateIssuePriority => format!(
            "changed priority for issue \"{}\" from \"{}\" to \"{}\".",
            issue_title,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::AddAttachment => format!(
            "added attachment \"{}\" to issue \"{}\".",
            value(&d.attachment_name),
            issue_title
        ),
        ActivityAction::DeleteAttachment => format!(
            "deleted attachment \"{}\" from issue \"{}\".",
            value(&d.attachment_name),
            issue_title
        ),
        ActivityAction::CreateProject => format!(
            "created project \"{}\" in workspace \"{}\".",
            value(&d.project_name),
            workspace
        ),
        ActivityAction::DeleteProject => format!(
            "deleted project \"{}\" from workspace \"{}\".",
            value(&d.project_name),
            workspace
        ),
        ActivityAction::CreateWorkspace => {
            format!("created workspace \"{}\".", value(&d.workspace_name))
        }
        ActivityAction::DeleteWorkspace => {
            format!("deleted workspace \"{}\".", value(&d.workspace_name))
        }
    };

    format!(
        "{} - {} {}",
        entry.timestamp.format(SUMMARY_TIME_FORMAT),
        actor(entry),
        phrase
    )
}

/// The full summary: every entry, newest first, one line each.
pub fn summary_text<'a>(entries_newest_first: impl IntoIterator<Item = &'a ActivityLogEntry>) -> String {
    let mut output = String::new();
    for entry in entries_newest_first {
        output.push_str(&summary_line(entry));
        output.push('\n');
    }
    output
}

/// Render one entry as a feed row: `<actor> <verb phrase>`.
///
/// `live_title` is the referenced issue's current title when it still exists;
/// otherwise the title captured at log time is used.
pub fn feed_line(entry: &ActivityLogEntry, live_title: Option<&str>) -> String {
    let d = &entry.details;
    let issue = live_title
        .or(d.issue_title.as_deref())
        .map(|t| format!("\"{}\"", t))
        .unwrap_or_else(|| "an issue".to_string());
    let project = name_or_id(&d.project_name, &d.project_id);
    let workspace = name_or_id(&d.workspace_name, &d.workspace_id);

    let phrase = match entry.action {
        ActivityAction::CreateIssue => format!("created {} in project \"{}\"", issue, project),
        ActivityAction::DeleteIssue => format!(
            "deleted issue \"{}\" from project \"{}\"",
            name_or_id(&d.issue_title, &d.issue_id),
            project
        ),
        ActivityAction::UpdateIssueTitle => format!(
            "renamed {} from \"{}\" to \"{}\"",
            issue,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::UpdateIssueDescription => {
            format!("updated the description for {}", issue)
        }
        ActivityAction::UpdateIssueType => format!(
            "changed the type of {} from {} to {}",
            issue,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::UpdateIssueStatus => format!(
            "changed the status of {} from {} to {}",
            issue,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::UpdateIssuePriority => format!(
            "changed the priority of {} from {} to {}",
            issue,
            value(&d.old_value),
            value(&d.new_value)
        ),
        ActivityAction::AddAttachment => format!(
            "added attachment \"{}\" to {}",
            value(&d.attachment_name),
            issue
        ),
        ActivityAction::DeleteAttachment => format!(
            "deleted attachment \"{}\" from {}",
            value(&d.attachment_name),
            issue
        ),
        ActivityAction::CreateProject => format!(
            "created project \"{}\" in workspace \"{}\"",
            value(&d.project_name),
            workspace
        ),
        ActivityAction::DeleteProject => format!(
            "deleted project \"{}\" from workspace \"{}\"",
            value(&d.project_name),
            workspace
        ),
        ActivityAction::CreateWorkspace => {
            format!("created workspace \"{}\"", value(&d.workspace_name))
        }
        ActivityAction::DeleteWorkspace => {
            format!("deleted workspace \"{}\"", value(&d.workspace_name))
        }
    };

    format!("{} {}", actor(entry), phrase)
}

/// Build the feed from entries given oldest first, keeping at most `limit`.
pub fn feed<F>(entries: &[ActivityLogEntry], limit: usize, live_title: F) -> Feed
where
    F: Fn(Uuid) -> Option<String>,
{
    let items = entries
        .iter()
        .rev()
        .take(limit)
        .map(|entry| {
            let title = entry.details.issue_id.and_then(&live_title);
            FeedItem {
                entry_id: entry.id,
                timestamp: entry.timestamp,
                text: feed_line(entry, title.as_deref()),
            }
        })
        .collect::<Vec<_>>();
    let hidden = entries.len() - items.len();

    Feed { items, hidden }
}
