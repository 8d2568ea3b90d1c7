//! Recent-issue reports ("created in the last N days").

use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::export::write_csv;
use crate::models::Issue;

pub const REPORT_COLUMNS: [&str; 7] = ["ID", "Title", "Type", "Status", "Priority", "Created", "Project"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: String,
    pub title: String,
    pub issue_type: String,
    pub status: String,
    pub priority: String,
    /// Creation date, `YYYY-MM-DD`.
    pub created: String,
    /// Project name, or its id when the name is unknown.
    pub project: String,
}

/// Issues created at or after `now - days`, in input order.
///
/// A window reaching past the earliest representable instant has no lower
/// bound and keeps every issue.
pub fn issues_created_within<'a, I>(issues: I, days: u32, now: DateTime<Utc>) -> Vec<&'a Issue>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let cutoff = now.checked_sub_signed(Duration::days(i64::from(days)));
    issues
        .into_iter()
        .filter(|i| cutoff.map_or(true, |c| i.created_at >= c))
        .collect()
}

/// Build report rows for issues created in the last `days` days.
///
/// `project_name` resolves a project id to its display name.
pub fn report_rows<'a, I, F>(issues: I, days: u32, now: DateTime<Utc>, project_name: F) -> Vec<ReportRow>
where
    I: IntoIterator<Item = &'a Issue>,
    F: Fn(Uuid) -> Option<String>,
{
    issues_created_within(issues, days, now)
        .into_iter()
        .map(|issue| ReportRow {
            id: issue.id.to_string(),
            title: issue.title.clone(),
            issue_type: issue.issue_type.to_string(),
            status: issue.status.to_string(),
            priority: issue.priority.to_string(),
            created: issue.created_at.date_naive().format("%Y-%m-%d").to_string(),
            project: project_name(issue.project_id).unwrap_or_else(|| issue.project_id.to_string()),
        })
        .collect()
}

pub fn report_csv(rows: &[ReportRow]) -> String {
    write_csv(
        &REPORT_COLUMNS,
        rows.iter().map(|r| {
            vec![
                r.id.as_str(),
                r.title.as_str(),
                r.issue_type.as_str(),
                r.status.as_str(),
                r.priority.as_str(),
                r.created.as_str(),
                r.project.as_str(),
            ]
        }),
    )
}

/// `issues_last_<days>_days_<YYYY-MM-DD>.csv`
pub fn report_file_name(days: u32, date: NaiveDate) -> String {
    format!("issues_last_{}_days_{}.csv", days, date.format("%Y-%m-%d"))
}
