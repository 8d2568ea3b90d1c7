//! Tabular export of a project's issues.
//!
//! The export reads issues exactly as stored; every column can be rebuilt from
//! an [`Issue`] alone.

use std::borrow::Cow;

use chrono::NaiveDate;

use crate::error::{Result, TrackerError};
use crate::models::{Issue, Project};

pub const EXPORT_COLUMNS: [&str; 9] = [
    "ID",
    "Title",
    "Description",
    "Type",
    "Status",
    "Priority",
    "Created",
    "Updated",
    "Attachments",
];

/// One exported issue, every field already in its textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub issue_type: String,
    pub status: String,
    pub priority: String,
    pub created: String,
    pub updated: String,
    /// Attachment names joined with `", "`.
    pub attachments: String,
}

impl From<&Issue> for ExportRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.to_string(),
            title: issue.title.clone(),
            description: issue.description_text().to_string(),
            issue_type: issue.issue_type.to_string(),
            status: issue.status.to_string(),
            priority: issue.priority.to_string(),
            created: issue.created_at.to_rfc3339(),
            updated: issue.updated_at.to_rfc3339(),
            attachments: issue
                .attachments
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl ExportRow {
    fn cells(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.issue_type.as_str(),
            self.status.as_str(),
            self.priority.as_str(),
            self.created.as_str(),
            self.updated.as_str(),
            self.attachments.as_str(),
        ]
    }
}

/// Render a project's issues as CSV.
///
/// Fails with `InvalidInput` when the project has nothing to export.
pub fn export_project_csv(project: &Project, issues: &[Issue]) -> Result<String> {
    let rows: Vec<ExportRow> = issues
        .iter()
        .filter(|i| i.project_id == project.id)
        .map(ExportRow::from)
        .collect();
    if rows.is_empty() {
        return Err(TrackerError::invalid_input(format!(
            "no issues to export in project \"{}\"",
            project.name
        )));
    }

    Ok(write_csv(&EXPORT_COLUMNS, rows.iter().map(ExportRow::cells)))
}

/// `<Project_Name>_Issues_<YYYY-MM-DD>.csv`
pub fn export_file_name(project_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_Issues_{}.csv",
        project_name.replace(' ', "_"),
        date.format("%Y-%m-%d")
    )
}

pub(crate) fn write_csv<'a, I>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<&'a str>>,
{
    let mut output = String::new();
    push_record(&mut output, header.iter().copied());
    for row in rows {
        push_record(&mut output, row.into_iter());
    }
    output
}

fn push_record<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            output.push(',');
        }
        output.push_str(&csv_field(cell));
    }
    output.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_field_is_untouched() {
        assert_eq!(csv_field("Bug"), "Bug");
    }

    #[test]
    fn test_field_with_comma_and_quote_is_quoted() {
        assert_eq!(csv_field("a, \"b\""), "\"a, \"\"b\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_file_name_replaces_spaces() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(
            export_file_name("Bug Tracker App", date),
            "Bug_Tracker_App_Issues_2024-01-09.csv"
        );
    }
}
