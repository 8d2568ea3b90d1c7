//! Read-only issue queries: scope, filter, search, sort.
//!
//! [`run_query`] is a pure function of its inputs. It borrows the issues it is
//! given and returns references in the requested order; nothing is cached
//! between calls.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrackerError;
use crate::models::{Issue, IssuePriority, IssueStatus, IssueType};

/// The column an issue list is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Title,
    Type,
    Status,
    Priority,
    #[default]
    CreatedAt,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Type => "type",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::CreatedAt => "created_at",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "type" => Ok(Self::Type),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "created_at" | "createdat" | "created" => Ok(Self::CreatedAt),
            _ => Err(TrackerError::invalid_input(format!("unknown sort column: {:?}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Everything that determines an issue list view.
///
/// Empty filter sets place no restriction. A blank search term is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueQuery {
    pub project_id: Uuid,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub types: BTreeSet<IssueType>,
    #[serde(default)]
    pub statuses: BTreeSet<IssueStatus>,
    #[serde(default)]
    pub priorities: BTreeSet<IssuePriority>,
    #[serde(default)]
    pub sort: SortColumn,
    #[serde(default)]
    pub direction: SortDirection,
}

impl IssueQuery {
    /// All issues of a project, newest first.
    pub fn for_project(project_id: Uuid) -> Self {
        Self {
            project_id,
            ..Default::default()
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = IssueType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = IssueStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_priorities(mut self, priorities: impl IntoIterator<Item = IssuePriority>) -> Self {
        self.priorities = priorities.into_iter().collect();
        self
    }

    pub fn sort_by(mut self, column: SortColumn, direction: SortDirection) -> Self {
        self.sort = column;
        self.direction = direction;
        self
    }
}

fn allowed<T: Ord>(set: &BTreeSet<T>, value: &T) -> bool {
    set.is_empty() || set.contains(value)
}

fn matches_search(issue: &Issue, needle: &str) -> bool {
    issue.title.to_lowercase().contains(needle)
        || issue
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
        || issue.id.to_string().contains(needle)
}

fn compare(a: &Issue, b: &Issue, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortColumn::Type => a
            .issue_type
            .as_str()
            .to_lowercase()
            .cmp(&b.issue_type.as_str().to_lowercase()),
        SortColumn::Status => a
            .status
            .as_str()
            .to_lowercase()
            .cmp(&b.status.as_str().to_lowercase()),
        SortColumn::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Produce the ordered view of `issues` described by `query`.
///
/// Stages run in a fixed order: project scope, attribute filters, text
/// search, then a stable sort. Issues comparing equal keep their input order
/// in either direction.
pub fn run_query<'a, I>(issues: I, query: &IssueQuery) -> Vec<&'a Issue>
where
    I: IntoIterator<Item = &'a Issue>,
{
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut rows: Vec<&Issue> = issues
        .into_iter()
        .filter(|i| i.project_id == query.project_id)
        .filter(|i| {
            allowed(&query.types, &i.issue_type)
                && allowed(&query.statuses, &i.status)
                && allowed(&query.priorities, &i.priority)
        })
        .filter(|i| needle.as_deref().map_or(true, |n| matches_search(i, n)))
        .collect();

    rows.sort_by(|a, b| match query.direction {
        SortDirection::Ascending => compare(a, b, query.sort),
        SortDirection::Descending => compare(b, a, query.sort),
    });

    rows
}
