use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use issuedesk::audit::render::short_id;
use issuedesk::config::TrackerConfig;
use issuedesk::models::*;
use issuedesk::query::{IssueQuery, SortColumn, SortDirection};
use issuedesk::seed::Seed;
use issuedesk::{export, report, Tracker};

#[derive(Parser)]
#[command(name = "issuedesk")]
#[command(about = "In-memory issue tracking: workspaces, projects, issues and their activity")]
struct Cli {
    /// JSON seed file to start the session from (defaults to the demo data)
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Start from an empty session instead of the demo data
    #[arg(long, global = true, conflicts_with = "seed")]
    empty: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List workspaces and their projects
    Projects,
    /// List a project's issues
    List {
        /// Project name or id
        #[arg(short, long)]
        project: String,

        /// Case-insensitive text to look for in title, description or id
        #[arg(short, long)]
        search: Option<String>,

        /// Only these issue types (repeatable)
        #[arg(long = "type")]
        types: Vec<IssueType>,

        /// Only these statuses (repeatable)
        #[arg(long = "status")]
        statuses: Vec<IssueStatus>,

        /// Only these priorities (repeatable)
        #[arg(long = "priority")]
        priorities: Vec<IssuePriority>,

        /// Sort column: title, type, status, priority, created_at
        #[arg(long, default_value = "created_at")]
        sort: SortColumn,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Export a project's issues as CSV
    Export {
        /// Project name or id
        #[arg(short, long)]
        project: String,

        /// Directory to write the file into (prints to stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Report issues created in the last N days as CSV
    Report {
        #[arg(short, long, default_value = "7")]
        days: u32,

        /// Directory to write the file into (prints to stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the session's activity (full summary unless --feed)
    Activity {
        /// Show the capped feed instead of the full summary
        #[arg(long)]
        feed: bool,
    },
    /// Walk through a short session and print its activity
    Demo,
}

/// Initialize tracing on stderr so stdout carries only command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "issuedesk=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = TrackerConfig::load();
    let seed = match (&cli.seed, cli.empty) {
        (Some(path), _) => Seed::from_file(path)?,
        (None, true) => Seed::empty(),
        (None, false) => Seed::demo(),
    };
    let tracker = Tracker::from_seed(&seed, &config).context("Failed to seed session")?;

    match cli.command.unwrap_or(Commands::Projects) {
        Commands::Projects => {
            for ws in tracker.list_workspaces() {
                println!("{}  {}", short_id(&ws.id), ws.name);
                for project in tracker.list_projects(Some(ws.id)) {
                    let count = tracker.project_issues(project.id).len();
                    println!("  {}  {} ({} issues)", short_id(&project.id), project.name, count);
                }
            }
        }
        Commands::List {
            project,
            search,
            types,
            statuses,
            priorities,
            sort,
            asc,
        } => {
            let project = find_project(&tracker, &project)?;
            let direction = if asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            let mut query = IssueQuery::for_project(project.id)
                .with_types(types)
                .with_statuses(statuses)
                .with_priorities(priorities)
                .sort_by(sort, direction);
            if let Some(term) = search {
                query = query.search(term);
            }

            let issues = tracker.query_issues(&query);
            if issues.is_empty() {
                println!("No issues found in \"{}\".", project.name);
            }
            for issue in issues {
                print_issue_row(&issue);
            }
        }
        Commands::Export { project, out } => {
            let project = find_project(&tracker, &project)?;
            let issues = tracker.project_issues(project.id);
            let csv = export::export_project_csv(&project, &issues)?;
            let name = export::export_file_name(&project.name, Utc::now().date_naive());
            emit(csv, out, &name)?;
        }
        Commands::Report { days, out } => {
            let issues: Vec<Issue> = tracker
                .list_projects(None)
                .into_iter()
                .flat_map(|p| tracker.project_issues(p.id))
                .collect();
            let rows = report::report_rows(&issues, days, Utc::now(), |id| {
                tracker.get_project(id).map(|p| p.name)
            });
            if rows.is_empty() {
                println!("No issues created in the last {} days.", days);
                return Ok(());
            }
            let name = report::report_file_name(days, Utc::now().date_naive());
            emit(report::report_csv(&rows), out, &name)?;
        }
        Commands::Activity { feed } => {
            if tracker.activity_count() == 0 {
                println!("No activity recorded yet.");
            } else if feed {
                let feed = tracker.activity_feed();
                for item in &feed.items {
                    println!("{}  {}", item.timestamp.format("%Y-%m-%d %H:%M"), item.text);
                }
                if let Some(notice) = feed.notice() {
                    println!("{}", notice);
                }
            } else {
                print!("{}", tracker.activity_summary());
            }
        }
        Commands::Demo => run_demo(&tracker)?,
    }

    Ok(())
}

/// Resolve a project by id or by (case-insensitive) name.
fn find_project(tracker: &Tracker, key: &str) -> Result<Project> {
    if let Ok(id) = Uuid::parse_str(key) {
        if let Some(project) = tracker.get_project(id) {
            return Ok(project);
        }
    }
    tracker
        .list_projects(None)
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| anyhow::anyhow!("Project not found: {}", key))
}

fn print_issue_row(issue: &Issue) {
    println!(
        "{}  {:<5}  {:<10}  {:<6}  {}",
        short_id(&issue.id),
        issue.issue_type,
        issue.status,
        issue.priority,
        issue.title
    );
}

fn emit(content: String, out: Option<PathBuf>, file_name: &str) -> Result<()> {
    match out {
        Some(dir) => {
            let path = dir.join(file_name);
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn run_demo(tracker: &Tracker) -> Result<()> {
    let workspace = tracker.create_workspace("Demo Workspace")?;
    let project = tracker.create_project("Demo Project", workspace.id)?;
    let issue = tracker.create_issue(
        CreateIssueInput::new(project.id, workspace.id, "Button not working")
            .with_type(IssueType::Bug)
            .with_priority(IssuePriority::High),
    )?;

    tracker.update_issue(
        issue.id,
        UpdateIssueInput {
            priority: Some(IssuePriority::Low),
            status: Some(IssueStatus::InProgress),
            ..Default::default()
        },
    )?;

    let oversized = NewAttachment {
        name: "capture.mov".to_string(),
        size: 11 * 1024 * 1024,
        mime_type: "video/quicktime".to_string(),
        content_handle: ContentHandle::new("local:capture.mov"),
    };
    if let Err(e) = tracker.add_attachment(issue.id, oversized) {
        println!("Rejected: {}", e);
    }

    tracker.add_attachment(
        issue.id,
        NewAttachment {
            name: "screenshot.png".to_string(),
            size: 48 * 1024,
            mime_type: "image/png".to_string(),
            content_handle: ContentHandle::new("local:screenshot.png"),
        },
    )?;
    tracker.create_issues_bulk("Write release notes\n\nUpdate docs\n", project.id, workspace.id)?;

    println!();
    for issue in tracker.query_issues(
        &IssueQuery::for_project(project.id).sort_by(SortColumn::Priority, SortDirection::Descending),
    ) {
        print_issue_row(&issue);
    }

    tracker.delete_project(project.id)?;

    println!();
    print!("{}", tracker.activity_summary());
    Ok(())
}
