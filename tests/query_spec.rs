use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use issuedesk::models::*;
use issuedesk::query::{run_query, IssueQuery, SortColumn, SortDirection};
use speculate2::speculate;
use uuid::Uuid;

struct Fixture {
    project_id: Uuid,
    workspace_id: Uuid,
    issues: Vec<Issue>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            project_id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            issues: Vec::new(),
        }
    }

    /// Adds an issue created `minutes` after a fixed epoch.
    fn add(
        &mut self,
        title: &str,
        issue_type: IssueType,
        status: IssueStatus,
        priority: IssuePriority,
        minutes: i64,
    ) -> Uuid {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        let issue = Issue {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            issue_type,
            status,
            priority,
            project_id: self.project_id,
            workspace_id: self.workspace_id,
            created_at: created,
            updated_at: created,
            attachments: Vec::new(),
        };
        let id = issue.id;
        self.issues.push(issue);
        id
    }

    fn query(&self) -> IssueQuery {
        IssueQuery::for_project(self.project_id)
    }

    fn titles(&self, query: &IssueQuery) -> Vec<String> {
        run_query(&self.issues, query)
            .into_iter()
            .map(|i| i.title.clone())
            .collect()
    }
}

fn sample() -> Fixture {
    let mut f = Fixture::new();
    f.add("Login Button Broken", IssueType::Bug, IssueStatus::ToDo, IssuePriority::High, 0);
    f.add("add dark mode", IssueType::Story, IssueStatus::InProgress, IssuePriority::Low, 1);
    f.add("Checkout epic", IssueType::Epic, IssueStatus::Blocked, IssuePriority::Medium, 2);
    f.add("Billing task", IssueType::Task, IssueStatus::Done, IssuePriority::Medium, 3);
    f
}

speculate! {
    before {
        let mut fixture = sample();
    }

    describe "scope" {
        it "keeps only the target project" {
            let mut foreign = fixture.issues[0].clone();
            foreign.id = Uuid::new_v4();
            foreign.project_id = Uuid::new_v4();
            foreign.title = "Foreign".to_string();
            fixture.issues.push(foreign);

            let titles = fixture.titles(&fixture.query());
            assert_eq!(titles.len(), 4);
            assert!(!titles.contains(&"Foreign".to_string()));
        }

        it "returns nothing for an unknown project" {
            let rows = run_query(&fixture.issues, &IssueQuery::for_project(Uuid::new_v4()));
            assert!(rows.is_empty());
        }
    }

    describe "filters" {
        it "treats an empty type set as no restriction" {
            let unfiltered = fixture.titles(&fixture.query());
            let empty = fixture.titles(&fixture.query().with_types(Vec::new()));
            assert_eq!(unfiltered, empty);
        }

        it "keeps issues whose type is in the set" {
            let query = fixture
                .query()
                .with_types([IssueType::Bug, IssueType::Epic])
                .sort_by(SortColumn::CreatedAt, SortDirection::Ascending);
            assert_eq!(fixture.titles(&query), vec!["Login Button Broken", "Checkout epic"]);
        }

        it "combines status and priority filters" {
            let query = fixture
                .query()
                .with_statuses([IssueStatus::Done, IssueStatus::Blocked])
                .with_priorities([IssuePriority::Medium])
                .sort_by(SortColumn::Title, SortDirection::Ascending);
            assert_eq!(fixture.titles(&query), vec!["Billing task", "Checkout epic"]);
        }
    }

    describe "search" {
        it "matches titles case-insensitively" {
            assert_eq!(fixture.titles(&fixture.query().search("login")), vec!["Login Button Broken"]);
            assert_eq!(fixture.titles(&fixture.query().search("BUTTON")), vec!["Login Button Broken"]);
        }

        it "matches descriptions" {
            fixture.issues[1].description = Some("Requested by the Night Shift".to_string());
            assert_eq!(fixture.titles(&fixture.query().search("night shift")), vec!["add dark mode"]);
        }

        it "matches ids" {
            let id = fixture.issues[2].id.to_string();
            let fragment = &id[..8];
            let titles = fixture.titles(&fixture.query().search(fragment.to_uppercase()));
            assert!(titles.contains(&"Checkout epic".to_string()));
        }

        it "ignores a blank term" {
            let all = fixture.titles(&fixture.query());
            assert_eq!(fixture.titles(&fixture.query().search("   ")), all);
        }

        it "returns an empty list when nothing matches" {
            assert!(fixture.titles(&fixture.query().search("xyz")).is_empty());
        }

        it "applies search after filters" {
            let query = fixture.query().with_types([IssueType::Story]).search("login");
            assert!(fixture.titles(&query).is_empty());
        }
    }

    describe "sorting" {
        it "defaults to newest first" {
            assert_eq!(
                fixture.titles(&fixture.query()),
                vec!["Billing task", "Checkout epic", "add dark mode", "Login Button Broken"]
            );
        }

        it "sorts titles case-insensitively" {
            let query = fixture.query().sort_by(SortColumn::Title, SortDirection::Ascending);
            assert_eq!(
                fixture.titles(&query),
                vec!["add dark mode", "Billing task", "Checkout epic", "Login Button Broken"]
            );
        }

        it "sorts priority by rank, not alphabetically" {
            let query = fixture.query().sort_by(SortColumn::Priority, SortDirection::Descending);
            let rows = run_query(&fixture.issues, &query);
            let priorities: Vec<_> = rows.iter().map(|i| i.priority).collect();
            assert_eq!(priorities, vec![
                IssuePriority::High,
                IssuePriority::Medium,
                IssuePriority::Medium,
                IssuePriority::Low,
            ]);
        }

        it "sorts type and status by name" {
            let by_type = fixture.query().sort_by(SortColumn::Type, SortDirection::Ascending);
            assert_eq!(
                fixture.titles(&by_type),
                vec!["Login Button Broken", "Checkout epic", "add dark mode", "Billing task"]
            );

            let by_status = fixture.query().sort_by(SortColumn::Status, SortDirection::Ascending);
            assert_eq!(
                fixture.titles(&by_status),
                vec!["Checkout epic", "Billing task", "add dark mode", "Login Button Broken"]
            );
        }

        it "keeps input order for equal priorities in both directions" {
            let mut f = Fixture::new();
            for i in 0..12 {
                let priority = IssuePriority::ALL[i % 3];
                f.add(&format!("issue-{:02}", i), IssueType::Task, IssueStatus::ToDo, priority, 0);
            }

            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let query = f.query().sort_by(SortColumn::Priority, direction);
                let rows = run_query(&f.issues, &query);
                for priority in IssuePriority::ALL {
                    let titles: Vec<_> = rows
                        .iter()
                        .filter(|i| i.priority == priority)
                        .map(|i| i.title.clone())
                        .collect();
                    let mut expected = titles.clone();
                    expected.sort();
                    assert_eq!(titles, expected, "order changed for {} {:?}", priority, direction);
                }
            }
        }

        it "keeps input order for identical titles and timestamps" {
            let mut f = Fixture::new();
            let first = f.add("Same", IssueType::Bug, IssueStatus::ToDo, IssuePriority::Low, 5);
            let second = f.add("same", IssueType::Bug, IssueStatus::ToDo, IssuePriority::Low, 5);

            for column in [SortColumn::Title, SortColumn::CreatedAt] {
                for direction in [SortDirection::Ascending, SortDirection::Descending] {
                    let rows = run_query(&f.issues, &f.query().sort_by(column, direction));
                    let ids: Vec<_> = rows.iter().map(|i| i.id).collect();
                    assert_eq!(ids, vec![first, second]);
                }
            }
        }

        it "does not modify the input" {
            let before = fixture.issues.clone();
            let query = fixture.query().sort_by(SortColumn::Title, SortDirection::Descending);
            let _ = run_query(&fixture.issues, &query);
            assert_eq!(fixture.issues, before);
        }
    }
}

const TITLES: [&str; 6] = [
    "Login Button Broken",
    "login button broken",
    "Add dark mode",
    "Billing",
    "billing",
    "Checkout Epic",
];

type IssueSpec = (usize, usize, usize, usize, i64);

fn issue_specs(min: usize) -> impl Strategy<Value = Vec<IssueSpec>> {
    prop::collection::vec(
        (
            0..TITLES.len(),
            0..IssueType::ALL.len(),
            0..IssueStatus::ALL.len(),
            0..IssuePriority::ALL.len(),
            0i64..3,
        ),
        min..24,
    )
}

fn fixture_from(specs: &[IssueSpec]) -> Fixture {
    let mut f = Fixture::new();
    for &(title, ty, status, priority, minutes) in specs {
        f.add(
            TITLES[title],
            IssueType::ALL[ty],
            IssueStatus::ALL[status],
            IssuePriority::ALL[priority],
            minutes,
        );
    }
    f
}

/// The value an issue is ordered by for `column`, as a comparable pair.
fn sort_key(issue: &Issue, column: SortColumn) -> (String, i64) {
    match column {
        SortColumn::Title => (issue.title.to_lowercase(), 0),
        SortColumn::Type => (issue.issue_type.as_str().to_lowercase(), 0),
        SortColumn::Status => (issue.status.as_str().to_lowercase(), 0),
        SortColumn::Priority => (String::new(), i64::from(issue.priority.rank())),
        SortColumn::CreatedAt => (String::new(), issue.created_at.timestamp_micros()),
    }
}

const COLUMNS: [SortColumn; 5] = [
    SortColumn::Title,
    SortColumn::Type,
    SortColumn::Status,
    SortColumn::Priority,
    SortColumn::CreatedAt,
];

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn sort_orders_rows_and_keeps_ties_in_input_order(specs in issue_specs(0)) {
        let f = fixture_from(&specs);
        let position: std::collections::HashMap<Uuid, usize> =
            f.issues.iter().enumerate().map(|(i, issue)| (issue.id, i)).collect();

        for column in COLUMNS {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let rows = run_query(&f.issues, &f.query().sort_by(column, direction));
                prop_assert_eq!(rows.len(), f.issues.len());

                for pair in rows.windows(2) {
                    let (a, b) = (sort_key(pair[0], column), sort_key(pair[1], column));
                    if a == b {
                        prop_assert!(position[&pair[0].id] < position[&pair[1].id]);
                    } else if direction == SortDirection::Ascending {
                        prop_assert!(a < b);
                    } else {
                        prop_assert!(a > b);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_filter_sets_match_no_filter(
        specs in issue_specs(0),
        term in prop::sample::select(vec!["", "login", "BILL", "zzz"]),
    ) {
        let f = fixture_from(&specs);
        let plain = f.query().search(term);
        let emptied = f
            .query()
            .search(term)
            .with_types(Vec::new())
            .with_statuses(Vec::new())
            .with_priorities(Vec::new());

        prop_assert_eq!(f.titles(&plain), f.titles(&emptied));
    }

    #[test]
    fn search_ignores_case(specs in issue_specs(1), pick in any::<prop::sample::Index>()) {
        let f = fixture_from(&specs);
        let target = &f.issues[pick.index(f.issues.len())];
        let word = target.title.split(' ').next().unwrap_or_default().to_string();

        let ids = |term: String| -> Vec<Uuid> {
            run_query(&f.issues, &f.query().search(term)).into_iter().map(|i| i.id).collect()
        };
        let upper = ids(word.to_uppercase());
        let lower = ids(word.to_lowercase());

        prop_assert!(upper.contains(&target.id));
        prop_assert_eq!(upper, lower);
    }
}
