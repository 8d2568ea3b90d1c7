//! issuedesk: an in-memory issue tracker core.
//!
//! Workspaces contain projects, projects contain issues, issues carry
//! attachments. All mutations go through [`tracker::Tracker`], which keeps the
//! [`store::Store`] and the [`audit::AuditLog`] in step. Issue lists are
//! produced by [`query::run_query`].

pub mod audit;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod report;
pub mod seed;
pub mod store;
pub mod tracker;

pub use error::{EntityKind, Result, TrackerError};
pub use tracker::Tracker;
