//! Domain models for issuedesk.
//!
//! # Hierarchy
//!
//! - [`Workspace`]: root container. Holds no child list.
//! - [`Project`]: belongs to one workspace through `workspace_id`.
//! - [`Issue`]: belongs to one project, and redundantly to that project's
//!   workspace. Owns its [`Attachment`]s.
//!
//! # Activity
//!
//! - [`ActivityLogEntry`]: append-only record of a mutation, carrying enough
//!   captured names ([`ActivityDetails`]) to be rendered after the entities it
//!   mentions are gone.

mod activity;
mod attachment;
mod issue;
mod project;
mod workspace;

pub use activity::*;
pub use attachment::*;
pub use issue::*;
pub use project::*;
pub use workspace::*;
