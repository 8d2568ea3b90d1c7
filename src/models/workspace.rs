use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The root of the hierarchy.
///
/// A workspace owns no collection of its own: projects point back at it via
/// `workspace_id`, and removing the workspace removes every such project along
/// with their issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: Uuid,
    /// Display name. Names are not unique.
    pub name: String,
}
