use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A project inside a workspace.
///
/// `workspace_id` is a back-reference, not ownership. Projects are never moved
/// between workspaces once created, so issues may safely copy it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub workspace_id: Uuid,
}
