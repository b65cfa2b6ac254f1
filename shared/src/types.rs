//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Action, Resource, Role};

/// The authenticated caller of an engine operation.
///
/// Passed explicitly into every call; the engine never reads session
/// state from anywhere else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn can(&self, resource: Resource, action: Action) -> bool {
        self.role.can(resource, action)
    }
}
