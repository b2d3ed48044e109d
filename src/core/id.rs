//! Entity identifiers shared by every variant of one running workflow.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque key grouping all event-log entries of one workflow instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// States that carry the identifier of the entity they belong to.
///
/// Required by the persistence decorator, which keys log entries by it.
pub trait Identified {
    fn entity_id(&self) -> EntityId;
}
