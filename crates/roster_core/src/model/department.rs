//! Department entity.

use serde::{Deserialize, Serialize};

pub type DepartmentId = i64;

/// Organisational unit employees belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    /// Unique among non-deleted departments.
    pub name: String,
    /// Soft-delete tombstone. Deleted departments stay resolvable by id.
    pub is_deleted: bool,
}

impl Department {
    pub fn new(id: DepartmentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_deleted: false,
        }
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Returns whether new employees may be assigned here.
    pub fn is_assignable(&self) -> bool {
        !self.is_deleted
    }
}
