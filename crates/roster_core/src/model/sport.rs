//! Sport entity.

use serde::{Deserialize, Serialize};

pub type SportId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub id: SportId,
    /// Unique among active sports.
    pub name: String,
    pub is_active: bool,
}

impl Sport {
    pub fn new(id: SportId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
        }
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}
