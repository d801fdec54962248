//! Store layer: per-entity persistence over the [`Gateway`](crate::db::Gateway).
//!
//! # Responsibility
//! - Define use-case oriented store contracts for departments, sports and
//!   employees.
//! - Keep SQL and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Every store operation runs inside exactly one gateway scope.
//! - Store APIs return semantic errors (`NotFound`, `Conflict`) in addition
//!   to persistence failures, which pass through unchanged.
//! - Deletes are soft; no store issues a physical `DELETE` of an entity row.

use crate::db::{DbError, DbResult};
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod department_store;
pub mod employee_store;
pub mod sport_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Entity family named in store and service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Department,
    Sport,
    Employee,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Department => "department",
            Self::Sport => "sport",
            Self::Employee => "employee",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// Referenced id does not resolve to a stored entity.
    NotFound { kind: EntityKind, id: i64 },
    /// Uniqueness violation on a name or email.
    Conflict {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Name is blank after trim.
    EmptyName(EntityKind),
    /// Storage backend failure; the operation's scope was rolled back.
    Db(DbError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::Conflict { kind, field, value } => {
                write!(f, "{kind} {field} already in use: `{value}`")
            }
            Self::EmptyName(kind) => write!(f, "{kind} name must not be blank"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Trims a department/sport name and rejects blank values.
pub(crate) fn normalize_name(kind: EntityKind, name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyName(kind));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn parse_flag(row: &Row<'_>, table: &str, column: &str) -> DbResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DbError::InvalidData(format!(
            "invalid {column} value `{other}` in {table}.{column}"
        ))),
    }
}
