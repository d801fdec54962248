//! Department store contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD and soft-delete for departments.
//! - Resolve the department -> employees back-reference.
//!
//! # Invariants
//! - Names are unique among non-deleted departments (exact match).
//! - Soft-deleting a department never touches referencing employees.
//! - Lookup by id ignores the deleted flag; listing excludes deleted rows.

use crate::db::{DbResult, Filter, Gateway, Record, Scope};
use crate::model::department::{Department, DepartmentId};
use crate::model::employee::Employee;
use crate::repo::employee_store::{hydrate_employee, EmployeeRow};
use crate::repo::{
    bool_to_int, normalize_name, parse_flag, EntityKind, StoreError, StoreResult,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::Row;

impl Record for Department {
    const TABLE: &'static str = "departments";
    const COLUMNS: &'static [&'static str] = &["name", "is_deleted"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> DbResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            is_deleted: parse_flag(row, Self::TABLE, "is_deleted")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(bool_to_int(self.is_deleted)),
        ]
    }
}

/// Store interface for department operations.
pub trait DepartmentStore {
    /// Creates a department and returns it with its assigned id.
    fn add(&self, name: &str) -> StoreResult<Department>;
    /// Soft-deletes a department.
    fn remove(&self, id: DepartmentId) -> StoreResult<()>;
    /// Lists non-deleted departments in insertion order.
    fn list_all(&self) -> StoreResult<Vec<Department>>;
    /// Loads a department regardless of its deleted flag.
    fn find_by_id(&self, id: DepartmentId) -> StoreResult<Option<Department>>;
    /// Renames a department.
    fn update(&self, id: DepartmentId, name: &str) -> StoreResult<Department>;
    /// Employees referencing the department, active or not.
    fn employees_of(&self, id: DepartmentId) -> StoreResult<Vec<Employee>>;
}

/// SQLite-backed department store.
pub struct SqliteDepartmentStore<'g> {
    gateway: &'g Gateway,
}

impl<'g> SqliteDepartmentStore<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }
}

impl DepartmentStore for SqliteDepartmentStore<'_> {
    fn add(&self, name: &str) -> StoreResult<Department> {
        let name = normalize_name(EntityKind::Department, name)?;
        let department = self
            .gateway
            .in_scope("department_add", |scope| -> StoreResult<Department> {
                ensure_name_available(scope, &name, None)?;
                let mut department = Department::new(0, name.as_str());
                department.id = scope.save(&department)?;
                Ok(department)
            })?;

        info!(
            "event=department_add module=repo status=ok department_id={}",
            department.id
        );
        Ok(department)
    }

    fn remove(&self, id: DepartmentId) -> StoreResult<()> {
        self.gateway
            .in_scope("department_remove", |scope| -> StoreResult<()> {
                let mut department = scope
                    .get::<Department>(id)?
                    .ok_or(StoreError::NotFound {
                        kind: EntityKind::Department,
                        id,
                    })?;
                department.soft_delete();
                scope.update(&department)?;
                Ok(())
            })?;

        info!("event=department_remove module=repo status=ok department_id={id}");
        Ok(())
    }

    fn list_all(&self) -> StoreResult<Vec<Department>> {
        self.gateway
            .in_scope("department_list", |scope| -> StoreResult<Vec<Department>> {
                Ok(scope.query(&Filter::all().eq("is_deleted", 0_i64))?)
            })
    }

    fn find_by_id(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        self.gateway
            .in_scope("department_get", |scope| -> StoreResult<Option<Department>> {
                Ok(scope.get(id)?)
            })
    }

    fn update(&self, id: DepartmentId, name: &str) -> StoreResult<Department> {
        let name = normalize_name(EntityKind::Department, name)?;
        self.gateway
            .in_scope("department_update", |scope| -> StoreResult<Department> {
                let mut department = scope
                    .get::<Department>(id)?
                    .ok_or(StoreError::NotFound {
                        kind: EntityKind::Department,
                        id,
                    })?;
                if !department.is_deleted {
                    ensure_name_available(scope, &name, Some(id))?;
                }
                department.name = name;
                scope.update(&department)?;
                Ok(department)
            })
    }

    fn employees_of(&self, id: DepartmentId) -> StoreResult<Vec<Employee>> {
        self.gateway
            .in_scope("department_employees", |scope| -> StoreResult<Vec<Employee>> {
                if scope.get::<Department>(id)?.is_none() {
                    return Ok(Vec::new());
                }

                let rows: Vec<EmployeeRow> =
                    scope.query(&Filter::all().eq("department_id", id))?;
                let mut employees = Vec::with_capacity(rows.len());
                for row in rows {
                    employees.push(hydrate_employee(scope, row)?);
                }
                Ok(employees)
            })
    }
}

fn ensure_name_available(
    scope: &Scope<'_>,
    name: &str,
    except: Option<DepartmentId>,
) -> StoreResult<()> {
    let mut filter = Filter::all()
        .eq("name", name.to_string())
        .eq("is_deleted", 0_i64);
    if let Some(id) = except {
        filter = filter.ne("id", id);
    }

    if scope.query::<Department>(&filter)?.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            kind: EntityKind::Department,
            field: "name",
            value: name.to_string(),
        })
    }
}
