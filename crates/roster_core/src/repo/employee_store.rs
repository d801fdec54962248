//! Employee store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the employee aggregate (employee row + owned address row).
//! - Own the employee <-> sport association and the employee -> department
//!   reference.
//!
//! # Invariants
//! - Employee and address are written in one scope; neither exists alone.
//! - Email is unique across active and inactive employees.
//! - One `employee_sports` row backs both `Employee::sports` and the
//!   sport's employee set, so linking/unlinking updates both sides at once.
//! - Soft delete leaves department and sport associations untouched.

use crate::db::{Association, DbError, DbResult, Filter, Gateway, Record, Scope};
use crate::model::department::{Department, DepartmentId};
use crate::model::employee::{Address, Employee, EmployeeId, NewEmployee};
use crate::model::sport::{Sport, SportId};
use crate::repo::{bool_to_int, parse_flag, EntityKind, StoreError, StoreResult};
use chrono::NaiveDate;
use log::info;
use rusqlite::types::Value;
use rusqlite::Row;

const DOB_FORMAT: &str = "%Y-%m-%d";

/// Join table backing the employee/sport many-to-many relation.
pub(crate) const EMPLOYEE_SPORTS: Association = Association {
    table: "employee_sports",
    left: "employee_id",
    right: "sport_id",
};

/// Flat `employees` row; the aggregate is assembled by [`hydrate_employee`].
#[derive(Debug, Clone)]
pub(crate) struct EmployeeRow {
    id: EmployeeId,
    name: String,
    dob: NaiveDate,
    department_id: DepartmentId,
    email: String,
    is_active: bool,
    address_id: i64,
}

impl Record for EmployeeRow {
    const TABLE: &'static str = "employees";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "dob",
        "department_id",
        "email",
        "is_active",
        "address_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> DbResult<Self> {
        let dob_text: String = row.get("dob")?;
        let dob = NaiveDate::parse_from_str(&dob_text, DOB_FORMAT).map_err(|_| {
            DbError::InvalidData(format!("invalid date `{dob_text}` in employees.dob"))
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            dob,
            department_id: row.get("department_id")?,
            email: row.get("email")?,
            is_active: parse_flag(row, Self::TABLE, "is_active")?,
            address_id: row.get("address_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.dob.format(DOB_FORMAT).to_string()),
            Value::Integer(self.department_id),
            Value::Text(self.email.clone()),
            Value::Integer(bool_to_int(self.is_active)),
            Value::Integer(self.address_id),
        ]
    }
}

#[derive(Debug, Clone)]
struct AddressRow {
    id: i64,
    address: Address,
}

impl Record for AddressRow {
    const TABLE: &'static str = "addresses";
    const COLUMNS: &'static [&'static str] = &["street", "city", "state", "zip"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> DbResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            address: Address {
                street: row.get("street")?,
                city: row.get("city")?,
                state: row.get("state")?,
                zip: row.get("zip")?,
            },
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.address.street.clone()),
            Value::Text(self.address.city.clone()),
            Value::Text(self.address.state.clone()),
            Value::Text(self.address.zip.clone()),
        ]
    }
}

/// Store interface for employee operations.
pub trait EmployeeStore {
    /// Persists a new active employee together with its address.
    fn add(&self, employee: &NewEmployee) -> StoreResult<Employee>;
    /// Marks an employee inactive.
    fn remove(&self, id: EmployeeId) -> StoreResult<()>;
    /// Lists active employees in insertion order.
    fn list_all(&self) -> StoreResult<Vec<Employee>>;
    /// Loads an employee regardless of its active flag.
    fn find_by_id(&self, id: EmployeeId) -> StoreResult<Option<Employee>>;
    /// Overwrites name, dob, email, department and address.
    ///
    /// The active flag and sport memberships are left as stored.
    fn update(&self, employee: &Employee) -> StoreResult<Employee>;
    /// Associates a sport; a no-op when already associated.
    fn add_sport(&self, employee_id: EmployeeId, sport_id: SportId) -> StoreResult<()>;
    /// Dissociates a sport; a no-op when not associated.
    fn remove_sport(&self, employee_id: EmployeeId, sport_id: SportId) -> StoreResult<()>;
}

/// SQLite-backed employee store.
pub struct SqliteEmployeeStore<'g> {
    gateway: &'g Gateway,
}

impl<'g> SqliteEmployeeStore<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }
}

impl EmployeeStore for SqliteEmployeeStore<'_> {
    fn add(&self, employee: &NewEmployee) -> StoreResult<Employee> {
        let created = self
            .gateway
            .in_scope("employee_add", |scope| -> StoreResult<Employee> {
                require_department(scope, employee.department.id)?;
                ensure_email_available(scope, &employee.email, None)?;

                let address_id = scope.save(&AddressRow {
                    id: 0,
                    address: employee.address.clone(),
                })?;
                let mut row = EmployeeRow {
                    id: 0,
                    name: employee.name.clone(),
                    dob: employee.dob,
                    department_id: employee.department.id,
                    email: employee.email.clone(),
                    is_active: true,
                    address_id,
                };
                row.id = scope.save(&row)?;
                Ok(hydrate_employee(scope, row)?)
            })?;

        info!(
            "event=employee_add module=repo status=ok employee_id={} department_id={}",
            created.id, created.department.id
        );
        Ok(created)
    }

    fn remove(&self, id: EmployeeId) -> StoreResult<()> {
        self.gateway
            .in_scope("employee_remove", |scope| -> StoreResult<()> {
                let mut row = require_employee(scope, id)?;
                row.is_active = false;
                scope.update(&row)?;
                Ok(())
            })?;

        info!("event=employee_remove module=repo status=ok employee_id={id}");
        Ok(())
    }

    fn list_all(&self) -> StoreResult<Vec<Employee>> {
        self.gateway
            .in_scope("employee_list", |scope| -> StoreResult<Vec<Employee>> {
                let rows: Vec<EmployeeRow> = scope.query(&Filter::all().eq("is_active", 1_i64))?;
                let mut employees = Vec::with_capacity(rows.len());
                for row in rows {
                    employees.push(hydrate_employee(scope, row)?);
                }
                Ok(employees)
            })
    }

    fn find_by_id(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        self.gateway
            .in_scope("employee_get", |scope| -> StoreResult<Option<Employee>> {
                Ok(load_employee(scope, id)?)
            })
    }

    fn update(&self, employee: &Employee) -> StoreResult<Employee> {
        self.gateway
            .in_scope("employee_update", |scope| -> StoreResult<Employee> {
                let existing = require_employee(scope, employee.id)?;
                require_department(scope, employee.department.id)?;
                ensure_email_available(scope, &employee.email, Some(employee.id))?;

                scope.update(&AddressRow {
                    id: existing.address_id,
                    address: employee.address.clone(),
                })?;
                let row = EmployeeRow {
                    id: existing.id,
                    name: employee.name.clone(),
                    dob: employee.dob,
                    department_id: employee.department.id,
                    email: employee.email.clone(),
                    is_active: existing.is_active,
                    address_id: existing.address_id,
                };
                scope.update(&row)?;
                Ok(hydrate_employee(scope, row)?)
            })
    }

    fn add_sport(&self, employee_id: EmployeeId, sport_id: SportId) -> StoreResult<()> {
        let linked = self
            .gateway
            .in_scope("employee_add_sport", |scope| -> StoreResult<bool> {
                require_employee(scope, employee_id)?;
                require_sport(scope, sport_id)?;
                Ok(scope.link(EMPLOYEE_SPORTS, employee_id, sport_id)?)
            })?;

        info!(
            "event=employee_add_sport module=repo status=ok employee_id={employee_id} sport_id={sport_id} changed={linked}"
        );
        Ok(())
    }

    fn remove_sport(&self, employee_id: EmployeeId, sport_id: SportId) -> StoreResult<()> {
        let unlinked = self
            .gateway
            .in_scope("employee_remove_sport", |scope| -> StoreResult<bool> {
                require_employee(scope, employee_id)?;
                require_sport(scope, sport_id)?;
                Ok(scope.unlink(EMPLOYEE_SPORTS, employee_id, sport_id)?)
            })?;

        info!(
            "event=employee_remove_sport module=repo status=ok employee_id={employee_id} sport_id={sport_id} changed={unlinked}"
        );
        Ok(())
    }
}

/// Loads one employee aggregate by id inside an open scope.
pub(crate) fn load_employee(scope: &Scope<'_>, id: EmployeeId) -> DbResult<Option<Employee>> {
    match scope.get::<EmployeeRow>(id)? {
        Some(row) => hydrate_employee(scope, row).map(Some),
        None => Ok(None),
    }
}

/// Resolves department, address and sports for one employee row.
///
/// A dangling department or address reference is reported as invalid data:
/// both are required to exist for every stored employee.
pub(crate) fn hydrate_employee(scope: &Scope<'_>, row: EmployeeRow) -> DbResult<Employee> {
    let department = scope
        .get::<Department>(row.department_id)?
        .ok_or_else(|| {
            DbError::InvalidData(format!(
                "employee {} references missing department {}",
                row.id, row.department_id
            ))
        })?;
    let address = scope
        .get::<AddressRow>(row.address_id)?
        .ok_or_else(|| {
            DbError::InvalidData(format!(
                "employee {} references missing address {}",
                row.id, row.address_id
            ))
        })?
        .address;

    let sport_ids = scope.linked_right(EMPLOYEE_SPORTS, row.id)?;
    let mut sports = Vec::with_capacity(sport_ids.len());
    for sport_id in sport_ids {
        let sport = scope.get::<Sport>(sport_id)?.ok_or_else(|| {
            DbError::InvalidData(format!(
                "employee {} is linked to missing sport {sport_id}",
                row.id
            ))
        })?;
        sports.push(sport);
    }

    Ok(Employee {
        id: row.id,
        name: row.name,
        dob: row.dob,
        department,
        email: row.email,
        is_active: row.is_active,
        address,
        sports,
    })
}

fn require_employee(scope: &Scope<'_>, id: EmployeeId) -> StoreResult<EmployeeRow> {
    scope.get::<EmployeeRow>(id)?.ok_or(StoreError::NotFound {
        kind: EntityKind::Employee,
        id,
    })
}

fn require_department(scope: &Scope<'_>, id: DepartmentId) -> StoreResult<Department> {
    scope.get::<Department>(id)?.ok_or(StoreError::NotFound {
        kind: EntityKind::Department,
        id,
    })
}

fn require_sport(scope: &Scope<'_>, id: SportId) -> StoreResult<Sport> {
    scope.get::<Sport>(id)?.ok_or(StoreError::NotFound {
        kind: EntityKind::Sport,
        id,
    })
}

fn ensure_email_available(
    scope: &Scope<'_>,
    email: &str,
    except: Option<EmployeeId>,
) -> StoreResult<()> {
    let mut filter = Filter::all().eq("email", email.to_string());
    if let Some(id) = except {
        filter = filter.ne("id", id);
    }

    if scope.query::<EmployeeRow>(&filter)?.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            kind: EntityKind::Employee,
            field: "email",
            value: email.to_string(),
        })
    }
}
