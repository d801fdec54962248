//! Roster domain service.
//!
//! # Responsibility
//! - Compose department, sport and employee stores into caller-facing
//!   use cases.
//! - Enforce cross-entity invariants before delegating to a store.
//!
//! # Invariants
//! - A new employee references an existing, non-deleted department.
//! - An employee moved to another department must move to a non-deleted one;
//!   keeping a department that was deleted later is allowed.
//! - Sport association requires both the employee and the sport to exist;
//!   the store checks the employee first, in the same scope as the write.
//! - Missing references surface as the typed `*NotFound` variant naming the
//!   missing side; they are never swallowed.

use crate::db::{DbError, Gateway};
use crate::model::department::{Department, DepartmentId};
use crate::model::employee::{Address, Employee, EmployeeId, NewEmployee};
use crate::model::sport::{Sport, SportId};
use crate::repo::department_store::{DepartmentStore, SqliteDepartmentStore};
use crate::repo::employee_store::{EmployeeStore, SqliteEmployeeStore};
use crate::repo::sport_store::{SportStore, SqliteSportStore};
use crate::repo::{EntityKind, StoreError};
use chrono::NaiveDate;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors reported to roster callers.
#[derive(Debug)]
pub enum ServiceError {
    DepartmentNotFound(DepartmentId),
    EmployeeNotFound(EmployeeId),
    SportNotFound(SportId),
    /// Uniqueness violation on a department/sport name or employee email.
    Conflict {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },
    /// Department or sport name is blank.
    InvalidName(EntityKind),
    /// Storage backend failure; partial writes were rolled back.
    Persistence(DbError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DepartmentNotFound(id) => write!(f, "department not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::SportNotFound(id) => write!(f, "sport not found: {id}"),
            Self::Conflict { kind, field, value } => {
                write!(f, "{kind} {field} already in use: `{value}`")
            }
            Self::InvalidName(kind) => write!(f, "{kind} name must not be blank"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound {
                kind: EntityKind::Department,
                id,
            } => Self::DepartmentNotFound(id),
            StoreError::NotFound {
                kind: EntityKind::Employee,
                id,
            } => Self::EmployeeNotFound(id),
            StoreError::NotFound {
                kind: EntityKind::Sport,
                id,
            } => Self::SportNotFound(id),
            StoreError::Conflict { kind, field, value } => Self::Conflict { kind, field, value },
            StoreError::EmptyName(kind) => Self::InvalidName(kind),
            StoreError::Db(err) => Self::Persistence(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-supplied employee fields for create and update.
///
/// Field formats (name, email, zip, dob not in the future) are validated by
/// the caller before reaching the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeInput {
    pub name: String,
    pub dob: NaiveDate,
    pub department_id: DepartmentId,
    pub email: String,
    pub address: Address,
}

/// Roster use-case facade over the three stores.
pub struct RosterService<D, S, E> {
    departments: D,
    sports: S,
    employees: E,
}

/// Service wired to the SQLite stores of one gateway.
pub type SqliteRosterService<'g> =
    RosterService<SqliteDepartmentStore<'g>, SqliteSportStore<'g>, SqliteEmployeeStore<'g>>;

impl<'g> SqliteRosterService<'g> {
    pub fn sqlite(gateway: &'g Gateway) -> Self {
        RosterService::new(
            SqliteDepartmentStore::new(gateway),
            SqliteSportStore::new(gateway),
            SqliteEmployeeStore::new(gateway),
        )
    }
}

impl<D, S, E> RosterService<D, S, E>
where
    D: DepartmentStore,
    S: SportStore,
    E: EmployeeStore,
{
    pub fn new(departments: D, sports: S, employees: E) -> Self {
        Self {
            departments,
            sports,
            employees,
        }
    }

    pub fn add_department(&self, name: &str) -> ServiceResult<Department> {
        Ok(self.departments.add(name)?)
    }

    pub fn remove_department(&self, id: DepartmentId) -> ServiceResult<()> {
        Ok(self.departments.remove(id)?)
    }

    /// Non-deleted departments.
    pub fn list_departments(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.departments.list_all()?)
    }

    /// Department by id, including soft-deleted ones.
    pub fn find_department(&self, id: DepartmentId) -> ServiceResult<Option<Department>> {
        Ok(self.departments.find_by_id(id)?)
    }

    pub fn update_department(&self, id: DepartmentId, name: &str) -> ServiceResult<Department> {
        Ok(self.departments.update(id, name)?)
    }

    /// Employees referencing the department; empty when it does not exist.
    pub fn employees_in_department(&self, id: DepartmentId) -> ServiceResult<Vec<Employee>> {
        Ok(self.departments.employees_of(id)?)
    }

    pub fn add_sport(&self, name: &str) -> ServiceResult<Sport> {
        Ok(self.sports.add(name)?)
    }

    pub fn remove_sport(&self, id: SportId) -> ServiceResult<()> {
        Ok(self.sports.remove(id)?)
    }

    pub fn list_sports(&self) -> ServiceResult<Vec<Sport>> {
        Ok(self.sports.list_all()?)
    }

    pub fn find_sport(&self, id: SportId) -> ServiceResult<Option<Sport>> {
        Ok(self.sports.find_by_id(id)?)
    }

    pub fn update_sport(&self, id: SportId, name: &str) -> ServiceResult<Sport> {
        Ok(self.sports.update(id, name)?)
    }

    pub fn employees_in_sport(&self, id: SportId) -> ServiceResult<Vec<Employee>> {
        Ok(self.sports.employees_of(id)?)
    }

    /// Creates an active employee in a non-deleted department.
    pub fn add_employee(&self, input: EmployeeInput) -> ServiceResult<Employee> {
        let department = self.require_department(input.department_id)?;
        if !department.is_assignable() {
            warn!(
                "event=employee_add module=service status=rejected reason=department_deleted department_id={}",
                department.id
            );
            return Err(ServiceError::DepartmentNotFound(department.id));
        }

        let employee = NewEmployee {
            name: input.name,
            dob: input.dob,
            department,
            email: input.email,
            address: input.address,
        };
        Ok(self.employees.add(&employee)?)
    }

    /// Replaces an employee's name, dob, email, department and address.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        input: EmployeeInput,
    ) -> ServiceResult<Employee> {
        let mut employee = self.require_employee(id)?;
        let department = self.require_department(input.department_id)?;
        if department.id != employee.department.id && !department.is_assignable() {
            warn!(
                "event=employee_update module=service status=rejected reason=department_deleted employee_id={id} department_id={}",
                department.id
            );
            return Err(ServiceError::DepartmentNotFound(department.id));
        }

        employee.name = input.name;
        employee.dob = input.dob;
        employee.email = input.email;
        employee.department = department;
        employee.address = input.address;
        Ok(self.employees.update(&employee)?)
    }

    pub fn remove_employee(&self, id: EmployeeId) -> ServiceResult<()> {
        Ok(self.employees.remove(id)?)
    }

    /// Active employees.
    pub fn list_employees(&self) -> ServiceResult<Vec<Employee>> {
        Ok(self.employees.list_all()?)
    }

    /// Employee by id, including inactive ones.
    pub fn find_employee(&self, id: EmployeeId) -> ServiceResult<Option<Employee>> {
        Ok(self.employees.find_by_id(id)?)
    }

    pub fn add_sport_to_employee(
        &self,
        employee_id: EmployeeId,
        sport_id: SportId,
    ) -> ServiceResult<()> {
        Ok(self.employees.add_sport(employee_id, sport_id)?)
    }

    pub fn remove_sport_from_employee(
        &self,
        employee_id: EmployeeId,
        sport_id: SportId,
    ) -> ServiceResult<()> {
        Ok(self.employees.remove_sport(employee_id, sport_id)?)
    }

    fn require_department(&self, id: DepartmentId) -> ServiceResult<Department> {
        self.departments
            .find_by_id(id)?
            .ok_or(ServiceError::DepartmentNotFound(id))
    }

    fn require_employee(&self, id: EmployeeId) -> ServiceResult<Employee> {
        self.employees
            .find_by_id(id)?
            .ok_or(ServiceError::EmployeeNotFound(id))
    }
}
