//! Sport store contract and SQLite implementation.
//!
//! # Invariants
//! - Names are unique among active sports (exact match).
//! - Deactivating a sport keeps its employee associations.
//! - `employees_of` reads the same join rows as `Employee::sports`.

use crate::db::{DbError, DbResult, Filter, Gateway, Record, Scope};
use crate::model::employee::Employee;
use crate::model::sport::{Sport, SportId};
use crate::repo::employee_store::{load_employee, EMPLOYEE_SPORTS};
use crate::repo::{
    bool_to_int, normalize_name, parse_flag, EntityKind, StoreError, StoreResult,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::Row;

impl Record for Sport {
    const TABLE: &'static str = "sports";
    const COLUMNS: &'static [&'static str] = &["name", "is_active"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row<'_>) -> DbResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            is_active: parse_flag(row, Self::TABLE, "is_active")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(bool_to_int(self.is_active)),
        ]
    }
}

/// Store interface for sport operations.
pub trait SportStore {
    fn add(&self, name: &str) -> StoreResult<Sport>;
    /// Marks a sport inactive.
    fn remove(&self, id: SportId) -> StoreResult<()>;
    /// Lists active sports in insertion order.
    fn list_all(&self) -> StoreResult<Vec<Sport>>;
    /// Loads a sport regardless of its active flag.
    fn find_by_id(&self, id: SportId) -> StoreResult<Option<Sport>>;
    fn update(&self, id: SportId, name: &str) -> StoreResult<Sport>;
    /// Employees associated with the sport, active or not.
    fn employees_of(&self, id: SportId) -> StoreResult<Vec<Employee>>;
}

/// SQLite-backed sport store.
pub struct SqliteSportStore<'g> {
    gateway: &'g Gateway,
}

impl<'g> SqliteSportStore<'g> {
    pub fn new(gateway: &'g Gateway) -> Self {
        Self { gateway }
    }
}

impl SportStore for SqliteSportStore<'_> {
    fn add(&self, name: &str) -> StoreResult<Sport> {
        let name = normalize_name(EntityKind::Sport, name)?;
        let sport = self
            .gateway
            .in_scope("sport_add", |scope| -> StoreResult<Sport> {
                ensure_name_available(scope, &name, None)?;
                let mut sport = Sport::new(0, name.as_str());
                sport.id = scope.save(&sport)?;
                Ok(sport)
            })?;

        info!("event=sport_add module=repo status=ok sport_id={}", sport.id);
        Ok(sport)
    }

    fn remove(&self, id: SportId) -> StoreResult<()> {
        self.gateway
            .in_scope("sport_remove", |scope| -> StoreResult<()> {
                let mut sport = scope.get::<Sport>(id)?.ok_or(StoreError::NotFound {
                    kind: EntityKind::Sport,
                    id,
                })?;
                sport.deactivate();
                scope.update(&sport)?;
                Ok(())
            })?;

        info!("event=sport_remove module=repo status=ok sport_id={id}");
        Ok(())
    }

    fn list_all(&self) -> StoreResult<Vec<Sport>> {
        self.gateway
            .in_scope("sport_list", |scope| -> StoreResult<Vec<Sport>> {
                Ok(scope.query(&Filter::all().eq("is_active", 1_i64))?)
            })
    }

    fn find_by_id(&self, id: SportId) -> StoreResult<Option<Sport>> {
        self.gateway
            .in_scope("sport_get", |scope| -> StoreResult<Option<Sport>> {
                Ok(scope.get(id)?)
            })
    }

    fn update(&self, id: SportId, name: &str) -> StoreResult<Sport> {
        let name = normalize_name(EntityKind::Sport, name)?;
        self.gateway
            .in_scope("sport_update", |scope| -> StoreResult<Sport> {
                let mut sport = scope.get::<Sport>(id)?.ok_or(StoreError::NotFound {
                    kind: EntityKind::Sport,
                    id,
                })?;
                if sport.is_active {
                    ensure_name_available(scope, &name, Some(id))?;
                }
                sport.name = name;
                scope.update(&sport)?;
                Ok(sport)
            })
    }

    fn employees_of(&self, id: SportId) -> StoreResult<Vec<Employee>> {
        self.gateway
            .in_scope("sport_employees", |scope| -> StoreResult<Vec<Employee>> {
                if scope.get::<Sport>(id)?.is_none() {
                    return Ok(Vec::new());
                }

                let employee_ids = scope.linked_left(EMPLOYEE_SPORTS, id)?;
                let mut employees = Vec::with_capacity(employee_ids.len());
                for employee_id in employee_ids {
                    let employee = load_employee(scope, employee_id)?.ok_or_else(|| {
                        DbError::InvalidData(format!(
                            "sport {id} is linked to missing employee {employee_id}"
                        ))
                    })?;
                    employees.push(employee);
                }
                Ok(employees)
            })
    }
}

fn ensure_name_available(
    scope: &Scope<'_>,
    name: &str,
    except: Option<SportId>,
) -> StoreResult<()> {
    let mut filter = Filter::all()
        .eq("name", name.to_string())
        .eq("is_active", 1_i64);
    if let Some(id) = except {
        filter = filter.ne("id", id);
    }

    if scope.query::<Sport>(&filter)?.is_empty() {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            kind: EntityKind::Sport,
            field: "name",
            value: name.to_string(),
        })
    }
}
