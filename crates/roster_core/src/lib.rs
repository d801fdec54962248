//! Core domain logic for the employee roster.
//! Departments, sports and employees live here, together with the
//! persistence gateway that keeps their invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::RosterConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult, Gateway, Scope};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{Department, DepartmentId};
pub use model::employee::{Address, Employee, EmployeeId, NewEmployee};
pub use model::sport::{Sport, SportId};
pub use repo::department_store::{DepartmentStore, SqliteDepartmentStore};
pub use repo::employee_store::{EmployeeStore, SqliteEmployeeStore};
pub use repo::sport_store::{SportStore, SqliteSportStore};
pub use repo::{EntityKind, StoreError, StoreResult};
pub use service::roster_service::{
    EmployeeInput, RosterService, ServiceError, ServiceResult, SqliteRosterService,
};

/// Minimal health-check API for linkage probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
