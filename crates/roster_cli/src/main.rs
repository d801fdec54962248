//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured roster database and print a one-screen summary.
//! - Exit non-zero with a message instead of panicking on any failure.

use roster_core::{
    core_version, ping, DepartmentStore, EmployeeStore, RosterConfig, SportStore,
    SqliteDepartmentStore, SqliteEmployeeStore, SqliteSportStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("roster: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = RosterConfig::from_env();
    config.init_logging()?;

    let gateway = config
        .open_gateway()
        .map_err(|err| format!("failed to open database: {err}"))?;
    let schema_version = gateway.schema_version().map_err(|err| err.to_string())?;

    let departments = SqliteDepartmentStore::new(&gateway)
        .list_all()
        .map_err(|err| err.to_string())?;
    let sports = SqliteSportStore::new(&gateway)
        .list_all()
        .map_err(|err| err.to_string())?;
    let employees = SqliteEmployeeStore::new(&gateway)
        .list_all()
        .map_err(|err| err.to_string())?;

    println!("roster_core ping={}", ping());
    println!("roster_core version={}", core_version());
    match &config.db_path {
        Some(path) => println!("database={}", path.display()),
        None => println!("database=:memory:"),
    }
    println!("schema_version={schema_version}");
    println!("departments={}", departments.len());
    println!("sports={}", sports.len());
    println!("employees={}", employees.len());

    log::info!(
        "event=cli_summary module=cli status=ok departments={} sports={} employees={}",
        departments.len(),
        sports.len(),
        employees.len()
    );

    gateway.close().map_err(|err| err.to_string())
}
