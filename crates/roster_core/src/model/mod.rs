//! Entity model for the employee roster.
//!
//! # Responsibility
//! - Define the in-memory shapes of departments, sports, employees and
//!   their owned addresses.
//!
//! # Invariants
//! - Identifiers are assigned by storage and never reused.
//! - Deletion is a soft-delete flag, never physical removal.
//! - Back-references (department/sport -> employees) are not embedded;
//!   stores resolve them on demand.

pub mod department;
pub mod employee;
pub mod sport;
