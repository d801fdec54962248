//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into caller-facing use cases.
//! - Keep callers decoupled from storage details.

pub mod roster_service;
