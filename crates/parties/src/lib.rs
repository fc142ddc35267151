//! Parties reference data (clients and employees).
//!
//! Pure records consumed by orders and the task scheduler. No HR logic,
//! no schedules, no authentication; those live outside the engine.

pub mod party;

pub use party::{Client, Employee, EmployeeRole};
