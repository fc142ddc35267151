//! Domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    ClientId, ComponentId, EmployeeId, MaterialId, OrderId, ProductId, PurchaseId, TaskId,
};
