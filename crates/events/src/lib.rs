//! Domain event trait and the in-memory audit trail.
//!
//! Entities that reach a terminal status stay readable through the events
//! recorded here; the engine records one batch per committed operation.

pub mod audit;
pub mod event;
pub mod record;

pub use audit::{AuditLogError, InMemoryAuditLog};
pub use event::Event;
pub use record::RecordedEvent;
