//! Domain error model.

use thiserror::Error;

use crate::id::MaterialId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Infrastructure
/// concerns (store unreachable, poisoned locks) belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// A value failed validation (e.g. zero quantity, empty name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation is not legal for the entity's current status.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An edge not listed in a status transition table.
    #[error("invalid transition for {entity}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// A referenced identifier is not registered.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Lost a claim race: the task is already owned by another worker.
    #[error("task is already claimed by another worker")]
    AlreadyClaimed,

    /// The task has already been completed.
    #[error("task is already done")]
    AlreadyDone,

    /// Reported progress would exceed the planned quantity.
    #[error("delivery of {delivered} exceeds plan ({actual}/{planned} already delivered)")]
    ExceedsPlan {
        planned: u64,
        actual: u64,
        delivered: u64,
    },

    /// A raw material is short; nothing was consumed (all-or-nothing).
    #[error("insufficient material {material_id}: required {required}, available {available}")]
    InsufficientMaterial {
        material_id: MaterialId,
        required: u64,
        available: u64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_transition(
        entity: &'static str,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn unknown_entity(msg: impl Into<String>) -> Self {
        Self::UnknownEntity(msg.into())
    }
}
