use thiserror::Error;

use woodshop_core::DomainError;

pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error: a business failure or an infrastructure fault.
///
/// `Store` covers faults of the state container itself (poisoned lock,
/// audit serialization). Callers must not assume partial effects on `Store`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("state store failure: {0}")]
    Store(String),
}

impl EngineError {
    /// The domain failure inside, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            EngineError::Domain(err) => Some(err),
            EngineError::Store(_) => None,
        }
    }
}
