//! In-memory append-only audit trail.

use std::sync::RwLock;

use thiserror::Error;

use crate::record::RecordedEvent;

#[derive(Debug, Error)]
pub enum AuditLogError {
    /// Recording failed due to internal lock poisoning.
    #[error("audit log lock poisoned")]
    Poisoned,
}

/// In-memory audit trail.
///
/// - No IO / no async
/// - Append-only; records are never mutated or removed
/// - Readers get a point-in-time snapshot
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<RecordedEvent>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one committed event.
    pub fn record(&self, event: RecordedEvent) -> Result<(), AuditLogError> {
        let mut entries = self.entries.write().map_err(|_| AuditLogError::Poisoned)?;
        entries.push(event);
        Ok(())
    }

    /// Append a batch of committed events in order.
    pub fn record_all(
        &self,
        events: impl IntoIterator<Item = RecordedEvent>,
    ) -> Result<(), AuditLogError> {
        let mut entries = self.entries.write().map_err(|_| AuditLogError::Poisoned)?;
        entries.extend(events);
        Ok(())
    }

    /// Point-in-time copy of the full trail, in append order.
    pub fn snapshot(&self) -> Vec<RecordedEvent> {
        self.entries
            .read()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
