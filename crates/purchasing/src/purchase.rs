use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use woodshop_core::{DomainError, DomainResult, Entity, MaterialId, PurchaseId};
use woodshop_events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl PurchaseStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PurchaseStatus::Confirmed | PurchaseStatus::Cancelled)
    }
}

impl core::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Confirmed => "confirmed",
            PurchaseStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// One material position on a supplier order. Unique per (purchase, material).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub material_id: MaterialId,
    pub qty: u64,
    /// Smallest currency unit, locked at first insertion.
    pub unit_price: u64,
}

/// A supplier order for raw materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    id: PurchaseId,
    supplier: String,
    ordered_at: DateTime<Utc>,
    status: PurchaseStatus,
    lines: Vec<PurchaseLine>,
}

impl Purchase {
    pub fn new(id: PurchaseId, supplier: impl Into<String>, ordered_at: DateTime<Utc>) -> DomainResult<Self> {
        let supplier = supplier.into();
        if supplier.trim().is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        Ok(Self {
            id,
            supplier,
            ordered_at,
            status: PurchaseStatus::Pending,
            lines: Vec::new(),
        })
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    pub fn status(&self) -> PurchaseStatus {
        self.status
    }

    pub fn lines(&self) -> &[PurchaseLine] {
        &self.lines
    }

    /// Find-or-create merge: same material sums quantity and keeps the price
    /// locked at first insertion.
    pub fn add_line(&mut self, material_id: MaterialId, qty: u64, unit_price: u64) -> DomainResult<u64> {
        if self.status != PurchaseStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "cannot add lines to a {} purchase",
                self.status
            )));
        }
        if qty == 0 {
            return Err(DomainError::validation("line quantity must be at least 1"));
        }
        if unit_price == 0 {
            return Err(DomainError::validation("unit price must be positive"));
        }

        match self.lines.iter_mut().find(|l| l.material_id == material_id) {
            Some(line) => {
                line.qty = line
                    .qty
                    .checked_add(qty)
                    .ok_or_else(|| DomainError::validation("line quantity overflow"))?;
                Ok(line.qty)
            }
            None => {
                self.lines.push(PurchaseLine {
                    material_id,
                    qty,
                    unit_price,
                });
                Ok(qty)
            }
        }
    }

    /// Checks every confirmation precondition without mutating, so callers
    /// can credit stock and flip the status in one atomic step.
    pub fn ensure_confirmable(&self) -> DomainResult<()> {
        if self.status != PurchaseStatus::Pending {
            return Err(DomainError::invalid_transition(
                "purchase",
                self.status.to_string(),
                PurchaseStatus::Confirmed.to_string(),
            ));
        }
        if self.lines.is_empty() {
            return Err(DomainError::invalid_state(
                "cannot confirm a purchase with no lines",
            ));
        }
        Ok(())
    }

    /// Marks the purchase received. The caller credits material stock in the
    /// same transaction; an empty purchase cannot be confirmed.
    pub fn confirm(&mut self) -> DomainResult<()> {
        self.ensure_confirmable()?;
        self.status = PurchaseStatus::Confirmed;
        Ok(())
    }

    /// Cancels a pending purchase. No stock effect.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status != PurchaseStatus::Pending {
            return Err(DomainError::invalid_transition(
                "purchase",
                self.status.to_string(),
                PurchaseStatus::Cancelled.to_string(),
            ));
        }
        self.status = PurchaseStatus::Cancelled;
        Ok(())
    }
}

impl Entity for Purchase {
    type Id = PurchaseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCreated {
    pub purchase_id: PurchaseId,
    pub supplier: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLineAdded {
    pub purchase_id: PurchaseId,
    pub material_id: MaterialId,
    pub qty_added: u64,
    pub line_qty: u64,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseConfirmed {
    pub purchase_id: PurchaseId,
    pub credited: Vec<(MaterialId, u64)>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseCancelled {
    pub purchase_id: PurchaseId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseEvent {
    PurchaseCreated(PurchaseCreated),
    PurchaseLineAdded(PurchaseLineAdded),
    PurchaseConfirmed(PurchaseConfirmed),
    PurchaseCancelled(PurchaseCancelled),
}

impl Event for PurchaseEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseEvent::PurchaseCreated(_) => "purchasing.purchase.created",
            PurchaseEvent::PurchaseLineAdded(_) => "purchasing.purchase.line_added",
            PurchaseEvent::PurchaseConfirmed(_) => "purchasing.purchase.confirmed",
            PurchaseEvent::PurchaseCancelled(_) => "purchasing.purchase.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PurchaseEvent::PurchaseCreated(e) => e.occurred_at,
            PurchaseEvent::PurchaseLineAdded(e) => e.occurred_at,
            PurchaseEvent::PurchaseConfirmed(e) => e.occurred_at,
            PurchaseEvent::PurchaseCancelled(e) => e.occurred_at,
        }
    }
}
