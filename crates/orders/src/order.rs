use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use woodshop_core::{ClientId, DomainError, DomainResult, EmployeeId, Entity, OrderId, ProductId};
use woodshop_events::Event;

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Accepted,
    InProduction,
    Done,
    Shipped,
    Closed,
    Cancelled,
}

impl OrderStatus {
    /// Explicit transition table; any edge not listed is illegal.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Accepted, InProduction)
                | (Accepted, Cancelled)
                | (InProduction, Done)
                | (InProduction, Cancelled)
                | (Done, Shipped)
                | (Shipped, Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Closed | OrderStatus::Cancelled)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            OrderStatus::Accepted => "accepted",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Done => "done",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Closed => "closed",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Order line: product, quantity, price locked at insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub qty: u64,
    /// Price in smallest currency unit, snapshotted when the line is first
    /// inserted. Never re-priced, even if the product price changes later.
    pub fixed_price: u64,
}

/// A client order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    client_id: ClientId,
    manager_id: EmployeeId,
    created_at: DateTime<Utc>,
    deadline: DateTime<Utc>,
    status: OrderStatus,
    lines: Vec<OrderLine>,
    total_amount: u64,
}

impl Order {
    pub fn new(
        id: OrderId,
        client_id: ClientId,
        manager_id: EmployeeId,
        created_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if deadline < created_at {
            return Err(DomainError::validation(
                "order deadline cannot precede its creation date",
            ));
        }
        Ok(Self {
            id,
            client_id,
            manager_id,
            created_at,
            deadline,
            status: OrderStatus::Accepted,
            lines: Vec::new(),
            total_amount: 0,
        })
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn manager_id(&self) -> EmployeeId {
        self.manager_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Invariant: Σ(line.qty × line.fixed_price), recomputed on every line
    /// mutation.
    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    /// Lines may only change while the order is accepted or in production.
    pub fn is_line_editable(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Accepted | OrderStatus::InProduction
        )
    }

    /// Find-or-create merge of an order line.
    ///
    /// Merge rules: quantities are summed; the fixed price is locked at first
    /// insertion and never overwritten. Returns the line's new quantity.
    pub fn upsert_line(
        &mut self,
        product_id: ProductId,
        qty: u64,
        current_price: u64,
    ) -> DomainResult<u64> {
        if qty == 0 {
            return Err(DomainError::validation("line quantity must be at least 1"));
        }
        if !self.is_line_editable() {
            return Err(DomainError::invalid_state(format!(
                "cannot edit lines of an order in status {}",
                self.status
            )));
        }

        let line_qty = match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.qty = line
                    .qty
                    .checked_add(qty)
                    .ok_or_else(|| DomainError::validation("line quantity overflow"))?;
                line.qty
            }
            None => {
                self.lines.push(OrderLine {
                    product_id,
                    qty,
                    fixed_price: current_price,
                });
                qty
            }
        };

        self.recompute_total()?;
        Ok(line_qty)
    }

    fn recompute_total(&mut self) -> DomainResult<()> {
        let mut total: u64 = 0;
        for line in &self.lines {
            let line_total = line
                .qty
                .checked_mul(line.fixed_price)
                .ok_or_else(|| DomainError::validation("order total overflow"))?;
            total = total
                .checked_add(line_total)
                .ok_or_else(|| DomainError::validation("order total overflow"))?;
        }
        self.total_amount = total;
        Ok(())
    }

    /// Guarded forward transition; any edge not in the table is rejected.
    pub fn advance_to(&mut self, new_status: OrderStatus) -> DomainResult<()> {
        if !self.status.can_transition(new_status) {
            return Err(DomainError::invalid_transition(
                "order",
                self.status.to_string(),
                new_status.to_string(),
            ));
        }
        self.status = new_status;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Event: OrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: OrderId,
    pub client_id: ClientId,
    pub manager_id: EmployeeId,
    pub deadline: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderLineUpserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineUpserted {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub qty_added: u64,
    pub line_qty: u64,
    pub fixed_price: u64,
    pub total_amount: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderStatusAdvanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusAdvanced {
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderCreated(OrderCreated),
    OrderLineUpserted(OrderLineUpserted),
    OrderStatusAdvanced(OrderStatusAdvanced),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderCreated(_) => "orders.order.created",
            OrderEvent::OrderLineUpserted(_) => "orders.order.line_upserted",
            OrderEvent::OrderStatusAdvanced(_) => "orders.order.status_advanced",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderCreated(e) => e.occurred_at,
            OrderEvent::OrderLineUpserted(e) => e.occurred_at,
            OrderEvent::OrderStatusAdvanced(e) => e.occurred_at,
        }
    }
}
