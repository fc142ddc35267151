//! Side-effect-free read models over the plant state.

use chrono::{DateTime, Utc};
use serde::Serialize;

use woodshop_catalog::Catalog;
use woodshop_core::{
    ClientId, ComponentId, EmployeeId, Entity, MaterialId, OrderId, ProductId, TaskId,
};
use woodshop_inventory::StockLedger;
use woodshop_orders::{Order, OrderStatus};
use woodshop_production::{ProductionTask, TaskStatus};

use crate::state::PlantState;

/// One stock counter joined with its catalog name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevel<Id> {
    pub id: Id,
    pub name: String,
    pub qty: u64,
}

/// Snapshot of every stock counter, sorted by name for stable display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevels {
    pub materials: Vec<StockLevel<MaterialId>>,
    pub components: Vec<StockLevel<ComponentId>>,
    pub products: Vec<StockLevel<ProductId>>,
}

impl StockLevels {
    pub(crate) fn collect(catalog: &Catalog, ledger: &StockLedger) -> Self {
        let mut materials: Vec<_> = ledger
            .material_levels()
            .map(|(id, qty)| StockLevel {
                id,
                name: catalog
                    .material(id)
                    .map(|m| m.name().to_string())
                    .unwrap_or_default(),
                qty,
            })
            .collect();
        materials.sort_by(|a, b| a.name.cmp(&b.name));

        let mut components: Vec<_> = ledger
            .component_levels()
            .map(|(id, qty)| StockLevel {
                id,
                name: catalog
                    .component(id)
                    .map(|c| c.name().to_string())
                    .unwrap_or_default(),
                qty,
            })
            .collect();
        components.sort_by(|a, b| a.name.cmp(&b.name));

        let mut products: Vec<_> = ledger
            .product_levels()
            .map(|(id, qty)| StockLevel {
                id,
                name: catalog
                    .product(id)
                    .map(|p| p.name().to_string())
                    .unwrap_or_default(),
                qty,
            })
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            materials,
            components,
            products,
        }
    }
}

/// One production task as shown on the shop-floor board.
///
/// `overdue` is derived from the caller's clock, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub task_id: TaskId,
    pub order_id: OrderId,
    pub component_id: ComponentId,
    pub component_name: String,
    pub planned_qty: u64,
    pub actual_qty: u64,
    pub status: TaskStatus,
    pub deadline: DateTime<Utc>,
    pub assigned_worker: Option<EmployeeId>,
    pub overdue: bool,
}

impl TaskView {
    pub(crate) fn from_task(task: &ProductionTask, catalog: &Catalog, now: DateTime<Utc>) -> Self {
        Self {
            task_id: *task.id(),
            order_id: task.order_id(),
            component_id: task.component_id(),
            component_name: catalog
                .component(task.component_id())
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            planned_qty: task.planned_qty(),
            actual_qty: task.actual_qty(),
            status: task.status(),
            deadline: task.deadline(),
            assigned_worker: task.assigned_worker(),
            overdue: task.is_overdue(now),
        }
    }
}

/// One order line joined with its product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLineView {
    pub product_id: ProductId,
    pub product_name: String,
    pub qty: u64,
    pub fixed_price: u64,
    pub line_total: u64,
}

/// Snapshot of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub client_id: ClientId,
    pub client_name: String,
    pub manager_name: String,
    pub status: OrderStatus,
    pub deadline: DateTime<Utc>,
    pub total_amount: u64,
    pub lines: Vec<OrderLineView>,
    pub outstanding_tasks: usize,
}

impl OrderSummary {
    pub(crate) fn collect(order: &Order, state: &PlantState) -> Self {
        let lines = order
            .lines()
            .iter()
            .map(|line| OrderLineView {
                product_id: line.product_id,
                product_name: state
                    .catalog
                    .product(line.product_id)
                    .map(|p| p.name().to_string())
                    .unwrap_or_default(),
                qty: line.qty,
                fixed_price: line.fixed_price,
                line_total: line.qty.saturating_mul(line.fixed_price),
            })
            .collect();

        let outstanding_tasks = state
            .open_tasks
            .keys()
            .filter(|(order_id, _)| order_id == order.id())
            .count();

        Self {
            order_id: *order.id(),
            client_id: order.client_id(),
            client_name: state
                .clients
                .get(&order.client_id())
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            manager_name: state
                .employees
                .get(&order.manager_id())
                .map(|e| e.name().to_string())
                .unwrap_or_default(),
            status: order.status(),
            deadline: order.deadline(),
            total_amount: order.total_amount(),
            lines,
            outstanding_tasks,
        }
    }
}
