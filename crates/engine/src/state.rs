use std::collections::HashMap;

use woodshop_catalog::Catalog;
use woodshop_core::{
    ClientId, ComponentId, DomainError, DomainResult, EmployeeId, OrderId, PurchaseId, TaskId,
};
use woodshop_inventory::StockLedger;
use woodshop_orders::Order;
use woodshop_parties::{Client, Employee};
use woodshop_production::ProductionTask;
use woodshop_purchasing::Purchase;

/// Everything the engine owns, guarded as one unit.
///
/// `open_tasks` is the uniqueness index for outstanding (open or claimed)
/// tasks: at most one per (order, component). Entries are removed when the
/// task completes, so a later shortfall for the same pair starts a new task.
#[derive(Debug, Default)]
pub struct PlantState {
    pub(crate) catalog: Catalog,
    pub(crate) ledger: StockLedger,
    pub(crate) clients: HashMap<ClientId, Client>,
    pub(crate) employees: HashMap<EmployeeId, Employee>,
    pub(crate) orders: HashMap<OrderId, Order>,
    pub(crate) tasks: HashMap<TaskId, ProductionTask>,
    pub(crate) open_tasks: HashMap<(OrderId, ComponentId), TaskId>,
    pub(crate) purchases: HashMap<PurchaseId, Purchase>,
}

impl PlantState {
    pub(crate) fn client(&self, id: ClientId) -> DomainResult<&Client> {
        self.clients
            .get(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("client {id}")))
    }

    pub(crate) fn employee(&self, id: EmployeeId) -> DomainResult<&Employee> {
        self.employees
            .get(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("employee {id}")))
    }

    pub(crate) fn order(&self, id: OrderId) -> DomainResult<&Order> {
        self.orders
            .get(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("order {id}")))
    }

    pub(crate) fn order_mut(&mut self, id: OrderId) -> DomainResult<&mut Order> {
        self.orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("order {id}")))
    }

    pub(crate) fn task(&self, id: TaskId) -> DomainResult<&ProductionTask> {
        self.tasks
            .get(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("task {id}")))
    }

    pub(crate) fn task_mut(&mut self, id: TaskId) -> DomainResult<&mut ProductionTask> {
        self.tasks
            .get_mut(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("task {id}")))
    }

    pub(crate) fn purchase_mut(&mut self, id: PurchaseId) -> DomainResult<&mut Purchase> {
        self.purchases
            .get_mut(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("purchase {id}")))
    }
}
