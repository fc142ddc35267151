use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use woodshop_catalog::{Component, ComponentRequirement, Material, MaterialRequirement, Product};
use woodshop_core::{
    ClientId, ComponentId, DomainError, DomainResult, EmployeeId, MaterialId, OrderId, ProductId,
    PurchaseId, TaskId,
};
use woodshop_events::{Event, InMemoryAuditLog, RecordedEvent};
use woodshop_orders::{
    Order, OrderCreated, OrderEvent, OrderLineUpserted, OrderStatus, OrderStatusAdvanced,
};
use woodshop_parties::{Client, Employee, EmployeeRole};
use woodshop_production::{
    ProductionTask, TaskClaimed, TaskCompleted, TaskEvent, TaskPlanned, TaskProgressReported,
    TaskReleased, TaskWorkerAssigned,
};
use woodshop_purchasing::{
    Purchase, PurchaseCancelled, PurchaseConfirmed, PurchaseCreated, PurchaseEvent,
    PurchaseLineAdded,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::state::PlantState;

/// Result of adding an order line.
///
/// A shortfall is a warning, not an error: the line is inserted, available
/// product stock is consumed, and the remainder is scheduled as production
/// tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Every requested unit came from finished product stock.
    Fulfilled { consumed: u64 },
    /// Stock covered only part of the request; the rest was scheduled.
    Shortfall {
        consumed: u64,
        shortfall: u64,
        task_ids: Vec<TaskId>,
    },
}

/// The production engine.
///
/// Owns all plant state behind one `RwLock`; every mutating operation takes
/// the write lock for its whole span, so each call is one serializable
/// transaction. Committed operations append to the audit trail.
#[derive(Debug, Default)]
pub struct ProductionEngine {
    state: RwLock<PlantState>,
    audit: InMemoryAuditLog,
    config: EngineConfig,
}

impl ProductionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: RwLock::new(PlantState::default()),
            audit: InMemoryAuditLog::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn write_state(&self) -> EngineResult<RwLockWriteGuard<'_, PlantState>> {
        self.state
            .write()
            .map_err(|_| EngineError::Store("plant state lock poisoned".into()))
    }

    fn read_state(&self) -> EngineResult<RwLockReadGuard<'_, PlantState>> {
        self.state
            .read()
            .map_err(|_| EngineError::Store("plant state lock poisoned".into()))
    }

    fn record<E>(&self, event: &E) -> EngineResult<()>
    where
        E: Event + Serialize,
    {
        let record = RecordedEvent::from_typed(Uuid::now_v7(), event)
            .map_err(|err| EngineError::Store(format!("audit serialization failed: {err}")))?;
        self.audit
            .record(record)
            .map_err(|err| EngineError::Store(err.to_string()))
    }

    fn ensure_role(employee: &Employee, role: EmployeeRole, action: &str) -> DomainResult<()> {
        if employee.role() != role {
            return Err(DomainError::invalid_state(format!(
                "employee '{}' must be a {role} to {action}",
                employee.name()
            )));
        }
        Ok(())
    }

    // ----- registration -----

    pub fn register_material(
        &self,
        name: impl Into<String>,
        unit: impl Into<String>,
        initial_stock: u64,
    ) -> EngineResult<MaterialId> {
        let mut state = self.write_state()?;
        let id = MaterialId::new();
        let material = Material::new(id, name, unit)?;
        state.catalog.insert_material(material);
        state.ledger.register_material(id, initial_stock);
        Ok(id)
    }

    pub fn register_component(
        &self,
        name: impl Into<String>,
        bom: Vec<MaterialRequirement>,
        initial_stock: u64,
    ) -> EngineResult<ComponentId> {
        let mut state = self.write_state()?;
        for row in &bom {
            if state.catalog.material(row.material_id).is_none() {
                return Err(DomainError::unknown_entity(format!(
                    "material {}",
                    row.material_id
                ))
                .into());
            }
        }
        let id = ComponentId::new();
        let component = Component::new(id, name, bom)?;
        state.catalog.insert_component(component);
        state.ledger.register_component(id, initial_stock);
        Ok(id)
    }

    pub fn register_product(
        &self,
        name: impl Into<String>,
        price: u64,
        bom: Vec<ComponentRequirement>,
        initial_stock: u64,
    ) -> EngineResult<ProductId> {
        let mut state = self.write_state()?;
        for row in &bom {
            if state.catalog.component(row.component_id).is_none() {
                return Err(DomainError::unknown_entity(format!(
                    "component {}",
                    row.component_id
                ))
                .into());
            }
        }
        let id = ProductId::new();
        let product = Product::new(id, name, price, bom)?;
        state.catalog.insert_product(product);
        state.ledger.register_product(id, initial_stock);
        Ok(id)
    }

    pub fn register_client(
        &self,
        name: impl Into<String>,
        phone: Option<String>,
    ) -> EngineResult<ClientId> {
        let mut state = self.write_state()?;
        let id = ClientId::new();
        let client = Client::new(id, name, phone)?;
        state.clients.insert(id, client);
        Ok(id)
    }

    pub fn register_employee(
        &self,
        name: impl Into<String>,
        role: EmployeeRole,
    ) -> EngineResult<EmployeeId> {
        let mut state = self.write_state()?;
        let id = EmployeeId::new();
        let employee = Employee::new(id, name, role)?;
        state.employees.insert(id, employee);
        Ok(id)
    }

    // ----- catalog maintenance -----

    /// Re-price a product. Lines already on orders keep their locked price;
    /// only lines inserted after this call see the new one.
    pub fn update_product_price(&self, product_id: ProductId, new_price: u64) -> EngineResult<()> {
        let mut state = self.write_state()?;
        let product = state
            .catalog
            .product_mut(product_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("product {product_id}")))?;
        product.set_price(new_price)?;
        tracing::info!(%product_id, new_price, "product re-priced");
        Ok(())
    }

    /// Insert or replace one row of a product's BOM. Outstanding tasks keep
    /// their planned quantities; only future shortfall resolution sees the
    /// change.
    pub fn set_product_bom_row(
        &self,
        product_id: ProductId,
        component_id: ComponentId,
        qty_per_unit: f64,
    ) -> EngineResult<()> {
        let mut state = self.write_state()?;
        if state.catalog.component(component_id).is_none() {
            return Err(DomainError::unknown_entity(format!("component {component_id}")).into());
        }
        let row = ComponentRequirement::new(component_id, qty_per_unit)?;
        let product = state
            .catalog
            .product_mut(product_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("product {product_id}")))?;
        product.upsert_bom_row(row);
        tracing::info!(%product_id, %component_id, qty_per_unit, "product BOM row set");
        Ok(())
    }

    /// Remove one row of a product's BOM. A product left with an empty BOM
    /// is bought finished.
    pub fn remove_product_bom_row(
        &self,
        product_id: ProductId,
        component_id: ComponentId,
    ) -> EngineResult<()> {
        let mut state = self.write_state()?;
        let product = state
            .catalog
            .product_mut(product_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("product {product_id}")))?;
        product.remove_bom_row(component_id)?;
        tracing::info!(%product_id, %component_id, "product BOM row removed");
        Ok(())
    }

    /// Insert or replace one row of a component's BOM. Already-claimed tasks
    /// are unaffected; only future claims consume at the new rate.
    pub fn set_component_bom_row(
        &self,
        component_id: ComponentId,
        material_id: MaterialId,
        qty_per_unit: f64,
    ) -> EngineResult<()> {
        let mut state = self.write_state()?;
        if state.catalog.material(material_id).is_none() {
            return Err(DomainError::unknown_entity(format!("material {material_id}")).into());
        }
        let row = MaterialRequirement::new(material_id, qty_per_unit)?;
        let component = state
            .catalog
            .component_mut(component_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("component {component_id}")))?;
        component.upsert_bom_row(row);
        tracing::info!(%component_id, %material_id, qty_per_unit, "component BOM row set");
        Ok(())
    }

    // ----- orders -----

    pub fn create_order(
        &self,
        client_id: ClientId,
        manager_id: EmployeeId,
        deadline: DateTime<Utc>,
    ) -> EngineResult<OrderId> {
        let mut state = self.write_state()?;
        state.client(client_id)?;
        let manager = state.employee(manager_id)?;
        Self::ensure_role(manager, EmployeeRole::Manager, "create orders")?;

        let now = Utc::now();
        let order_id = OrderId::new();
        let order = Order::new(order_id, client_id, manager_id, now, deadline)?;
        state.orders.insert(order_id, order);

        self.record(&OrderEvent::OrderCreated(OrderCreated {
            order_id,
            client_id,
            manager_id,
            deadline,
            occurred_at: now,
        }))?;
        tracing::info!(%order_id, %client_id, "order created");
        Ok(order_id)
    }

    /// Add (or extend) an order line and resolve it against stock.
    ///
    /// One transaction: line upsert, product stock draw-down, shortfall
    /// explosion into production tasks, order total recomputation.
    pub fn add_order_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        qty: u64,
    ) -> EngineResult<LineOutcome> {
        let mut state = self.write_state()?;
        let price = state
            .catalog
            .product(product_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("product {product_id}")))?
            .price();
        state.ledger.product_stock(product_id)?;

        let order = state.order_mut(order_id)?;
        let order_deadline = order.deadline();
        let line_qty = order.upsert_line(product_id, qty, price)?;
        let total_amount = order.total_amount();

        let consumed = state.ledger.consume_product_up_to(product_id, qty)?;
        let shortfall = qty - consumed;

        let now = Utc::now();
        let mut planned_tasks = Vec::new();
        if shortfall > 0 {
            let task_deadline = self.config.task_deadline(order_deadline);
            let requirements = state.catalog.required_components(product_id, shortfall)?;
            for (component_id, required) in requirements {
                let (task_id, planned_qty) =
                    Self::upsert_task(&mut state, order_id, component_id, required, task_deadline)?;
                planned_tasks.push((task_id, component_id, planned_qty, task_deadline));
            }
        }

        self.record(&OrderEvent::OrderLineUpserted(OrderLineUpserted {
            order_id,
            product_id,
            qty_added: qty,
            line_qty,
            fixed_price: price,
            total_amount,
            occurred_at: now,
        }))?;
        for (task_id, component_id, planned_qty, deadline) in &planned_tasks {
            self.record(&TaskEvent::TaskPlanned(TaskPlanned {
                task_id: *task_id,
                order_id,
                component_id: *component_id,
                planned_qty: *planned_qty,
                deadline: *deadline,
                occurred_at: now,
            }))?;
        }

        if shortfall > 0 {
            let task_ids: Vec<TaskId> = planned_tasks.iter().map(|(id, ..)| *id).collect();
            tracing::warn!(
                %order_id, %product_id, qty, consumed, shortfall,
                tasks = task_ids.len(),
                "insufficient product stock, shortfall scheduled for production"
            );
            Ok(LineOutcome::Shortfall {
                consumed,
                shortfall,
                task_ids,
            })
        } else {
            tracing::info!(%order_id, %product_id, qty, "order line fulfilled from stock");
            Ok(LineOutcome::Fulfilled { consumed })
        }
    }

    pub fn advance_order_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
    ) -> EngineResult<()> {
        let mut state = self.write_state()?;
        let order = state.order_mut(order_id)?;
        let from = order.status();
        order.advance_to(new_status)?;

        self.record(&OrderEvent::OrderStatusAdvanced(OrderStatusAdvanced {
            order_id,
            from,
            to: new_status,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%order_id, %from, %new_status, "order status advanced");
        Ok(())
    }

    // ----- production tasks -----

    /// Merge into the outstanding task for (order, component) or open a new
    /// one. Returns the task id and its resulting planned quantity.
    fn upsert_task(
        state: &mut PlantState,
        order_id: OrderId,
        component_id: ComponentId,
        qty: u64,
        deadline: DateTime<Utc>,
    ) -> DomainResult<(TaskId, u64)> {
        if let Some(&task_id) = state.open_tasks.get(&(order_id, component_id)) {
            let task = state.task_mut(task_id)?;
            let planned_qty = task.merge_planned(qty, deadline)?;
            Ok((task_id, planned_qty))
        } else {
            let task_id = TaskId::new();
            let task = ProductionTask::new(task_id, order_id, component_id, qty, deadline)?;
            state.tasks.insert(task_id, task);
            state.open_tasks.insert((order_id, component_id), task_id);
            Ok((task_id, qty))
        }
    }

    /// Explicit escape hatch: schedule component production for an order
    /// outside of shortfall resolution.
    pub fn add_manual_task(
        &self,
        order_id: OrderId,
        component_id: ComponentId,
        qty: u64,
        deadline: Option<DateTime<Utc>>,
    ) -> EngineResult<TaskId> {
        let mut state = self.write_state()?;
        if state.catalog.component(component_id).is_none() {
            return Err(DomainError::unknown_entity(format!("component {component_id}")).into());
        }
        let order = state.order(order_id)?;
        if !order.is_line_editable() {
            return Err(DomainError::invalid_state(format!(
                "cannot schedule production for an order in status {}",
                order.status()
            ))
            .into());
        }
        let deadline = deadline.unwrap_or_else(|| self.config.task_deadline(order.deadline()));

        let (task_id, planned_qty) =
            Self::upsert_task(&mut state, order_id, component_id, qty, deadline)?;

        self.record(&TaskEvent::TaskPlanned(TaskPlanned {
            task_id,
            order_id,
            component_id,
            planned_qty,
            deadline,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%task_id, %order_id, %component_id, qty, "manual production task scheduled");
        Ok(task_id)
    }

    /// Manager pre-assignment of an open task; claiming is then restricted
    /// to that worker. No materials move.
    pub fn assign_worker(&self, task_id: TaskId, worker_id: EmployeeId) -> EngineResult<()> {
        let mut state = self.write_state()?;
        let worker = state.employee(worker_id)?;
        Self::ensure_role(worker, EmployeeRole::Assembler, "be assigned production tasks")?;
        state.task_mut(task_id)?.assign(worker_id)?;

        self.record(&TaskEvent::TaskWorkerAssigned(TaskWorkerAssigned {
            task_id,
            worker_id,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%task_id, %worker_id, "task pre-assigned");
        Ok(())
    }

    /// Claim an open task, consuming its full material requirement
    /// all-or-nothing. At most one claimant wins; losers observe
    /// `AlreadyClaimed`.
    pub fn claim_task(&self, task_id: TaskId, worker_id: EmployeeId) -> EngineResult<()> {
        let mut state = self.write_state()?;
        let worker = state.employee(worker_id)?;
        Self::ensure_role(worker, EmployeeRole::Assembler, "claim production tasks")?;

        let task = state.task(task_id)?;
        task.ensure_claimable(worker_id)?;
        let component_id = task.component_id();
        let planned_qty = task.planned_qty();

        // Every precondition holds; consume first so a short material leaves
        // the task untouched, then flip the status.
        let requirements = state.catalog.required_materials(component_id, planned_qty)?;
        state.ledger.try_consume_materials(&requirements)?;
        state.task_mut(task_id)?.claim(worker_id)?;

        self.record(&TaskEvent::TaskClaimed(TaskClaimed {
            task_id,
            worker_id,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%task_id, %worker_id, planned_qty, "task claimed, materials consumed");
        Ok(())
    }

    /// Record delivered units against a claimed task. Finished component
    /// stock is credited immediately. Returns true when the task completed.
    pub fn report_progress(
        &self,
        task_id: TaskId,
        worker_id: EmployeeId,
        delivered_qty: u64,
    ) -> EngineResult<bool> {
        let mut state = self.write_state()?;
        state.employee(worker_id)?;

        let task = state.task_mut(task_id)?;
        let completed = task.record_progress(worker_id, delivered_qty)?;
        let order_id = task.order_id();
        let component_id = task.component_id();
        let actual_qty = task.actual_qty();
        let planned_qty = task.planned_qty();

        state.ledger.credit_component(component_id, delivered_qty)?;
        if completed {
            state.open_tasks.remove(&(order_id, component_id));
        }

        let now = Utc::now();
        self.record(&TaskEvent::TaskProgressReported(TaskProgressReported {
            task_id,
            worker_id,
            delivered_qty,
            actual_qty,
            occurred_at: now,
        }))?;
        if completed {
            self.record(&TaskEvent::TaskCompleted(TaskCompleted {
                task_id,
                component_id,
                planned_qty,
                occurred_at: now,
            }))?;
            tracing::info!(%task_id, %component_id, planned_qty, "task completed");
        } else {
            tracing::info!(%task_id, delivered_qty, actual_qty, planned_qty, "task progress recorded");
        }
        Ok(completed)
    }

    /// Manager override: reopen a claimed task. Materials consumed at claim
    /// time are not refunded.
    pub fn release_task(&self, task_id: TaskId) -> EngineResult<()> {
        let mut state = self.write_state()?;
        state.task_mut(task_id)?.release()?;

        self.record(&TaskEvent::TaskReleased(TaskReleased {
            task_id,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%task_id, "task released back to open");
        Ok(())
    }

    // ----- purchasing -----

    pub fn create_purchase(&self, supplier: impl Into<String>) -> EngineResult<PurchaseId> {
        let mut state = self.write_state()?;
        let now = Utc::now();
        let purchase_id = PurchaseId::new();
        let purchase = Purchase::new(purchase_id, supplier, now)?;
        let supplier_name = purchase.supplier().to_string();
        state.purchases.insert(purchase_id, purchase);

        self.record(&PurchaseEvent::PurchaseCreated(PurchaseCreated {
            purchase_id,
            supplier: supplier_name,
            occurred_at: now,
        }))?;
        Ok(purchase_id)
    }

    pub fn add_purchase_line(
        &self,
        purchase_id: PurchaseId,
        material_id: MaterialId,
        qty: u64,
        unit_price: u64,
    ) -> EngineResult<()> {
        let mut state = self.write_state()?;
        if state.catalog.material(material_id).is_none() {
            return Err(DomainError::unknown_entity(format!("material {material_id}")).into());
        }
        let purchase = state.purchase_mut(purchase_id)?;
        let line_qty = purchase.add_line(material_id, qty, unit_price)?;

        self.record(&PurchaseEvent::PurchaseLineAdded(PurchaseLineAdded {
            purchase_id,
            material_id,
            qty_added: qty,
            line_qty,
            unit_price,
            occurred_at: Utc::now(),
        }))?;
        Ok(())
    }

    /// Confirm receipt of a supplier order, crediting every line's material
    /// stock in the same transaction.
    pub fn confirm_purchase(&self, purchase_id: PurchaseId) -> EngineResult<()> {
        let mut state = self.write_state()?;
        let purchase = state.purchase_mut(purchase_id)?;
        purchase.ensure_confirmable()?;
        let credits: Vec<(MaterialId, u64)> = purchase
            .lines()
            .iter()
            .map(|line| (line.material_id, line.qty))
            .collect();

        state.ledger.credit_materials(&credits)?;
        state.purchase_mut(purchase_id)?.confirm()?;

        self.record(&PurchaseEvent::PurchaseConfirmed(PurchaseConfirmed {
            purchase_id,
            credited: credits.clone(),
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%purchase_id, lines = credits.len(), "purchase confirmed, stock credited");
        Ok(())
    }

    pub fn cancel_purchase(&self, purchase_id: PurchaseId) -> EngineResult<()> {
        let mut state = self.write_state()?;
        state.purchase_mut(purchase_id)?.cancel()?;

        self.record(&PurchaseEvent::PurchaseCancelled(PurchaseCancelled {
            purchase_id,
            occurred_at: Utc::now(),
        }))?;
        tracing::info!(%purchase_id, "purchase cancelled");
        Ok(())
    }

    // ----- read projections -----

    /// Current stock levels, joined with catalog names, sorted by name.
    pub fn stock_levels(&self) -> EngineResult<crate::projections::StockLevels> {
        let state = self.read_state()?;
        Ok(crate::projections::StockLevels::collect(
            &state.catalog,
            &state.ledger,
        ))
    }

    /// Every production task with its derived overdue flag, sorted by
    /// deadline.
    pub fn task_views(&self, now: DateTime<Utc>) -> EngineResult<Vec<crate::projections::TaskView>> {
        let state = self.read_state()?;
        let mut views: Vec<_> = state
            .tasks
            .values()
            .map(|task| crate::projections::TaskView::from_task(task, &state.catalog, now))
            .collect();
        views.sort_by_key(|view| view.deadline);
        Ok(views)
    }

    /// Snapshot of one order: header, lines with product names, outstanding
    /// task count.
    pub fn order_summary(&self, order_id: OrderId) -> EngineResult<crate::projections::OrderSummary> {
        let state = self.read_state()?;
        let order = state.order(order_id)?;
        Ok(crate::projections::OrderSummary::collect(order, &state))
    }

    /// Point-in-time copy of the audit trail, in commit order.
    pub fn audit_trail(&self) -> Vec<RecordedEvent> {
        self.audit.snapshot()
    }
}
