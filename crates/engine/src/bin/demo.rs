//! Seeds a small plant and walks one order from intake to shipment.
//!
//! Run with `RUST_LOG=info cargo run --bin woodshop-demo`.

use anyhow::Result;
use chrono::{Duration, Utc};

use woodshop_catalog::{ComponentRequirement, MaterialRequirement};
use woodshop_engine::{EngineConfig, LineOutcome, ProductionEngine};
use woodshop_orders::OrderStatus;
use woodshop_parties::EmployeeRole;

fn main() -> Result<()> {
    woodshop_observability::init();

    let engine = ProductionEngine::new(EngineConfig::default());

    // Catalog: an oak chair made of 2 frames, each frame from 3 boards.
    let board = engine.register_material("oak board", "pcs", 20)?;
    let frame = engine.register_component(
        "chair frame",
        vec![MaterialRequirement::new(board, 3.0)?],
        0,
    )?;
    let chair = engine.register_product(
        "oak chair",
        12_000,
        vec![ComponentRequirement::new(frame, 2.0)?],
        1,
    )?;

    let client = engine.register_client("Nordwood Interiors", Some("+372 5555 0199".into()))?;
    let manager = engine.register_employee("Mira", EmployeeRole::Manager)?;
    let assembler = engine.register_employee("Tomas", EmployeeRole::Assembler)?;

    // Restock boards before production starts.
    let purchase = engine.create_purchase("Timberline OÜ")?;
    engine.add_purchase_line(purchase, board, 40, 250)?;
    engine.confirm_purchase(purchase)?;

    // Intake: 3 chairs, one on the shelf, two to build.
    let order = engine.create_order(client, manager, Utc::now() + Duration::days(14))?;
    let outcome = engine.add_order_item(order, chair, 3)?;

    engine.advance_order_status(order, OrderStatus::InProduction)?;
    if let LineOutcome::Shortfall { task_ids, .. } = outcome {
        for task_id in task_ids {
            engine.claim_task(task_id, assembler)?;
            let views = engine.task_views(Utc::now())?;
            let planned = views
                .iter()
                .find(|view| view.task_id == task_id)
                .map(|view| view.planned_qty)
                .unwrap_or_default();
            engine.report_progress(task_id, assembler, planned)?;
        }
    }
    engine.advance_order_status(order, OrderStatus::Done)?;
    engine.advance_order_status(order, OrderStatus::Shipped)?;
    engine.advance_order_status(order, OrderStatus::Closed)?;

    let summary = engine.order_summary(order)?;
    tracing::info!(
        order_id = %summary.order_id,
        client = %summary.client_name,
        status = ?summary.status,
        total = summary.total_amount,
        "order closed"
    );

    let stock = engine.stock_levels()?;
    for level in &stock.materials {
        tracing::info!(name = %level.name, qty = level.qty, "material stock");
    }
    for level in &stock.components {
        tracing::info!(name = %level.name, qty = level.qty, "component stock");
    }
    tracing::info!(events = engine.audit_trail().len(), "audit trail size");

    Ok(())
}
