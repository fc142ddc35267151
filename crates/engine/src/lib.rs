//! Orchestration layer: the production engine.
//!
//! All plant state lives behind one `RwLock`; every operation on the
//! [`ProductionEngine`] is a single serializable transaction. Committed
//! operations leave an audit trail; reads are side-effect-free projections.

pub mod config;
pub mod engine;
pub mod error;
pub mod projections;
pub mod state;


pub use config::EngineConfig;
pub use engine::{LineOutcome, ProductionEngine};
pub use error::{EngineError, EngineResult};
pub use projections::{OrderLineView, OrderSummary, StockLevel, StockLevels, TaskView};
