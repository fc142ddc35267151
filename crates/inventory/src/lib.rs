//! Stock ledger: authoritative counters for materials, components, products.
//!
//! All mutations are conditional and all-or-nothing; counters are unsigned,
//! so a negative balance is unrepresentable. The ledger has no interior
//! locking; the engine wraps every operation in one transaction.

pub mod ledger;

pub use ledger::StockLedger;
