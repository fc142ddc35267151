//! Purchasing: supplier orders for raw materials and their
//! pending/confirmed/cancelled lifecycle.

pub mod purchase;

pub use purchase::{
    Purchase, PurchaseCancelled, PurchaseConfirmed, PurchaseCreated, PurchaseEvent,
    PurchaseLine, PurchaseLineAdded, PurchaseStatus,
};
