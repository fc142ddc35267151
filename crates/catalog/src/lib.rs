//! Catalog domain: materials, components, products and their bills of
//! materials, plus the pure BOM resolver.
//!
//! Stock quantities for all three live in the stock ledger
//! (`woodshop-inventory`); this crate only carries definitions.

pub mod catalog;
pub mod component;
pub mod material;
pub mod product;

pub use catalog::Catalog;
pub use component::{Component, MaterialRequirement};
pub use material::Material;
pub use product::{ComponentRequirement, Product};
