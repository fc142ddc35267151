use serde::{Deserialize, Serialize};

use woodshop_core::{ComponentId, DomainError, DomainResult, Entity, ProductId};

/// One BOM row of a product: how much of a component goes into one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentRequirement {
    pub component_id: ComponentId,
    /// Per-unit consumption; totals are rounded up (never under-produce).
    pub qty_per_unit: f64,
}

impl ComponentRequirement {
    pub fn new(component_id: ComponentId, qty_per_unit: f64) -> DomainResult<Self> {
        if !qty_per_unit.is_finite() || qty_per_unit <= 0.0 {
            return Err(DomainError::validation(
                "qty_per_unit must be a positive, finite number",
            ));
        }
        Ok(Self {
            component_id,
            qty_per_unit,
        })
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    /// Price in smallest currency unit (e.g., cents). Snapshotted into order
    /// lines at insertion time.
    price: u64,
    bom: Vec<ComponentRequirement>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: u64,
        bom: Vec<ComponentRequirement>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if price == 0 {
            return Err(DomainError::validation("product price must be positive"));
        }
        let mut seen = Vec::with_capacity(bom.len());
        for row in &bom {
            if seen.contains(&row.component_id) {
                return Err(DomainError::validation(format!(
                    "duplicate BOM row for component {}",
                    row.component_id
                )));
            }
            seen.push(row.component_id);
        }
        Ok(Self {
            id,
            name,
            price,
            bom,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    /// Re-price the product. Existing order lines keep the price that was
    /// snapshotted when they were inserted; only future lines see this.
    pub fn set_price(&mut self, price: u64) -> DomainResult<()> {
        if price == 0 {
            return Err(DomainError::validation("product price must be positive"));
        }
        self.price = price;
        Ok(())
    }

    /// Ordered BOM rows (empty means bought finished).
    pub fn bom(&self) -> &[ComponentRequirement] {
        &self.bom
    }

    /// Insert or replace the BOM row for the row's component.
    pub fn upsert_bom_row(&mut self, row: ComponentRequirement) {
        match self
            .bom
            .iter_mut()
            .find(|existing| existing.component_id == row.component_id)
        {
            Some(existing) => *existing = row,
            None => self.bom.push(row),
        }
    }

    /// Remove the BOM row for a component.
    pub fn remove_bom_row(&mut self, component_id: ComponentId) -> DomainResult<()> {
        let before = self.bom.len();
        self.bom.retain(|row| row.component_id != component_id);
        if self.bom.len() == before {
            return Err(DomainError::unknown_entity(format!(
                "BOM row for component {component_id}"
            )));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
