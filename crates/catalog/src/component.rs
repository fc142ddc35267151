use serde::{Deserialize, Serialize};

use woodshop_core::{ComponentId, DomainError, DomainResult, Entity, MaterialId};

/// One BOM row of a component: how much of a material goes into one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub material_id: MaterialId,
    /// Per-unit consumption. May be fractional (e.g. 0.5 m of trim per unit);
    /// total requirements are rounded up so under-production never occurs.
    pub qty_per_unit: f64,
}

impl MaterialRequirement {
    pub fn new(material_id: MaterialId, qty_per_unit: f64) -> DomainResult<Self> {
        if !qty_per_unit.is_finite() || qty_per_unit <= 0.0 {
            return Err(DomainError::validation(
                "qty_per_unit must be a positive, finite number",
            ));
        }
        Ok(Self {
            material_id,
            qty_per_unit,
        })
    }
}

/// A component (finished subassembly).
///
/// Built from raw materials by production tasks; components with an empty BOM
/// are bought finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    id: ComponentId,
    name: String,
    bom: Vec<MaterialRequirement>,
}

impl Component {
    pub fn new(
        id: ComponentId,
        name: impl Into<String>,
        bom: Vec<MaterialRequirement>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("component name cannot be empty"));
        }
        let mut seen = Vec::with_capacity(bom.len());
        for row in &bom {
            if seen.contains(&row.material_id) {
                return Err(DomainError::validation(format!(
                    "duplicate BOM row for material {}",
                    row.material_id
                )));
            }
            seen.push(row.material_id);
        }
        Ok(Self { id, name, bom })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered BOM rows (empty means bought finished).
    pub fn bom(&self) -> &[MaterialRequirement] {
        &self.bom
    }

    /// Insert or replace the BOM row for the row's material.
    pub fn upsert_bom_row(&mut self, row: MaterialRequirement) {
        match self
            .bom
            .iter_mut()
            .find(|existing| existing.material_id == row.material_id)
        {
            Some(existing) => *existing = row,
            None => self.bom.push(row),
        }
    }
}

impl Entity for Component {
    type Id = ComponentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
