use serde::{Deserialize, Serialize};

use woodshop_core::{DomainError, DomainResult, Entity, MaterialId};

/// A raw material: the leaf of the BOM tree.
///
/// Replenished by purchase confirmation, consumed when a production task is
/// claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    id: MaterialId,
    name: String,
    /// Unit of measure, free-form (e.g. "pcs", "m", "m²").
    unit: String,
}

impl Material {
    pub fn new(
        id: MaterialId,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("material name cannot be empty"));
        }
        let unit = unit.into();
        if unit.trim().is_empty() {
            return Err(DomainError::validation("material unit cannot be empty"));
        }
        Ok(Self { id, name, unit })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
