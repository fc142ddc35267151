use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use woodshop_core::{ComponentId, DomainError, DomainResult, MaterialId, ProductId};

/// Owned ledger of stock counters.
///
/// One entry per registered entity; lookups of unregistered ids are
/// `UnknownEntity`, not zero, so typos don't read as empty shelves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLedger {
    materials: HashMap<MaterialId, u64>,
    components: HashMap<ComponentId, u64>,
    products: HashMap<ProductId, u64>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_material(&mut self, id: MaterialId, initial: u64) {
        self.materials.entry(id).or_insert(initial);
    }

    pub fn register_component(&mut self, id: ComponentId, initial: u64) {
        self.components.entry(id).or_insert(initial);
    }

    pub fn register_product(&mut self, id: ProductId, initial: u64) {
        self.products.entry(id).or_insert(initial);
    }

    pub fn material_stock(&self, id: MaterialId) -> DomainResult<u64> {
        self.materials
            .get(&id)
            .copied()
            .ok_or_else(|| DomainError::unknown_entity(format!("material {id}")))
    }

    pub fn component_stock(&self, id: ComponentId) -> DomainResult<u64> {
        self.components
            .get(&id)
            .copied()
            .ok_or_else(|| DomainError::unknown_entity(format!("component {id}")))
    }

    pub fn product_stock(&self, id: ProductId) -> DomainResult<u64> {
        self.products
            .get(&id)
            .copied()
            .ok_or_else(|| DomainError::unknown_entity(format!("product {id}")))
    }

    /// Credit one material (purchase confirmation).
    pub fn credit_material(&mut self, id: MaterialId, qty: u64) -> DomainResult<u64> {
        let level = self
            .materials
            .get_mut(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("material {id}")))?;
        *level = level
            .checked_add(qty)
            .ok_or_else(|| DomainError::validation("material stock overflow"))?;
        Ok(*level)
    }

    /// Credit every listed material, all-or-nothing.
    pub fn credit_materials(&mut self, credits: &[(MaterialId, u64)]) -> DomainResult<()> {
        for (id, qty) in credits {
            let level = self.material_stock(*id)?;
            level
                .checked_add(*qty)
                .ok_or_else(|| DomainError::validation("material stock overflow"))?;
        }
        for (id, qty) in credits {
            if let Some(level) = self.materials.get_mut(id) {
                *level += qty;
            }
        }
        Ok(())
    }

    /// Credit one component (delivered task progress).
    pub fn credit_component(&mut self, id: ComponentId, qty: u64) -> DomainResult<u64> {
        let level = self
            .components
            .get_mut(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("component {id}")))?;
        *level = level
            .checked_add(qty)
            .ok_or_else(|| DomainError::validation("component stock overflow"))?;
        Ok(*level)
    }

    /// Consume up to `wanted` units of finished product stock.
    ///
    /// Returns how many units were actually consumed (`min(wanted, on hand)`);
    /// the remainder is the caller's shortfall.
    pub fn consume_product_up_to(&mut self, id: ProductId, wanted: u64) -> DomainResult<u64> {
        let level = self
            .products
            .get_mut(&id)
            .ok_or_else(|| DomainError::unknown_entity(format!("product {id}")))?;
        let consumed = wanted.min(*level);
        *level -= consumed;
        Ok(consumed)
    }

    /// Consume every listed material, all-or-nothing.
    ///
    /// If any material is short, nothing is consumed and the error names the
    /// first short material with required vs. available quantities.
    pub fn try_consume_materials(&mut self, requirements: &[(MaterialId, u64)]) -> DomainResult<()> {
        for (id, required) in requirements {
            let available = self.material_stock(*id)?;
            if available < *required {
                return Err(DomainError::InsufficientMaterial {
                    material_id: *id,
                    required: *required,
                    available,
                });
            }
        }
        for (id, required) in requirements {
            if let Some(level) = self.materials.get_mut(id) {
                *level -= required;
            }
        }
        Ok(())
    }

    pub fn material_levels(&self) -> impl Iterator<Item = (MaterialId, u64)> + '_ {
        self.materials.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn component_levels(&self) -> impl Iterator<Item = (ComponentId, u64)> + '_ {
        self.components.iter().map(|(id, qty)| (*id, *qty))
    }

    pub fn product_levels(&self) -> impl Iterator<Item = (ProductId, u64)> + '_ {
        self.products.iter().map(|(id, qty)| (*id, *qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_up_to_caps_at_available() {
        let mut ledger = StockLedger::new();
        let p = ProductId::new();
        ledger.register_product(p, 2);

        assert_eq!(ledger.consume_product_up_to(p, 5).unwrap(), 2);
        assert_eq!(ledger.product_stock(p).unwrap(), 0);
        assert_eq!(ledger.consume_product_up_to(p, 5).unwrap(), 0);
    }

    #[test]
    fn material_consumption_is_all_or_nothing() {
        let mut ledger = StockLedger::new();
        let plenty = MaterialId::new();
        let short = MaterialId::new();
        ledger.register_material(plenty, 100);
        ledger.register_material(short, 3);

        let err = ledger
            .try_consume_materials(&[(plenty, 10), (short, 4)])
            .unwrap_err();
        match err {
            DomainError::InsufficientMaterial {
                material_id,
                required,
                available,
            } => {
                assert_eq!(material_id, short);
                assert_eq!(required, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientMaterial, got {other:?}"),
        }

        // No partial consumption.
        assert_eq!(ledger.material_stock(plenty).unwrap(), 100);
        assert_eq!(ledger.material_stock(short).unwrap(), 3);

        ledger
            .try_consume_materials(&[(plenty, 10), (short, 3)])
            .unwrap();
        assert_eq!(ledger.material_stock(plenty).unwrap(), 90);
        assert_eq!(ledger.material_stock(short).unwrap(), 0);
    }

    #[test]
    fn unregistered_ids_do_not_read_as_zero() {
        let ledger = StockLedger::new();
        assert!(matches!(
            ledger.material_stock(MaterialId::new()),
            Err(DomainError::UnknownEntity(_))
        ));
    }

    #[test]
    fn registration_is_idempotent() {
        let mut ledger = StockLedger::new();
        let m = MaterialId::new();
        ledger.register_material(m, 10);
        ledger.register_material(m, 999);
        assert_eq!(ledger.material_stock(m).unwrap(), 10);
    }

    #[test]
    fn credit_all_is_atomic_on_overflow() {
        let mut ledger = StockLedger::new();
        let a = MaterialId::new();
        let b = MaterialId::new();
        ledger.register_material(a, 0);
        ledger.register_material(b, u64::MAX);

        let err = ledger.credit_materials(&[(a, 5), (b, 1)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(ledger.material_stock(a).unwrap(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: an arbitrary interleaving of credits and conditional
            /// consumptions keeps the counter consistent with the op history
            /// (and, being u64, it can never go negative).
            #[test]
            fn product_counter_matches_history(
                initial in 0u64..1_000,
                ops in prop::collection::vec(0u64..100, 1..50),
            ) {
                let mut ledger = StockLedger::new();
                let p = ProductId::new();
                ledger.register_product(p, initial);

                let mut expected = initial;
                for wanted in ops {
                    let consumed = ledger.consume_product_up_to(p, wanted).unwrap();
                    prop_assert!(consumed <= wanted);
                    prop_assert!(consumed <= expected);
                    expected -= consumed;
                    prop_assert_eq!(ledger.product_stock(p).unwrap(), expected);
                }
            }

            /// Property: failed material consumption leaves levels untouched.
            #[test]
            fn failed_consumption_has_no_effect(
                stock in 0u64..50,
                required in 0u64..100,
            ) {
                let mut ledger = StockLedger::new();
                let m = MaterialId::new();
                ledger.register_material(m, stock);

                let before = ledger.material_stock(m).unwrap();
                let result = ledger.try_consume_materials(&[(m, required)]);
                match result {
                    Ok(()) => prop_assert_eq!(ledger.material_stock(m).unwrap(), before - required),
                    Err(_) => prop_assert_eq!(ledger.material_stock(m).unwrap(), before),
                }
            }
        }
    }
}
