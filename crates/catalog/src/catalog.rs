//! Catalog registry and the pure BOM resolver.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use woodshop_core::{ComponentId, DomainError, DomainResult, Entity, MaterialId, ProductId};

use crate::component::Component;
use crate::material::Material;
use crate::product::Product;

/// Scale a per-unit requirement to a total, rounding up.
///
/// Quantities are integral; rounding up guarantees the plan never
/// under-produces.
fn scaled(quantity: u64, per_unit: f64) -> u64 {
    ((quantity as f64) * per_unit).ceil() as u64
}

/// In-memory catalog of materials, components and products.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    materials: HashMap<MaterialId, Material>,
    components: HashMap<ComponentId, Component>,
    products: HashMap<ProductId, Product>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_material(&mut self, material: Material) {
        self.materials.insert(*material.id(), material);
    }

    pub fn insert_component(&mut self, component: Component) {
        self.components.insert(*component.id(), component);
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(*product.id(), product);
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(&id)
    }

    pub fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.get_mut(&id)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Explode a product's BOM for `quantity` units.
    ///
    /// Pure and deterministic; rows keep the BOM's declared order. A product
    /// with an empty BOM yields no requirements (bought finished).
    /// `UnknownEntity` only when the product itself is not registered.
    pub fn required_components(
        &self,
        product_id: ProductId,
        quantity: u64,
    ) -> DomainResult<Vec<(ComponentId, u64)>> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        let product = self
            .products
            .get(&product_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("product {product_id}")))?;

        Ok(product
            .bom()
            .iter()
            .map(|row| (row.component_id, scaled(quantity, row.qty_per_unit)))
            .collect())
    }

    /// Explode a component's BOM for `quantity` units.
    ///
    /// Same contract as [`Catalog::required_components`].
    pub fn required_materials(
        &self,
        component_id: ComponentId,
        quantity: u64,
    ) -> DomainResult<Vec<(MaterialId, u64)>> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        let component = self
            .components
            .get(&component_id)
            .ok_or_else(|| DomainError::unknown_entity(format!("component {component_id}")))?;

        Ok(component
            .bom()
            .iter()
            .map(|row| (row.material_id, scaled(quantity, row.qty_per_unit)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::MaterialRequirement;
    use crate::product::ComponentRequirement;

    fn catalog_with_chair() -> (Catalog, ProductId, ComponentId, MaterialId) {
        let mut catalog = Catalog::new();

        let oak = MaterialId::new();
        catalog.insert_material(Material::new(oak, "oak board", "pcs").unwrap());

        let leg = ComponentId::new();
        catalog.insert_component(
            Component::new(
                leg,
                "chair leg",
                vec![MaterialRequirement::new(oak, 3.0).unwrap()],
            )
            .unwrap(),
        );

        let chair = ProductId::new();
        catalog.insert_product(
            Product::new(
                chair,
                "oak chair",
                12_000,
                vec![ComponentRequirement::new(leg, 2.0).unwrap()],
            )
            .unwrap(),
        );

        (catalog, chair, leg, oak)
    }

    #[test]
    fn explodes_product_bom() {
        let (catalog, chair, leg, _) = catalog_with_chair();
        let reqs = catalog.required_components(chair, 5).unwrap();
        assert_eq!(reqs, vec![(leg, 10)]);
    }

    #[test]
    fn explodes_component_bom() {
        let (catalog, _, leg, oak) = catalog_with_chair();
        let reqs = catalog.required_materials(leg, 10).unwrap();
        assert_eq!(reqs, vec![(oak, 30)]);
    }

    #[test]
    fn fractional_requirements_round_up() {
        let mut catalog = Catalog::new();
        let trim = MaterialId::new();
        catalog.insert_material(Material::new(trim, "trim", "m").unwrap());

        let panel = ComponentId::new();
        catalog.insert_component(
            Component::new(
                panel,
                "panel",
                vec![MaterialRequirement::new(trim, 0.4).unwrap()],
            )
            .unwrap(),
        );

        // 3 * 0.4 = 1.2 -> 2, never 1.
        let reqs = catalog.required_materials(panel, 3).unwrap();
        assert_eq!(reqs, vec![(trim, 2)]);
    }

    #[test]
    fn empty_bom_means_bought_finished() {
        let mut catalog = Catalog::new();
        let hinge = ComponentId::new();
        catalog.insert_component(Component::new(hinge, "brass hinge", vec![]).unwrap());

        let reqs = catalog.required_materials(hinge, 7).unwrap();
        assert!(reqs.is_empty());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let catalog = Catalog::new();
        let err = catalog.required_components(ProductId::new(), 1).unwrap_err();
        assert!(matches!(err, DomainError::UnknownEntity(_)));

        let err = catalog.required_materials(ComponentId::new(), 1).unwrap_err();
        assert!(matches!(err, DomainError::UnknownEntity(_)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let (catalog, chair, _, _) = catalog_with_chair();
        let err = catalog.required_components(chair, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn reprice_rejects_zero() {
        let (mut catalog, chair, _, _) = catalog_with_chair();
        let product = catalog.product_mut(chair).unwrap();
        product.set_price(15_000).unwrap();
        assert_eq!(product.price(), 15_000);
        assert!(product.set_price(0).is_err());
        assert_eq!(product.price(), 15_000);
    }

    #[test]
    fn bom_row_edits_change_resolution() {
        let (mut catalog, chair, leg, oak) = catalog_with_chair();

        // 2 legs per chair becomes 4.
        catalog
            .product_mut(chair)
            .unwrap()
            .upsert_bom_row(ComponentRequirement::new(leg, 4.0).unwrap());
        assert_eq!(catalog.required_components(chair, 5).unwrap(), vec![(leg, 20)]);

        // 3 boards per leg becomes 2.5, still rounding up.
        catalog
            .component_mut(leg)
            .unwrap()
            .upsert_bom_row(MaterialRequirement::new(oak, 2.5).unwrap());
        assert_eq!(catalog.required_materials(leg, 3).unwrap(), vec![(oak, 8)]);
    }

    #[test]
    fn removing_the_last_bom_row_means_bought_finished() {
        let (mut catalog, chair, leg, _) = catalog_with_chair();
        catalog.product_mut(chair).unwrap().remove_bom_row(leg).unwrap();
        assert!(catalog.required_components(chair, 5).unwrap().is_empty());

        let err = catalog
            .product_mut(chair)
            .unwrap()
            .remove_bom_row(leg)
            .unwrap_err();
        assert!(matches!(err, DomainError::UnknownEntity(_)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: the scaled requirement never under-produces and
            /// overshoots by less than one unit of the dependency.
            #[test]
            fn rounding_never_under_produces(
                quantity in 1u64..10_000,
                per_unit in 0.01f64..50.0,
            ) {
                let exact = (quantity as f64) * per_unit;
                let total = scaled(quantity, per_unit);
                prop_assert!(total as f64 >= exact);
                prop_assert!((total as f64) < exact + 1.0);
            }

            /// Property: resolution is deterministic.
            #[test]
            fn resolution_is_deterministic(quantity in 1u64..1_000) {
                let (catalog, chair, _, _) = catalog_with_chair();
                let a = catalog.required_components(chair, quantity).unwrap();
                let b = catalog.required_components(chair, quantity).unwrap();
                prop_assert_eq!(a, b);
            }
        }
    }
}
