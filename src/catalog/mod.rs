//! Catalog snapshot: the read-mostly entity store behind the editor session.
//!
//! A [`Catalog`] owns every entity the picker works with: categories,
//! components, flavors, variants and the two join tables. It is loaded once
//! per session from the backing store, read by the resolution and composition
//! engines, and mutated only by the exchange importer.
//!
//! # Lookup contract
//!
//! All lookups return `Option` and never fail. The resolution engine relies
//! on this to implement its soft-miss policy: a deleted variant referenced by
//! a stale preference entry simply resolves to `None` and is skipped.
//!
//! # Ordering
//!
//! Entities keep their insertion order. Display ordering (used for the
//! default UI selection) is derived on demand by a stable sort on
//! `displayorder`, so ties keep their catalog insertion order.
//!
//! # Ids
//!
//! Ids are allocated by the catalog from a monotonic counter. Records
//! inserted with a preset non-zero id (the importer pre-assigns ids while
//! planning) keep it, and the counter is bumped past it.

pub mod entity;


pub use entity::{
    Category, Component, ComponentFlavor, ComponentVariant, EntityId, Flavor, Variant,
    validate_name,
};

use crate::core::{ElementsError, Result};
use tracing::trace;

/// In-memory snapshot of the full entity graph.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    components: Vec<Component>,
    flavors: Vec<Flavor>,
    variants: Vec<Variant>,
    comp_flavors: Vec<ComponentFlavor>,
    comp_variants: Vec<ComponentVariant>,
    next_id: EntityId,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Next id the catalog would allocate. The importer uses this to
    /// pre-assign ids while planning.
    pub fn peek_next_id(&self) -> EntityId {
        self.next_id.max(1)
    }

    fn take_id(&mut self, preset: EntityId) -> EntityId {
        let id = if preset == 0 { self.peek_next_id() } else { preset };
        self.next_id = self.next_id.max(id + 1);
        id
    }

    // --- categories ---

    /// Inserts a category, allocating an id unless the record carries one.
    ///
    /// # Errors
    ///
    /// [`ElementsError::InvalidName`] or [`ElementsError::DuplicateName`].
    pub fn insert_category(&mut self, mut category: Category) -> Result<EntityId> {
        validate_name("category", &category.name)?;
        if self.category_by_name(&category.name).is_some() {
            return Err(ElementsError::DuplicateName {
                kind: "category",
                name: category.name,
            });
        }
        let id = self.take_id(category.id);
        category.id = id;
        trace!(id, name = %category.name, "insert category");
        self.categories.push(category);
        Ok(id)
    }

    /// Replaces the category with the same id, keeping its position.
    ///
    /// # Errors
    ///
    /// [`ElementsError::UnknownId`] if no category has this id, or name
    /// validation/duplicate errors if the record renames the category onto an
    /// existing name.
    pub fn replace_category(&mut self, category: Category) -> Result<()> {
        validate_name("category", &category.name)?;
        if self
            .categories
            .iter()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(ElementsError::DuplicateName {
                kind: "category",
                name: category.name,
            });
        }
        match self.categories.iter_mut().find(|c| c.id == category.id) {
            Some(slot) => {
                *slot = category;
                Ok(())
            }
            None => Err(ElementsError::UnknownId {
                kind: "category",
                id: category.id,
            }),
        }
    }

    /// Looks up a category by its stable name.
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Looks up a category by id.
    pub fn category_by_id(&self, id: EntityId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// All categories in insertion order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Categories sorted by display order (ties keep insertion order).
    pub fn ordered_categories(&self) -> Vec<&Category> {
        let mut out: Vec<&Category> = self.categories.iter().collect();
        out.sort_by_key(|c| c.displayorder);
        out
    }

    // --- components ---

    /// Inserts a component, allocating an id unless the record carries one.
    pub fn insert_component(&mut self, mut component: Component) -> Result<EntityId> {
        validate_name("component", &component.name)?;
        if self.component_by_name(&component.name).is_some() {
            return Err(ElementsError::DuplicateName {
                kind: "component",
                name: component.name,
            });
        }
        let id = self.take_id(component.id);
        component.id = id;
        trace!(id, name = %component.name, "insert component");
        self.components.push(component);
        Ok(id)
    }

    /// Replaces the component with the same id.
    pub fn replace_component(&mut self, component: Component) -> Result<()> {
        validate_name("component", &component.name)?;
        if self
            .components
            .iter()
            .any(|c| c.name == component.name && c.id != component.id)
        {
            return Err(ElementsError::DuplicateName {
                kind: "component",
                name: component.name,
            });
        }
        match self.components.iter_mut().find(|c| c.id == component.id) {
            Some(slot) => {
                *slot = component;
                Ok(())
            }
            None => Err(ElementsError::UnknownId {
                kind: "component",
                id: component.id,
            }),
        }
    }

    /// Looks up a component by its stable name.
    pub fn component_by_name(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Looks up a component by id.
    pub fn component_by_id(&self, id: EntityId) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// All components in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Components of one category, sorted by display order.
    pub fn components_in_category(&self, category: EntityId) -> Vec<&Component> {
        let mut out: Vec<&Component> =
            self.components.iter().filter(|c| c.category == category).collect();
        out.sort_by_key(|c| c.displayorder);
        out
    }

    /// Components visible to the given audience, sorted by display order.
    ///
    /// Students do not see components flagged `hideforstudents`.
    pub fn visible_components(&self, is_student: bool) -> Vec<&Component> {
        let mut out: Vec<&Component> = self
            .components
            .iter()
            .filter(|c| !(is_student && c.hideforstudents))
            .collect();
        out.sort_by_key(|c| c.displayorder);
        out
    }

    // --- flavors ---

    /// Inserts a flavor, allocating an id unless the record carries one.
    pub fn insert_flavor(&mut self, mut flavor: Flavor) -> Result<EntityId> {
        validate_name("flavor", &flavor.name)?;
        if self.flavor_by_name(&flavor.name).is_some() {
            return Err(ElementsError::DuplicateName {
                kind: "flavor",
                name: flavor.name,
            });
        }
        let id = self.take_id(flavor.id);
        flavor.id = id;
        self.flavors.push(flavor);
        Ok(id)
    }

    /// Replaces the flavor with the same id.
    pub fn replace_flavor(&mut self, flavor: Flavor) -> Result<()> {
        validate_name("flavor", &flavor.name)?;
        if self.flavors.iter().any(|f| f.name == flavor.name && f.id != flavor.id) {
            return Err(ElementsError::DuplicateName {
                kind: "flavor",
                name: flavor.name,
            });
        }
        match self.flavors.iter_mut().find(|f| f.id == flavor.id) {
            Some(slot) => {
                *slot = flavor;
                Ok(())
            }
            None => Err(ElementsError::UnknownId {
                kind: "flavor",
                id: flavor.id,
            }),
        }
    }

    /// Looks up a flavor by its stable name.
    pub fn flavor_by_name(&self, name: &str) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.name == name)
    }

    /// Looks up a flavor by id.
    pub fn flavor_by_id(&self, id: EntityId) -> Option<&Flavor> {
        self.flavors.iter().find(|f| f.id == id)
    }

    /// All flavors in insertion order.
    pub fn flavors(&self) -> &[Flavor] {
        &self.flavors
    }

    /// Flavors visible to the given audience, sorted by display order.
    pub fn visible_flavors(&self, is_student: bool) -> Vec<&Flavor> {
        let mut out: Vec<&Flavor> = self
            .flavors
            .iter()
            .filter(|f| !(is_student && f.hideforstudents))
            .collect();
        out.sort_by_key(|f| f.displayorder);
        out
    }

    // --- variants ---

    /// Inserts a variant, allocating an id unless the record carries one.
    pub fn insert_variant(&mut self, mut variant: Variant) -> Result<EntityId> {
        validate_name("variant", &variant.name)?;
        if self.variant_by_name(&variant.name).is_some() {
            return Err(ElementsError::DuplicateName {
                kind: "variant",
                name: variant.name,
            });
        }
        let id = self.take_id(variant.id);
        variant.id = id;
        self.variants.push(variant);
        Ok(id)
    }

    /// Replaces the variant with the same id.
    pub fn replace_variant(&mut self, variant: Variant) -> Result<()> {
        validate_name("variant", &variant.name)?;
        if self.variants.iter().any(|v| v.name == variant.name && v.id != variant.id) {
            return Err(ElementsError::DuplicateName {
                kind: "variant",
                name: variant.name,
            });
        }
        match self.variants.iter_mut().find(|v| v.id == variant.id) {
            Some(slot) => {
                *slot = variant;
                Ok(())
            }
            None => Err(ElementsError::UnknownId {
                kind: "variant",
                id: variant.id,
            }),
        }
    }

    /// Looks up a variant by its stable name.
    pub fn variant_by_name(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Looks up a variant by id.
    pub fn variant_by_id(&self, id: EntityId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// All variants in insertion order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    // --- join rows ---

    /// Inserts a component-flavor join row, allocating an id.
    pub fn insert_comp_flavor(&mut self, mut row: ComponentFlavor) -> EntityId {
        let id = self.take_id(row.id);
        row.id = id;
        self.comp_flavors.push(row);
        id
    }

    /// Replaces the component-flavor join row with the same id.
    pub fn replace_comp_flavor(&mut self, row: ComponentFlavor) -> Result<()> {
        match self.comp_flavors.iter_mut().find(|r| r.id == row.id) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(ElementsError::UnknownId {
                kind: "component-flavor relation",
                id: row.id,
            }),
        }
    }

    /// Looks up a component-flavor join row by its natural key.
    pub fn comp_flavor(&self, componentname: &str, flavorname: &str) -> Option<&ComponentFlavor> {
        self.comp_flavors
            .iter()
            .find(|r| r.componentname == componentname && r.flavorname == flavorname)
    }

    /// All component-flavor join rows.
    pub fn comp_flavors(&self) -> &[ComponentFlavor] {
        &self.comp_flavors
    }

    /// Inserts a component-variant join row, allocating an id.
    pub fn insert_comp_variant(&mut self, mut row: ComponentVariant) -> EntityId {
        let id = self.take_id(row.id);
        row.id = id;
        self.comp_variants.push(row);
        id
    }

    /// Looks up a component-variant join row by its natural key.
    pub fn comp_variant(&self, componentname: &str, variant: &str) -> Option<&ComponentVariant> {
        self.comp_variants
            .iter()
            .find(|r| r.componentname == componentname && r.variant == variant)
    }

    /// All component-variant join rows.
    pub fn comp_variants(&self) -> &[ComponentVariant] {
        &self.comp_variants
    }

    // --- derived category names ---

    /// Category name of the components using a flavor, traced through the
    /// join table. Legacy exports predate the denormalized `categoryname`
    /// field on flavors; the importer uses this to backfill it.
    pub fn category_name_for_flavor(&self, flavorname: &str) -> Option<String> {
        self.comp_flavors
            .iter()
            .filter(|r| r.flavorname == flavorname)
            .find_map(|r| self.component_by_name(&r.componentname))
            .map(|c| c.categoryname.clone())
            .filter(|n| !n.is_empty())
    }

    /// Category name of the components using a variant, traced through the
    /// join table.
    pub fn category_name_for_variant(&self, variantname: &str) -> Option<String> {
        self.comp_variants
            .iter()
            .filter(|r| r.variant == variantname)
            .find_map(|r| self.component_by_name(&r.componentname))
            .map(|c| c.categoryname.clone())
            .filter(|n| !n.is_empty())
    }

    /// Backfills an empty `categoryname` on a flavor. Used by the importer's
    /// deferred pass; no-op if the flavor does not exist.
    pub fn set_flavor_category(&mut self, flavorname: &str, categoryname: &str) {
        if let Some(flavor) = self.flavors.iter_mut().find(|f| f.name == flavorname) {
            flavor.categoryname = categoryname.to_string();
        }
    }

    /// Backfills an empty `categoryname` on a variant.
    pub fn set_variant_category(&mut self, variantname: &str, categoryname: &str) {
        if let Some(variant) = self.variants.iter_mut().find(|v| v.name == variantname) {
            variant.categoryname = categoryname.to_string();
        }
    }
}
