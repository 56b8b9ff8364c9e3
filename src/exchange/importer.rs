//! Exchange document → catalog merge.
//!
//! Import is split into a pure planning phase and a separate apply phase.
//! [`ImportPlan::build`] reads the document against the current catalog and
//! computes the complete operation list plus a human-readable result log
//! without touching anything; [`ImportPlan::apply`] executes the
//! operations. Simulate-only mode simply skips the apply step, so the
//! preview path can never accidentally write.
//!
//! All upserts match on natural keys (entity `name`, or the component +
//! flavor/variant name pair for join rows), never on the imported numeric
//! ids. The imported ids exist only to resolve within-document references
//! (component → category, legacy join rows → component) during the single
//! planning pass; ids pre-assigned for planned inserts are placeholders
//! when simulating and must not be relied upon.
//!
//! Processing order matters: categories establish the id map components
//! need, components establish the name map the legacy join rows need, and a
//! deferred pass backfills the derived `categoryname` on flavors and
//! variants from legacy documents that predate that field.

use crate::catalog::{
    Catalog, Category, Component, ComponentFlavor, ComponentVariant, EntityId, Flavor, Variant,
    validate_name,
};
use crate::core::{ElementsError, Result};
use crate::exchange::assets::{normalize_legacy_base, rewrite_asset_ids, rewrite_asset_ids_bulk};
use crate::exchange::document::{
    Document, OPTIONAL_TABLES, Row, TABLE_CATEGORY, TABLE_COMP_FLAVOR, TABLE_COMP_VARIANT,
    TABLE_COMPONENT, TABLE_FLAVOR, TABLE_VARIANT, TABLES,
};
use std::collections::HashMap;
use tracing::{debug, trace};

/// One planned catalog mutation.
#[derive(Debug, Clone)]
enum ImportOp {
    InsertCategory(Category),
    ReplaceCategory(Category),
    InsertComponent(Component),
    ReplaceComponent(Component),
    InsertFlavor(Flavor),
    ReplaceFlavor(Flavor),
    InsertVariant(Variant),
    ReplaceVariant(Variant),
    /// Natural-key upsert: update in place when the pair exists, insert
    /// otherwise.
    UpsertCompFlavor(ComponentFlavor),
    /// Natural-key insert-if-missing; existing pairs are left untouched.
    EnsureCompVariant(ComponentVariant),
    SetFlavorCategory { flavor: String, category: String },
    SetVariantCategory { variant: String, category: String },
}

/// The computed outcome of an import run: operations plus result log.
#[derive(Debug, Default)]
pub struct ImportPlan {
    ops: Vec<ImportOp>,
    results: Vec<String>,
}

fn parse_id(raw: &str) -> EntityId {
    raw.trim().parse().unwrap_or(0)
}

fn parse_order(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(0)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true")
}

fn csv_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn row_name(kind: &'static str, row: &Row) -> Result<String> {
    let name = row.get_or_empty("name").to_string();
    if name.is_empty() {
        return Err(ElementsError::ImportRow {
            kind,
            name,
            reason: "row has no name".to_string(),
        });
    }
    validate_name(kind, &name).map_err(|err| ElementsError::ImportRow {
        kind,
        name: name.clone(),
        reason: err.to_string(),
    })?;
    Ok(name)
}

/// Planning state shared across the table passes.
struct Planner<'c> {
    catalog: &'c Catalog,
    next_id: EntityId,
    category_map: HashMap<EntityId, EntityId>,
    category_names: HashMap<EntityId, String>,
    component_map: HashMap<EntityId, EntityId>,
    component_names: HashMap<EntityId, String>,
    planned_components: Vec<Component>,
    planned_flavors: Vec<Flavor>,
    planned_variants: Vec<Variant>,
    planned_comp_flavors: Vec<ComponentFlavor>,
    planned_comp_variants: Vec<ComponentVariant>,
    plan: ImportPlan,
}

impl<'c> Planner<'c> {
    fn new(catalog: &'c Catalog) -> Self {
        Self {
            catalog,
            next_id: catalog.peek_next_id(),
            category_map: HashMap::new(),
            category_names: HashMap::new(),
            component_map: HashMap::new(),
            component_names: HashMap::new(),
            planned_components: Vec::new(),
            planned_flavors: Vec::new(),
            planned_variants: Vec::new(),
            planned_comp_flavors: Vec::new(),
            planned_comp_variants: Vec::new(),
            plan: ImportPlan::default(),
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn plan_categories(&mut self, document: &Document) -> Result<()> {
        for row in document.rows(TABLE_CATEGORY) {
            let name = row_name("category", row)?;
            let old_id = parse_id(row.get_or_empty("id"));
            let mut record = Category {
                id: 0,
                name: name.clone(),
                displayname: row.get_or_empty("displayname").to_string(),
                displayorder: parse_order(row.get_or_empty("displayorder")),
                css: normalize_legacy_base(row.get_or_empty("css")),
            };
            match self.catalog.category_by_name(&name) {
                Some(existing) => {
                    record.id = existing.id;
                    if old_id != record.id {
                        record.css = rewrite_asset_ids(old_id, record.id, &record.css);
                    }
                    self.plan.results.push(format!("Replace category \"{name}\""));
                    self.plan.ops.push(ImportOp::ReplaceCategory(record.clone()));
                }
                None => {
                    record.id = self.allocate_id();
                    if old_id != record.id {
                        record.css = rewrite_asset_ids(old_id, record.id, &record.css);
                    }
                    self.plan.results.push(format!("New category \"{name}\""));
                    self.plan.ops.push(ImportOp::InsertCategory(record.clone()));
                }
            }
            if old_id != 0 {
                self.category_map.insert(old_id, record.id);
            }
            self.category_names.insert(record.id, name);
        }
        Ok(())
    }

    /// Resolves a component's category reference through the category map,
    /// falling back to the existing catalog for documents that reference
    /// categories outside the import.
    fn resolve_category(&self, old_category: EntityId, categoryname: &str) -> (EntityId, String) {
        if let Some(new_id) = self.category_map.get(&old_category) {
            let name = self.category_names.get(new_id).cloned().unwrap_or_default();
            return (*new_id, name);
        }
        if let Some(category) = self.catalog.category_by_name(categoryname) {
            return (category.id, category.name.clone());
        }
        if let Some(category) = self.catalog.category_by_id(old_category) {
            return (category.id, category.name.clone());
        }
        (0, categoryname.to_string())
    }

    fn plan_components(&mut self, document: &Document) -> Result<()> {
        for row in document.rows(TABLE_COMPONENT) {
            let name = row_name("component", row)?;
            let old_id = parse_id(row.get_or_empty("id"));
            let (category, categoryname) = self.resolve_category(
                parse_id(row.get_or_empty("compcat")),
                row.get_or_empty("categoryname"),
            );
            let mut record = Component {
                id: 0,
                name: name.clone(),
                displayname: row.get_or_empty("displayname").to_string(),
                category,
                categoryname,
                code: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("code")),
                text: row.get_or_empty("text").to_string(),
                variants: csv_list(row.get_or_empty("variants")),
                flavors: csv_list(row.get_or_empty("flavors")),
                displayorder: parse_order(row.get_or_empty("displayorder")),
                css: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("css")),
                js: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("js")),
                iconurl: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("iconurl")),
                hideforstudents: parse_flag(row.get_or_empty("hideforstudents")),
            };
            let inserted = match self.catalog.component_by_name(&name) {
                Some(existing) => {
                    record.id = existing.id;
                    self.plan.results.push(format!("Replace component \"{name}\""));
                    self.plan.ops.push(ImportOp::ReplaceComponent(record.clone()));
                    false
                }
                None => {
                    record.id = self.allocate_id();
                    self.plan.results.push(format!("New component \"{name}\""));
                    self.plan.ops.push(ImportOp::InsertComponent(record.clone()));
                    true
                }
            };
            if inserted {
                // Newly inserted components materialize their csv relation
                // lists as join rows, skipping pairs that already exist.
                for flavor in record.flavors.clone() {
                    self.ensure_comp_flavor(ComponentFlavor {
                        id: 0,
                        componentname: name.clone(),
                        flavorname: flavor,
                        iconurl: String::new(),
                    }, false);
                }
                for variant in record.variants.clone() {
                    self.ensure_comp_variant(ComponentVariant {
                        id: 0,
                        componentname: name.clone(),
                        variant,
                    }, false);
                }
            }
            if old_id != 0 {
                self.component_map.insert(old_id, record.id);
            }
            self.component_names.insert(record.id, name);
            self.planned_components.push(record);
        }
        Ok(())
    }

    fn plan_flavors(&mut self, document: &Document) -> Result<()> {
        for row in document.rows(TABLE_FLAVOR) {
            let name = row_name("flavor", row)?;
            let mut record = Flavor {
                id: 0,
                name: name.clone(),
                displayname: row.get_or_empty("displayname").to_string(),
                displayorder: parse_order(row.get_or_empty("displayorder")),
                content: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("content")),
                css: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("css")),
                categoryname: row.get_or_empty("categoryname").to_string(),
                hideforstudents: parse_flag(row.get_or_empty("hideforstudents")),
            };
            match self.catalog.flavor_by_name(&name) {
                Some(existing) => {
                    record.id = existing.id;
                    self.plan.results.push(format!("Replace flavor \"{name}\""));
                    self.plan.ops.push(ImportOp::ReplaceFlavor(record.clone()));
                }
                None => {
                    record.id = self.allocate_id();
                    self.plan.results.push(format!("New flavor \"{name}\""));
                    self.plan.ops.push(ImportOp::InsertFlavor(record.clone()));
                }
            }
            self.planned_flavors.push(record);
        }
        Ok(())
    }

    fn plan_variants(&mut self, document: &Document) -> Result<()> {
        for row in document.rows(TABLE_VARIANT) {
            let name = row_name("variant", row)?;
            let mut record = Variant {
                id: 0,
                name: name.clone(),
                displayname: row.get_or_empty("displayname").to_string(),
                content: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("content")),
                css: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("css")),
                iconurl: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("iconurl")),
                c4lcompatibility: parse_flag(row.get_or_empty("c4lcompatibility")),
                categoryname: row.get_or_empty("categoryname").to_string(),
            };
            match self.catalog.variant_by_name(&name) {
                Some(existing) => {
                    record.id = existing.id;
                    self.plan.results.push(format!("Replace variant \"{name}\""));
                    self.plan.ops.push(ImportOp::ReplaceVariant(record.clone()));
                }
                None => {
                    record.id = self.allocate_id();
                    self.plan.results.push(format!("New variant \"{name}\""));
                    self.plan.ops.push(ImportOp::InsertVariant(record.clone()));
                }
            }
            self.planned_variants.push(record);
        }
        Ok(())
    }

    /// Whether the component-flavor pair exists in the catalog or is
    /// already planned; plans it when missing. `log` controls result lines
    /// (csv-derived rows are silent, section rows are logged).
    fn ensure_comp_flavor(&mut self, link: ComponentFlavor, log: bool) {
        let exists_in_catalog =
            self.catalog.comp_flavor(&link.componentname, &link.flavorname).is_some();
        let planned = self
            .planned_comp_flavors
            .iter()
            .any(|l| l.componentname == link.componentname && l.flavorname == link.flavorname);
        let label = format!("{} - {}", link.componentname, link.flavorname);
        if exists_in_catalog || planned {
            // A logged section row still carries data (iconurl) to apply;
            // silent csv-derived rows leave the existing pairing alone.
            if log {
                self.plan.results.push(format!("Replace relation component<->flavor \"{label}\""));
                self.plan.ops.push(ImportOp::UpsertCompFlavor(link.clone()));
                self.remember_comp_flavor(link);
            }
            return;
        }
        if log {
            self.plan.results.push(format!("Create relation component<->flavor \"{label}\""));
        }
        self.plan.ops.push(ImportOp::UpsertCompFlavor(link.clone()));
        self.remember_comp_flavor(link);
    }

    fn remember_comp_flavor(&mut self, link: ComponentFlavor) {
        match self
            .planned_comp_flavors
            .iter_mut()
            .find(|l| l.componentname == link.componentname && l.flavorname == link.flavorname)
        {
            Some(slot) => *slot = link,
            None => self.planned_comp_flavors.push(link),
        }
    }

    /// Same as [`Self::ensure_comp_flavor`] for component-variant pairs,
    /// which are never updated once present.
    fn ensure_comp_variant(&mut self, link: ComponentVariant, log: bool) {
        let exists = self.catalog.comp_variant(&link.componentname, &link.variant).is_some()
            || self
                .planned_comp_variants
                .iter()
                .any(|l| l.componentname == link.componentname && l.variant == link.variant);
        let label = format!("{} - {}", link.componentname, link.variant);
        if exists {
            if log {
                self.plan
                    .results
                    .push(format!("Replace relation component<->variant \"{label}\""));
            }
            return;
        }
        if log {
            self.plan.results.push(format!("Create relation component<->variant \"{label}\""));
        }
        self.plan.ops.push(ImportOp::EnsureCompVariant(link.clone()));
        self.planned_comp_variants.push(link);
    }

    fn plan_comp_flavors(&mut self, document: &Document) {
        for row in document.rows(TABLE_COMP_FLAVOR) {
            let componentname = row.get_or_empty("componentname").to_string();
            let flavorname = row.get_or_empty("flavorname").to_string();
            if componentname.is_empty() || flavorname.is_empty() {
                trace!("skipping component-flavor row without natural key");
                continue;
            }
            let link = ComponentFlavor {
                id: 0,
                componentname,
                flavorname,
                iconurl: rewrite_asset_ids_bulk(&self.category_map, row.get_or_empty("iconurl")),
            };
            self.ensure_comp_flavor(link, true);
        }
    }

    fn plan_comp_variants(&mut self, document: &Document) {
        for row in document.rows(TABLE_COMP_VARIANT) {
            let mut componentname = row.get_or_empty("componentname").to_string();
            if componentname.is_empty() {
                // Legacy rows reference the component by imported id. Rows
                // for components outside this import are dropped.
                let old_component = parse_id(row.get_or_empty("component"));
                let Some(resolved) = self.component_map.get(&old_component) else {
                    trace!(old_component, "skipping relation for component not in import");
                    continue;
                };
                componentname = self.component_names.get(resolved).cloned().unwrap_or_default();
            }
            let variant = row.get_or_empty("variant").to_string();
            if componentname.is_empty() || variant.is_empty() {
                continue;
            }
            self.ensure_comp_variant(
                ComponentVariant { id: 0, componentname, variant },
                true,
            );
        }
    }

    /// Backfills `categoryname` on flavors and variants that still lack
    /// one, tracing through the (post-import) join rows and components.
    /// Legacy documents predate the denormalized field.
    fn plan_deferred_categories(&mut self) {
        let flavor_names: Vec<String> = self
            .catalog
            .flavors()
            .iter()
            .map(|f| f.name.clone())
            .chain(self.planned_flavors.iter().map(|f| f.name.clone()))
            .collect();
        for name in dedup(flavor_names) {
            let effective = self
                .planned_flavors
                .iter()
                .find(|f| f.name == name)
                .cloned()
                .or_else(|| self.catalog.flavor_by_name(&name).cloned());
            let missing = effective.map(|f| f.categoryname.is_empty()).unwrap_or(false);
            if !missing {
                continue;
            }
            if let Some(category) = self.trace_flavor_category(&name) {
                self.plan.ops.push(ImportOp::SetFlavorCategory { flavor: name, category });
            }
        }

        let variant_names: Vec<String> = self
            .catalog
            .variants()
            .iter()
            .map(|v| v.name.clone())
            .chain(self.planned_variants.iter().map(|v| v.name.clone()))
            .collect();
        for name in dedup(variant_names) {
            let effective = self
                .planned_variants
                .iter()
                .find(|v| v.name == name)
                .cloned()
                .or_else(|| self.catalog.variant_by_name(&name).cloned());
            let missing = effective.map(|v| v.categoryname.is_empty()).unwrap_or(false);
            if !missing {
                continue;
            }
            if let Some(category) = self.trace_variant_category(&name) {
                self.plan.ops.push(ImportOp::SetVariantCategory { variant: name, category });
            }
        }
    }

    fn effective_component_category(&self, componentname: &str) -> Option<String> {
        self.planned_components
            .iter()
            .find(|c| c.name == componentname)
            .map(|c| c.categoryname.clone())
            .or_else(|| {
                self.catalog.component_by_name(componentname).map(|c| c.categoryname.clone())
            })
            .filter(|n| !n.is_empty())
    }

    fn trace_flavor_category(&self, flavorname: &str) -> Option<String> {
        self.planned_comp_flavors
            .iter()
            .filter(|l| l.flavorname == flavorname)
            .map(|l| l.componentname.clone())
            .chain(
                self.catalog
                    .comp_flavors()
                    .iter()
                    .filter(|l| l.flavorname == flavorname)
                    .map(|l| l.componentname.clone()),
            )
            .find_map(|component| self.effective_component_category(&component))
    }

    fn trace_variant_category(&self, variantname: &str) -> Option<String> {
        self.planned_comp_variants
            .iter()
            .filter(|l| l.variant == variantname)
            .map(|l| l.componentname.clone())
            .chain(
                self.catalog
                    .comp_variants()
                    .iter()
                    .filter(|l| l.variant == variantname)
                    .map(|l| l.componentname.clone()),
            )
            .find_map(|component| self.effective_component_category(&component))
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

impl ImportPlan {
    /// Computes the operations and result log for merging a document into a
    /// catalog. Pure: neither the catalog nor anything else is written.
    ///
    /// # Errors
    ///
    /// [`ElementsError::MissingTable`] when a required section is absent,
    /// or [`ElementsError::ImportRow`] for rows without a valid name.
    pub fn build(document: &Document, catalog: &Catalog) -> Result<Self> {
        for table in TABLES {
            if !document.has_table(table) && !OPTIONAL_TABLES.contains(&table) {
                return Err(ElementsError::MissingTable { table: table.to_string() });
            }
        }

        let mut planner = Planner::new(catalog);
        planner.plan_categories(document)?;
        planner.plan_components(document)?;
        planner.plan_flavors(document)?;
        planner.plan_variants(document)?;
        planner.plan_comp_flavors(document);
        planner.plan_comp_variants(document);
        planner.plan_deferred_categories();
        debug!(
            ops = planner.plan.ops.len(),
            results = planner.plan.results.len(),
            "import plan built"
        );
        Ok(planner.plan)
    }

    /// Human-readable result log, one line per processed entity.
    pub fn results(&self) -> &[String] {
        &self.results
    }

    /// Number of planned catalog mutations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the plan contains no mutation.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Executes the planned operations against a catalog.
    ///
    /// # Errors
    ///
    /// [`ElementsError::ImportRow`] identifying the entity whose operation
    /// failed. Operations already applied are not rolled back.
    pub fn apply(&self, catalog: &mut Catalog) -> Result<()> {
        for op in &self.ops {
            match op {
                ImportOp::InsertCategory(record) => {
                    catalog
                        .insert_category(record.clone())
                        .map_err(|err| row_error("category", &record.name, err))?;
                }
                ImportOp::ReplaceCategory(record) => {
                    catalog
                        .replace_category(record.clone())
                        .map_err(|err| row_error("category", &record.name, err))?;
                }
                ImportOp::InsertComponent(record) => {
                    catalog
                        .insert_component(record.clone())
                        .map_err(|err| row_error("component", &record.name, err))?;
                }
                ImportOp::ReplaceComponent(record) => {
                    catalog
                        .replace_component(record.clone())
                        .map_err(|err| row_error("component", &record.name, err))?;
                }
                ImportOp::InsertFlavor(record) => {
                    catalog
                        .insert_flavor(record.clone())
                        .map_err(|err| row_error("flavor", &record.name, err))?;
                }
                ImportOp::ReplaceFlavor(record) => {
                    catalog
                        .replace_flavor(record.clone())
                        .map_err(|err| row_error("flavor", &record.name, err))?;
                }
                ImportOp::InsertVariant(record) => {
                    catalog
                        .insert_variant(record.clone())
                        .map_err(|err| row_error("variant", &record.name, err))?;
                }
                ImportOp::ReplaceVariant(record) => {
                    catalog
                        .replace_variant(record.clone())
                        .map_err(|err| row_error("variant", &record.name, err))?;
                }
                ImportOp::UpsertCompFlavor(link) => {
                    match catalog.comp_flavor(&link.componentname, &link.flavorname) {
                        Some(existing) => {
                            let mut updated = link.clone();
                            updated.id = existing.id;
                            catalog.replace_comp_flavor(updated).map_err(|err| {
                                row_error("component-flavor relation", &link.componentname, err)
                            })?;
                        }
                        None => {
                            catalog.insert_comp_flavor(link.clone());
                        }
                    }
                }
                ImportOp::EnsureCompVariant(link) => {
                    if catalog.comp_variant(&link.componentname, &link.variant).is_none() {
                        catalog.insert_comp_variant(link.clone());
                    }
                }
                ImportOp::SetFlavorCategory { flavor, category } => {
                    catalog.set_flavor_category(flavor, category);
                }
                ImportOp::SetVariantCategory { variant, category } => {
                    catalog.set_variant_category(variant, category);
                }
            }
        }
        Ok(())
    }
}

fn row_error(kind: &'static str, name: &str, err: ElementsError) -> ElementsError {
    ElementsError::ImportRow {
        kind,
        name: name.to_string(),
        reason: err.to_string(),
    }
}

/// Merges a parsed document into a catalog.
///
/// With `simulate` set, no write occurs; the returned result log describes
/// what a real run would do.
pub fn import_document(
    catalog: &mut Catalog,
    document: &Document,
    simulate: bool,
) -> Result<Vec<String>> {
    let plan = ImportPlan::build(document, catalog)?;
    if !simulate {
        plan.apply(catalog)?;
    }
    Ok(plan.results().to_vec())
}

/// Parses XML text and merges it into a catalog. See [`import_document`].
pub fn import_xml(catalog: &mut Catalog, xml: &str, simulate: bool) -> Result<Vec<String>> {
    let document = Document::parse(xml)?;
    import_document(catalog, &document, simulate)
}
