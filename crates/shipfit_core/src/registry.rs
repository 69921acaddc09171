//! Resolved module index.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, HullClass, ModuleDef, ModuleFamily};
use crate::variants::{resolve_module_variants, select_tier_for_hull, variant_id};

/// Registry of placeable modules, keyed by id.
///
/// Built from a catalog with every family expanded into its variants, so
/// placements always refer to a concrete module.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleDef>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            modules: BTreeMap::new(),
        }
    }

    /// Build the registry from a catalog's modules and families.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut registry = Self::new();
        for module in resolve_module_variants(&catalog.modules, &catalog.families) {
            registry.register(module);
        }
        tracing::debug!(
            canonical = catalog.modules.len(),
            resolved = registry.len(),
            "Built module registry"
        );
        registry
    }

    /// Register a module, replacing any existing module with the same id.
    pub fn register(&mut self, module: ModuleDef) {
        self.modules.insert(module.id.clone(), module);
    }

    /// Get a module by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ModuleDef> {
        self.modules.get(id)
    }

    /// Whether a module id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    /// All modules in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDef> {
        self.modules.values()
    }

    /// Number of registered modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Modules a hull of class `hull` may mount.
    pub fn available_for(&self, hull: HullClass) -> impl Iterator<Item = &ModuleDef> {
        self.modules.values().filter(move |m| m.fits_hull(hull))
    }

    /// The registered variant of module `id` best suited to `hull`.
    ///
    /// `id` may be a concrete module, a variant of another tier, or a
    /// canonical family id that was expanded away. A family with no tier
    /// eligible for `hull` yields its smallest variant, so callers can report
    /// the hull requirement. Modules outside any family resolve to themselves.
    #[must_use]
    pub fn variant_for(
        &self,
        id: &str,
        hull: HullClass,
        families: &[ModuleFamily],
    ) -> Option<&ModuleDef> {
        let family_id = self
            .get(id)
            .and_then(|m| m.family.as_deref())
            .unwrap_or(id);
        let resolved = families
            .iter()
            .find(|f| f.id == family_id)
            .and_then(|family| {
                select_tier_for_hull(family, hull)
                    .or_else(|| family.sorted_tiers().into_iter().next())
            })
            .and_then(|tier| self.get(&variant_id(family_id, tier.min_hull)));
        resolved.or_else(|| self.get(id))
    }
}

impl FromIterator<ModuleDef> for ModuleRegistry {
    fn from_iter<I: IntoIterator<Item = ModuleDef>>(iter: I) -> Self {
        let mut registry = Self::new();
        for module in iter {
            registry.register(module);
        }
        registry
    }
}
