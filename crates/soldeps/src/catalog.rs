//! Component catalog: normalizes raw records into graph nodes.
//!
//! The catalog owns two indexes:
//! - `id -> position` for duplicate detection and O(1) lookup
//! - `(type, lowercased logical name) -> positions` for reference
//!   resolution; the earliest position in catalog order wins

use crate::domain::{Component, ComponentId, ComponentType, RawComponent};
use crate::warning::AnalysisWarning;
use std::collections::{BTreeSet, HashMap};

type NameKey = (ComponentType, String);

/// Normalized, order-preserving set of catalog components.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    components: Vec<Component>,
    positions: HashMap<ComponentId, usize>,
    by_logical_name: HashMap<NameKey, BTreeSet<usize>>,
    warnings: Vec<AnalysisWarning>,
}

impl Catalog {
    /// Components in input order (duplicates collapsed into the first slot).
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Warnings raised while normalizing.
    #[must_use]
    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    /// Number of distinct components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the catalog holds no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Look up a component by id.
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.positions.get(id).map(|&pos| &self.components[pos])
    }

    /// Returns `true` if a component with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.positions.contains_key(id)
    }

    /// Resolve a logical name of the given type to a component id.
    ///
    /// Matching ignores case and surrounding whitespace. When several
    /// components share the name, the first in catalog order is returned.
    #[must_use]
    pub fn resolve(&self, component_type: ComponentType, logical_name: &str) -> Option<&ComponentId> {
        self.by_logical_name
            .get(&(component_type, normalize_name(logical_name)))
            .and_then(|positions| positions.first())
            .map(|&pos| &self.components[pos].id)
    }

    /// Consume the catalog, returning components and warnings.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Component>, Vec<AnalysisWarning>) {
        (self.components, self.warnings)
    }

    fn insert(&mut self, component: Component) {
        if let Some(&pos) = self.positions.get(&component.id) {
            tracing::warn!(id = %component.id, "Duplicate component id, later record kept");
            self.warnings.push(AnalysisWarning::DuplicateComponent {
                id: component.id.clone(),
            });

            let stale = name_key(&self.components[pos]);
            self.unindex_name(stale, pos);
            self.index_name(name_key(&component), pos);
            self.components[pos] = component;
            return;
        }

        let pos = self.components.len();
        self.index_name(name_key(&component), pos);
        self.positions.insert(component.id.clone(), pos);
        self.components.push(component);
    }

    fn index_name(&mut self, key: Option<NameKey>, pos: usize) {
        if let Some(key) = key {
            self.by_logical_name.entry(key).or_default().insert(pos);
        }
    }

    fn unindex_name(&mut self, key: Option<NameKey>, pos: usize) {
        let Some(key) = key else {
            return;
        };
        if let Some(positions) = self.by_logical_name.get_mut(&key) {
            positions.remove(&pos);
            if positions.is_empty() {
                self.by_logical_name.remove(&key);
            }
        }
    }
}

/// Normalize raw records into a [`Catalog`].
///
/// Duplicate ids overwrite the earlier record in place and unknown type
/// discriminators map to [`ComponentType::Other`]; both record a warning
/// and neither fails the build. Record shape (non-blank ids) is validated by
/// [`crate::input`] before this point.
#[must_use]
pub fn build_catalog(raw_components: Vec<RawComponent>) -> Catalog {
    let mut catalog = Catalog::default();

    for raw in raw_components {
        let id = ComponentId::new(raw.id);
        let component_type = match ComponentType::parse(&raw.component_type) {
            Some(kind) => kind,
            None => {
                tracing::warn!(
                    id = %id,
                    discriminator = %raw.component_type,
                    "Unknown component type, treating as other"
                );
                catalog.warnings.push(AnalysisWarning::UnknownComponentType {
                    id: id.clone(),
                    discriminator: raw.component_type,
                });
                ComponentType::Other
            }
        };

        catalog.insert(Component {
            id,
            name: raw.name,
            logical_name: raw.logical_name,
            component_type,
            is_managed: raw.is_managed,
            not_found: false,
            has_circular_reference: false,
        });
    }

    tracing::debug!(
        components = catalog.len(),
        warnings = catalog.warnings.len(),
        "Catalog built"
    );
    catalog
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

fn name_key(component: &Component) -> Option<NameKey> {
    let name = normalize_name(&component.logical_name);
    (!name.is_empty()).then_some((component.component_type, name))
}
