//! Reference extraction: type-specific payloads to dependency facts.
//!
//! Each component kind references other components in its own way: a form
//! names script libraries, a view names the entities in its FetchXML, a
//! plugin step is registered against an entity. The metadata collaborator
//! parses those payloads and hands over a [`ReferencePayload`]; this module
//! reduces every variant to the same [`DependencyFact`] shape so the graph
//! builder never needs to know about component kinds.
//!
//! Names are resolved through the [`Catalog`]'s logical-name index for the
//! expected target kind. A name that does not resolve is used verbatim as
//! the target id, which the graph builder then reports as a missing
//! reference.

use crate::catalog::Catalog;
use crate::domain::{ComponentId, ComponentType, DependencyFact};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A type-specific reference payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferencePayload {
    /// A form, its bound entity, and the `<Library name="...">` entries of
    /// its FormXML.
    Form {
        /// The form's component id
        form_id: ComponentId,
        /// Logical name of the entity the form belongs to
        #[serde(default)]
        entity: Option<String>,
        /// Web resource names referenced as form libraries
        #[serde(default)]
        libraries: Vec<String>,
    },

    /// A view and the `<entity>`/`<link-entity>` names of its FetchXML.
    View {
        /// The view's component id
        view_id: ComponentId,
        /// Entity logical names queried by the view
        #[serde(default)]
        entities: Vec<String>,
    },

    /// A plugin step registered on an entity.
    PluginStep {
        /// The plugin's component id
        plugin_id: ComponentId,
        /// Logical name of the entity the step fires on
        entity: String,
    },

    /// A workflow and its primary entity.
    Workflow {
        /// The workflow's component id
        workflow_id: ComponentId,
        /// Logical name of the primary entity
        entity: String,
    },

    /// An app and the component ids it includes.
    App {
        /// The app's component id
        app_id: ComponentId,
        /// Ids of components packaged in the app
        #[serde(default)]
        components: Vec<ComponentId>,
    },

    /// A generic metadata dependency record, already expressed as ids.
    Relationship {
        /// The dependent component
        from_id: ComponentId,
        /// The component depended upon
        to_id: ComponentId,
    },
}

/// Turns [`ReferencePayload`]s into [`DependencyFact`]s against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceExtractor<'a> {
    catalog: &'a Catalog,
}

impl<'a> ReferenceExtractor<'a> {
    /// Create an extractor resolving names through `catalog`.
    #[must_use]
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Extract the facts carried by one payload.
    ///
    /// Blank names are skipped and a target named twice in the same payload
    /// yields a single fact.
    #[must_use]
    pub fn extract(&self, payload: &ReferencePayload) -> Vec<DependencyFact> {
        let mut facts = FactSet::default();

        match payload {
            ReferencePayload::Form {
                form_id,
                entity,
                libraries,
            } => {
                if let Some(entity) = entity {
                    facts.push(form_id, self.resolve_name(ComponentType::Entity, entity));
                }
                for library in libraries {
                    facts.push(form_id, self.resolve_name(ComponentType::WebResource, library));
                }
            }
            ReferencePayload::View { view_id, entities } => {
                for entity in entities {
                    facts.push(view_id, self.resolve_name(ComponentType::Entity, entity));
                }
            }
            ReferencePayload::PluginStep { plugin_id, entity } => {
                facts.push(plugin_id, self.resolve_name(ComponentType::Entity, entity));
            }
            ReferencePayload::Workflow {
                workflow_id,
                entity,
            } => {
                facts.push(workflow_id, self.resolve_name(ComponentType::Entity, entity));
            }
            ReferencePayload::App { app_id, components } => {
                for component in components {
                    let target = (!component.as_str().trim().is_empty()).then(|| component.clone());
                    facts.push(app_id, target);
                }
            }
            ReferencePayload::Relationship { from_id, to_id } => {
                let target = (!to_id.as_str().trim().is_empty()).then(|| to_id.clone());
                facts.push(from_id, target);
            }
        }

        facts.into_facts()
    }

    /// Extract facts from every payload, in payload order.
    #[must_use]
    pub fn extract_all(&self, payloads: &[ReferencePayload]) -> Vec<DependencyFact> {
        let facts: Vec<DependencyFact> = payloads.iter().flat_map(|p| self.extract(p)).collect();
        tracing::debug!(
            payloads = payloads.len(),
            facts = facts.len(),
            "Extracted dependency facts"
        );
        facts
    }

    fn resolve_name(&self, expected: ComponentType, name: &str) -> Option<ComponentId> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        match self.catalog.resolve(expected, trimmed) {
            Some(id) => Some(id.clone()),
            None => {
                tracing::debug!(kind = %expected, name = trimmed, "Unresolved reference");
                Some(ComponentId::new(trimmed))
            }
        }
    }
}

/// Order-preserving fact accumulator that drops repeats.
#[derive(Default)]
struct FactSet {
    facts: Vec<DependencyFact>,
    seen: HashSet<ComponentId>,
}

impl FactSet {
    fn push(&mut self, from: &ComponentId, to: Option<ComponentId>) {
        let Some(to) = to else {
            return;
        };
        if self.seen.insert(to.clone()) {
            self.facts.push(DependencyFact {
                from: from.clone(),
                to,
            });
        }
    }

    fn into_facts(self) -> Vec<DependencyFact> {
        self.facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::domain::RawComponent;

    fn catalog() -> Catalog {
        build_catalog(vec![
            RawComponent::new("ent-account", "entity", "account"),
            RawComponent::new("ent-contact", "entity", "contact"),
            RawComponent::new("form-main", "form", "account_main"),
            RawComponent::new("wr-lib", "webresource", "new_/account.js"),
            RawComponent::new("view-active", "view", "active_accounts"),
            RawComponent::new("plugin-1", "plugin", "AccountPlugin"),
            RawComponent::new("wf-1", "workflow", "welcome_email"),
            RawComponent::new("app-1", "app", "sales_hub"),
        ])
    }

    #[test]
    fn form_depends_on_entity_and_libraries() {
        let catalog = catalog();
        let extractor = ReferenceExtractor::new(&catalog);

        let facts = extractor.extract(&ReferencePayload::Form {
            form_id: ComponentId::new("form-main"),
            entity: Some("Account".to_string()),
            libraries: vec!["new_/account.js".to_string(), "new_/missing.js".to_string()],
        });

        assert_eq!(
            facts,
            vec![
                DependencyFact::new("form-main", "ent-account"),
                DependencyFact::new("form-main", "wr-lib"),
                DependencyFact::new("form-main", "new_/missing.js"),
            ]
        );
    }

    #[test]
    fn view_deduplicates_linked_entities() {
        let catalog = catalog();
        let extractor = ReferenceExtractor::new(&catalog);

        let facts = extractor.extract(&ReferencePayload::View {
            view_id: ComponentId::new("view-active"),
            entities: vec![
                "account".to_string(),
                "contact".to_string(),
                "ACCOUNT".to_string(),
                "  ".to_string(),
            ],
        });

        assert_eq!(
            facts,
            vec![
                DependencyFact::new("view-active", "ent-account"),
                DependencyFact::new("view-active", "ent-contact"),
            ]
        );
    }

    #[test]
    fn entity_names_do_not_resolve_to_other_kinds() {
        let catalog = catalog();
        let extractor = ReferenceExtractor::new(&catalog);

        // "account_main" is a form, not an entity
        let facts = extractor.extract(&ReferencePayload::PluginStep {
            plugin_id: ComponentId::new("plugin-1"),
            entity: "account_main".to_string(),
        });

        assert_eq!(facts, vec![DependencyFact::new("plugin-1", "account_main")]);
    }

    #[test]
    fn workflow_and_app_and_relationship() {
        let catalog = catalog();
        let extractor = ReferenceExtractor::new(&catalog);

        let facts = extractor.extract_all(&[
            ReferencePayload::Workflow {
                workflow_id: ComponentId::new("wf-1"),
                entity: "contact".to_string(),
            },
            ReferencePayload::App {
                app_id: ComponentId::new("app-1"),
                components: vec![ComponentId::new("form-main"), ComponentId::new("view-active")],
            },
            ReferencePayload::Relationship {
                from_id: ComponentId::new("wr-lib"),
                to_id: ComponentId::new("ent-account"),
            },
        ]);

        assert_eq!(
            facts,
            vec![
                DependencyFact::new("wf-1", "ent-contact"),
                DependencyFact::new("app-1", "form-main"),
                DependencyFact::new("app-1", "view-active"),
                DependencyFact::new("wr-lib", "ent-account"),
            ]
        );
    }

    #[test]
    fn payload_deserializes_from_tagged_json() {
        let payload: ReferencePayload = serde_json::from_str(
            r#"{"kind":"form","form_id":"f","libraries":["a.js"]}"#,
        )
        .unwrap();

        assert_eq!(
            payload,
            ReferencePayload::Form {
                form_id: ComponentId::new("f"),
                entity: None,
                libraries: vec!["a.js".to_string()],
            }
        );
    }
}
