//! Domain types for solution dependency analysis.
//!
//! This module contains the node and edge types shared by every stage of
//! the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier for a component within one solution scan
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    /// Create a new component ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of platform component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Table / entity definition
    Entity,

    /// Entity form
    Form,

    /// Saved query / system view
    View,

    /// Plugin assembly or plugin type
    Plugin,

    /// Script, stylesheet, image or HTML web resource
    WebResource,

    /// Classic workflow, business process flow or cloud flow
    Workflow,

    /// Model-driven or canvas app
    App,

    /// Anything else, including virtual placeholders for missing targets
    Other,
}

impl ComponentType {
    /// All variants, in declaration order.
    pub const ALL: [ComponentType; 8] = [
        ComponentType::Entity,
        ComponentType::Form,
        ComponentType::View,
        ComponentType::Plugin,
        ComponentType::WebResource,
        ComponentType::Workflow,
        ComponentType::App,
        ComponentType::Other,
    ];

    /// Parse a raw type discriminator.
    ///
    /// Matching ignores case, surrounding whitespace, and `_`/`-`/space
    /// separators, and accepts the platform's common aliases. Returns `None`
    /// for discriminators that do not name a known type; callers decide
    /// whether that maps to [`ComponentType::Other`].
    #[must_use]
    pub fn parse(discriminator: &str) -> Option<Self> {
        let normalized: String = discriminator
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let parsed = match normalized.as_str() {
            "entity" | "table" => Self::Entity,
            "form" | "systemform" => Self::Form,
            "view" | "savedquery" => Self::View,
            "plugin" | "pluginassembly" | "plugintype" => Self::Plugin,
            "webresource" => Self::WebResource,
            "workflow" | "flow" | "process" => Self::Workflow,
            "app" | "appmodule" | "canvasapp" => Self::App,
            "other" => Self::Other,
            _ => return None,
        };
        Some(parsed)
    }

    /// Map a platform solution-component type code to a type.
    ///
    /// Codes without a dedicated variant return `None`.
    #[must_use]
    pub fn from_solution_code(code: i64) -> Option<Self> {
        let kind = match code {
            1 => Self::Entity,
            26 => Self::View,
            29 => Self::Workflow,
            60 => Self::Form,
            61 => Self::WebResource,
            80 | 300 => Self::App,
            90 | 91 | 92 => Self::Plugin,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Entity => "entity",
            Self::Form => "form",
            Self::View => "view",
            Self::Plugin => "plugin",
            Self::WebResource => "web_resource",
            Self::Workflow => "workflow",
            Self::App => "app",
            Self::Other => "other",
        };
        f.write_str(label)
    }
}

/// A raw component record as delivered by the metadata collaborator.
///
/// Only `id` is required; the remaining fields default so that sparse
/// records still normalize. Field names accept both snake_case and the
/// platform's camelCase spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComponent {
    /// Identifier, unique within the scan
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Logical (schema) name
    #[serde(default, alias = "logicalName")]
    pub logical_name: String,

    /// Type discriminator, parsed with [`ComponentType::parse`]
    #[serde(default, rename = "type", alias = "componentType")]
    pub component_type: String,

    /// Whether the component ships in a managed solution
    #[serde(default, alias = "isManaged")]
    pub is_managed: bool,
}

impl RawComponent {
    /// Create a raw record with the given id, type discriminator and names.
    pub fn new(
        id: impl Into<String>,
        component_type: impl Into<String>,
        logical_name: impl Into<String>,
    ) -> Self {
        let logical_name = logical_name.into();
        Self {
            id: id.into(),
            name: logical_name.clone(),
            logical_name,
            component_type: component_type.into(),
            is_managed: false,
        }
    }
}

/// A normalized node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Unique identifier
    pub id: ComponentId,

    /// Display name
    pub name: String,

    /// Logical (schema) name
    pub logical_name: String,

    /// Component kind
    pub component_type: ComponentType,

    /// Whether the component ships in a managed solution
    pub is_managed: bool,

    /// Placeholder synthesized for a dependency target absent from the catalog
    #[serde(default)]
    pub not_found: bool,

    /// Member of at least one circular chain
    #[serde(default)]
    pub has_circular_reference: bool,
}

impl Component {
    /// Build a virtual placeholder for a target id that has no catalog entry.
    #[must_use]
    pub fn virtual_placeholder(id: &ComponentId) -> Self {
        Self {
            id: id.clone(),
            name: id.0.clone(),
            logical_name: id.0.clone(),
            component_type: ComponentType::Other,
            is_managed: false,
            not_found: true,
            has_circular_reference: false,
        }
    }
}

/// A raw directed reference: `from` depends on `to`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyFact {
    /// The dependent component
    #[serde(alias = "fromId")]
    pub from: ComponentId,

    /// The component depended upon
    #[serde(alias = "toId")]
    pub to: ComponentId,
}

impl DependencyFact {
    /// Create a new dependency fact
    pub fn new(from: impl Into<ComponentId>, to: impl Into<ComponentId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A deduplicated edge in the built graph: `from` depends on `to`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The dependent component (never virtual)
    pub from: ComponentId,

    /// The component depended upon (possibly virtual)
    pub to: ComponentId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("entity", ComponentType::Entity)]
    #[case::alias("Table", ComponentType::Entity)]
    #[case::underscored("web_resource", ComponentType::WebResource)]
    #[case::camel("WebResource", ComponentType::WebResource)]
    #[case::system_form("systemform", ComponentType::Form)]
    #[case::saved_query("SavedQuery", ComponentType::View)]
    #[case::plugin_type("plugin-type", ComponentType::Plugin)]
    #[case::cloud_flow(" Flow ", ComponentType::Workflow)]
    #[case::canvas("canvas app", ComponentType::App)]
    #[case::other("other", ComponentType::Other)]
    fn parse_recognizes_discriminators(#[case] raw: &str, #[case] expected: ComponentType) {
        assert_eq!(ComponentType::parse(raw), Some(expected));
    }

    #[rstest]
    #[case::empty("")]
    #[case::unknown("sitemap")]
    #[case::numeric("61")]
    fn parse_rejects_unknown_discriminators(#[case] raw: &str) {
        assert_eq!(ComponentType::parse(raw), None);
    }

    #[rstest]
    #[case::entity(1, Some(ComponentType::Entity))]
    #[case::system_form(60, Some(ComponentType::Form))]
    #[case::canvas_app(300, Some(ComponentType::App))]
    #[case::sdk_step(92, Some(ComponentType::Plugin))]
    #[case::attribute(2, None)]
    fn solution_codes_map_to_types(#[case] code: i64, #[case] expected: Option<ComponentType>) {
        assert_eq!(ComponentType::from_solution_code(code), expected);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in ComponentType::ALL {
            assert_eq!(ComponentType::parse(&kind.to_string()), Some(kind));
        }
    }

    #[test]
    fn raw_component_accepts_camel_case_fields() {
        let raw: RawComponent = serde_json::from_str(
            r#"{"id":"f1","name":"Main","logicalName":"account_main","type":"form","isManaged":true}"#,
        )
        .unwrap();

        assert_eq!(raw.logical_name, "account_main");
        assert_eq!(raw.component_type, "form");
        assert!(raw.is_managed);
    }

    #[test]
    fn dependency_fact_accepts_id_aliases() {
        let fact: DependencyFact = serde_json::from_str(r#"{"fromId":"a","toId":"b"}"#).unwrap();
        assert_eq!(fact, DependencyFact::new("a", "b"));
    }

    #[test]
    fn virtual_placeholder_is_flagged() {
        let placeholder = Component::virtual_placeholder(&ComponentId::new("new_script.js"));

        assert!(placeholder.not_found);
        assert_eq!(placeholder.component_type, ComponentType::Other);
        assert_eq!(placeholder.logical_name, "new_script.js");
        assert!(!placeholder.has_circular_reference);
    }
}
