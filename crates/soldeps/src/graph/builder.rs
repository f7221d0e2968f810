//! Graph assembly from catalog components and dependency facts.

use super::DependencyGraph;
use crate::catalog::Catalog;
use crate::domain::{Component, ComponentId, DependencyFact};
use crate::warning::AnalysisWarning;
use serde::{Deserialize, Serialize};

/// A dependency whose target is not in the catalog.
///
/// The target exists in the graph as a virtual placeholder node
/// (`not_found = true`), so traversals never need to special-case it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MissingReference {
    /// The catalog component holding the reference
    pub from: ComponentId,

    /// The id that has no catalog entry
    pub to: ComponentId,
}

/// Output of [`build_graph`].
#[derive(Debug, Clone)]
pub struct GraphBuild {
    /// The assembled graph
    pub graph: DependencyGraph,

    /// One entry per distinct edge whose target is virtual, in fact order
    pub missing: Vec<MissingReference>,

    /// Facts that were dropped
    pub warnings: Vec<AnalysisWarning>,
}

/// Assemble catalog components and dependency facts into a graph.
///
/// # Fact handling
///
/// - **Unknown source**: the fact is dropped with an
///   [`AnalysisWarning::UnknownSource`]. A virtual placeholder cannot act as
///   a source either, since only catalog components hold references.
/// - **Unknown target**: a virtual placeholder is synthesized, the edge is
///   added, and a [`MissingReference`] is recorded.
/// - **Repeated fact**: the edge set is deduplicated; repeats are ignored.
/// - **Self-reference**: kept as a self-loop edge.
///
/// The function does not touch its inputs; warnings raised by the catalog
/// itself are not repeated here.
pub fn build_graph(
    catalog: &Catalog,
    facts: impl IntoIterator<Item = DependencyFact>,
) -> GraphBuild {
    let mut graph = DependencyGraph::default();
    for component in catalog.components() {
        graph.add_node(component.clone());
    }

    let mut missing = Vec::new();
    let mut warnings = Vec::new();
    let mut duplicates = 0usize;

    for fact in facts {
        let Some(from_node) = graph.node_index(&fact.from).filter(|_| catalog.contains(&fact.from))
        else {
            tracing::warn!(
                from = %fact.from,
                to = %fact.to,
                "Dependency source is not a known component, skipping"
            );
            warnings.push(AnalysisWarning::UnknownSource {
                from: fact.from,
                to: fact.to,
            });
            continue;
        };

        let to_node = match graph.node_index(&fact.to) {
            Some(node) => node,
            None => {
                tracing::debug!(to = %fact.to, "Synthesizing placeholder for missing target");
                graph.add_node(Component::virtual_placeholder(&fact.to))
            }
        };

        if !graph.add_edge(from_node, to_node) {
            duplicates += 1;
            continue;
        }

        if graph.inner()[to_node].not_found {
            missing.push(MissingReference {
                from: fact.from,
                to: fact.to,
            });
        }
    }

    tracing::debug!(
        nodes = graph.len(),
        edges = graph.edge_count(),
        missing = missing.len(),
        duplicates,
        dropped = warnings.len(),
        "Graph built"
    );

    GraphBuild {
        graph,
        missing,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::domain::{ComponentType, RawComponent};

    fn catalog(ids: &[&str]) -> Catalog {
        build_catalog(
            ids.iter()
                .map(|id| RawComponent::new(*id, "form", *id))
                .collect(),
        )
    }

    fn id(s: &str) -> ComponentId {
        ComponentId::new(s)
    }

    #[test]
    fn missing_target_becomes_virtual_node() {
        let build = build_graph(&catalog(&["d"]), [DependencyFact::new("d", "e")]);

        assert_eq!(
            build.missing,
            vec![MissingReference {
                from: id("d"),
                to: id("e")
            }]
        );
        let e = build.graph.get(&id("e")).unwrap();
        assert!(e.not_found);
        assert_eq!(e.component_type, ComponentType::Other);
        assert_eq!(e.logical_name, "e");
        assert_eq!(build.graph.out_degree(&id("d")), 1);
    }

    #[test]
    fn unknown_source_is_dropped_with_warning() {
        let build = build_graph(&catalog(&["a"]), [DependencyFact::new("ghost", "a")]);

        assert_eq!(build.graph.edge_count(), 0);
        assert!(!build.graph.contains(&id("ghost")));
        assert_eq!(
            build.warnings,
            vec![AnalysisWarning::UnknownSource {
                from: id("ghost"),
                to: id("a")
            }]
        );
    }

    #[test]
    fn virtual_node_cannot_be_a_source() {
        let build = build_graph(
            &catalog(&["a"]),
            [DependencyFact::new("a", "x"), DependencyFact::new("x", "a")],
        );

        assert_eq!(build.graph.edge_count(), 1);
        assert_eq!(build.graph.out_degree(&id("x")), 0);
        assert_eq!(build.warnings.len(), 1);
    }

    #[test]
    fn repeated_facts_are_deduplicated() {
        let build = build_graph(
            &catalog(&["a", "b"]),
            [
                DependencyFact::new("a", "b"),
                DependencyFact::new("a", "b"),
                DependencyFact::new("a", "z"),
                DependencyFact::new("a", "z"),
            ],
        );

        assert_eq!(build.graph.edge_count(), 2);
        assert_eq!(build.missing.len(), 1);
    }

    #[test]
    fn shared_missing_target_gets_one_placeholder() {
        let build = build_graph(
            &catalog(&["a", "b"]),
            [DependencyFact::new("a", "z"), DependencyFact::new("b", "z")],
        );

        assert_eq!(build.graph.len(), 3);
        assert_eq!(build.missing.len(), 2);
        assert_eq!(build.graph.dependents(&id("z")), vec![&id("a"), &id("b")]);
    }

    #[test]
    fn self_reference_is_kept() {
        let build = build_graph(&catalog(&["a"]), [DependencyFact::new("a", "a")]);

        assert_eq!(build.graph.edge_count(), 1);
        assert!(build.missing.is_empty());
    }
}
