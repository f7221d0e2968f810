//! Serializable form of [`DependencyGraph`].

use super::DependencyGraph;
use crate::domain::{Component, DependencyEdge};
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Flat node and edge lists, in graph order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Every node, virtual placeholders included
    pub components: Vec<Component>,

    /// Every edge
    pub edges: Vec<DependencyEdge>,
}

impl From<DependencyGraph> for GraphSnapshot {
    fn from(graph: DependencyGraph) -> Self {
        let edges = graph.edges();
        Self {
            components: graph.components().cloned().collect(),
            edges,
        }
    }
}

impl TryFrom<GraphSnapshot> for DependencyGraph {
    type Error = Error;

    /// Rebuild a graph, rejecting snapshots that break its invariants:
    /// duplicate node ids, edges naming unknown nodes, edges leaving a
    /// virtual node, or repeated edges.
    fn try_from(snapshot: GraphSnapshot) -> Result<Self, Self::Error> {
        let mut graph = DependencyGraph::default();

        for component in snapshot.components {
            if graph.contains(&component.id) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate component id {}",
                    component.id
                )));
            }
            graph.add_node(component);
        }

        for edge in snapshot.edges {
            let from = graph.node_index(&edge.from).ok_or_else(|| {
                Error::InvalidSnapshot(format!("edge source {} is not a component", edge.from))
            })?;
            let to = graph.node_index(&edge.to).ok_or_else(|| {
                Error::InvalidSnapshot(format!("edge target {} is not a component", edge.to))
            })?;
            if graph.inner()[from].not_found {
                return Err(Error::InvalidSnapshot(format!(
                    "edge source {} is a missing component",
                    edge.from
                )));
            }
            if !graph.add_edge(from, to) {
                return Err(Error::InvalidSnapshot(format!(
                    "duplicate edge {} -> {}",
                    edge.from, edge.to
                )));
            }
        }

        Ok(graph)
    }
}
