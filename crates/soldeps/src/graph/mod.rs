//! Directed dependency graph over catalog components.
//!
//! # Edge Direction Convention
//!
//! Edges point from **dependent -> dependency**:
//!
//! - **Edge source**: the component that holds the reference
//! - **Edge target**: the component being referenced
//!
//! A form that loads `new_/account.js` is the edge `form -> web resource`.
//! Components with no outgoing edges depend on nothing and are the roots
//! of the layering.
//!
//! # Representation
//!
//! The graph is a `petgraph::DiGraph<Component, ()>` plus a
//! `HashMap<ComponentId, NodeIndex>`. petgraph keeps an outgoing and an
//! incoming edge list per node, which are the forward and reverse adjacency
//! maps; both are reachable in O(1) from an id and are mutual inverses by
//! construction. Node indices follow insertion order (catalog order, then
//! virtual placeholders in first-seen order), and every neighbor listing is
//! returned in that order so downstream traversals are deterministic.

mod builder;
mod snapshot;

pub use builder::{GraphBuild, MissingReference, build_graph};
pub use snapshot::GraphSnapshot;

use crate::domain::{Component, ComponentId, DependencyEdge};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// The assembled dependency graph.
///
/// Serializes as a [`GraphSnapshot`] (components plus edge list);
/// deserialization re-validates the graph invariants.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(into = "GraphSnapshot", try_from = "GraphSnapshot")]
pub struct DependencyGraph {
    /// Nodes hold the component, edges carry no weight.
    graph: DiGraph<Component, ()>,

    /// Mapping from component id to graph node.
    ///
    /// Every node in `graph` has exactly one entry here.
    node_map: HashMap<ComponentId, NodeIndex>,
}

impl DependencyGraph {
    /// Number of nodes, virtual placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> + '_ {
        self.graph.node_indices().map(|node| &self.graph[node])
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.node_map.get(id).map(|&node| &self.graph[node])
    }

    /// Returns `true` if a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Forward adjacency: the components `id` depends on.
    ///
    /// Returns an empty list for unknown ids.
    #[must_use]
    pub fn dependencies(&self, id: &ComponentId) -> Vec<&ComponentId> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    /// Reverse adjacency: the components that depend on `id`.
    ///
    /// Returns an empty list for unknown ids.
    #[must_use]
    pub fn dependents(&self, id: &ComponentId) -> Vec<&ComponentId> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// Number of outgoing edges (a self-loop counts once).
    #[must_use]
    pub fn out_degree(&self, id: &ComponentId) -> usize {
        self.degree(id, Direction::Outgoing)
    }

    /// Number of incoming edges (a self-loop counts once).
    #[must_use]
    pub fn in_degree(&self, id: &ComponentId) -> usize {
        self.degree(id, Direction::Incoming)
    }

    /// All edges, ordered by source then target insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.graph
            .node_indices()
            .flat_map(|node| {
                self.sorted_neighbors(node, Direction::Outgoing)
                    .into_iter()
                    .map(move |target| (node, target))
            })
            .map(|(source, target)| DependencyEdge {
                from: self.graph[source].id.clone(),
                to: self.graph[target].id.clone(),
            })
            .collect()
    }

    /// Forward adjacency as an ordered map (id -> targets).
    #[must_use]
    pub fn forward_adjacency(&self) -> BTreeMap<ComponentId, BTreeSet<ComponentId>> {
        self.adjacency(Direction::Outgoing)
    }

    /// Reverse adjacency as an ordered map (id -> sources).
    #[must_use]
    pub fn reverse_adjacency(&self) -> BTreeMap<ComponentId, BTreeSet<ComponentId>> {
        self.adjacency(Direction::Incoming)
    }

    /// The underlying petgraph graph.
    pub(crate) fn inner(&self) -> &DiGraph<Component, ()> {
        &self.graph
    }

    /// Node index for an id.
    pub(crate) fn node_index(&self, id: &ComponentId) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Neighbors of a node in insertion order, without repeats.
    pub(crate) fn sorted_neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Set `has_circular_reference` on exactly the given nodes.
    pub(crate) fn mark_circular<'a>(&mut self, ids: impl IntoIterator<Item = &'a ComponentId>) {
        for component in self.graph.node_weights_mut() {
            component.has_circular_reference = false;
        }
        for id in ids {
            if let Some(&node) = self.node_map.get(id) {
                self.graph[node].has_circular_reference = true;
            }
        }
    }

    fn add_node(&mut self, component: Component) -> NodeIndex {
        let id = component.id.clone();
        let node = self.graph.add_node(component);
        self.node_map.insert(id, node);
        node
    }

    /// Add an edge unless it already exists. Returns `true` if added.
    fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) -> bool {
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, ());
        true
    }

    fn neighbor_ids(&self, id: &ComponentId, direction: Direction) -> Vec<&ComponentId> {
        let Some(&node) = self.node_map.get(id) else {
            return Vec::new();
        };
        self.sorted_neighbors(node, direction)
            .into_iter()
            .map(|neighbor| &self.graph[neighbor].id)
            .collect()
    }

    fn degree(&self, id: &ComponentId, direction: Direction) -> usize {
        self.node_map
            .get(id)
            .map_or(0, |&node| self.graph.edges_directed(node, direction).count())
    }

    fn adjacency(&self, direction: Direction) -> BTreeMap<ComponentId, BTreeSet<ComponentId>> {
        self.graph
            .node_indices()
            .map(|node| {
                let neighbors: BTreeSet<ComponentId> = self
                    .graph
                    .edges_directed(node, direction)
                    .map(|edge| {
                        let other = match direction {
                            Direction::Outgoing => edge.target(),
                            Direction::Incoming => edge.source(),
                        };
                        self.graph[other].id.clone()
                    })
                    .collect();
                (self.graph[node].id.clone(), neighbors)
            })
            .collect()
    }
}

impl PartialEq for DependencyGraph {
    fn eq(&self, other: &Self) -> bool {
        self.components().eq(other.components()) && self.edges() == other.edges()
    }
}

impl Eq for DependencyGraph {}
