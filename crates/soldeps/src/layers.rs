//! Layer assignment for radial placement.
//!
//! Roots are catalog components that depend on nothing (out-degree 0). A
//! multi-source breadth-first search walks the reverse adjacency outward
//! from every root at once, so a component's layer is the smallest number of
//! "is depended on by" hops separating it from any root. Components the
//! search never reaches are orphaned: members of cycles with no path to an
//! acyclic root, their dependents, and every virtual placeholder (a missing
//! target is never a root).

use crate::domain::ComponentId;
use crate::graph::DependencyGraph;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Result of [`compute_layers`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layering {
    /// Depth of every reached component
    pub layer_of: BTreeMap<ComponentId, usize>,

    /// Components no root reaches
    pub orphaned: BTreeSet<ComponentId>,

    /// Root components, in graph order
    pub roots: Vec<ComponentId>,

    /// Reached components grouped by depth (index = depth), graph order
    /// within each ring
    rings: Vec<Vec<ComponentId>>,
}

impl Layering {
    /// Depth of a component, or `None` if it is orphaned or unknown.
    #[must_use]
    pub fn depth(&self, id: &ComponentId) -> Option<usize> {
        self.layer_of.get(id).copied()
    }

    /// Reached components grouped per depth; ring 0 holds the roots.
    #[must_use]
    pub fn rings(&self) -> &[Vec<ComponentId>] {
        &self.rings
    }

    /// Depth of the outermost ring, or `None` when nothing was reached.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.rings.len().checked_sub(1)
    }
}

/// Compute the layer of every component reachable from a root.
///
/// An empty root set (e.g. one cycle spanning the whole graph) leaves every
/// component orphaned; that is a valid outcome, not an error.
#[must_use]
pub fn compute_layers(graph: &DependencyGraph) -> Layering {
    let inner = graph.inner();
    let mut depth_of: Vec<Option<usize>> = vec![None; inner.node_count()];
    let mut queue = VecDeque::new();
    let mut roots = Vec::new();

    for node in inner.node_indices() {
        let component = &inner[node];
        if !component.not_found && graph.out_degree(&component.id) == 0 {
            depth_of[node.index()] = Some(0);
            queue.push_back((node, 0usize));
            roots.push(component.id.clone());
        }
    }

    while let Some((node, depth)) = queue.pop_front() {
        for dependent in graph.sorted_neighbors(node, Direction::Incoming) {
            let slot = &mut depth_of[dependent.index()];
            if slot.is_none() {
                *slot = Some(depth + 1);
                queue.push_back((dependent, depth + 1));
            }
        }
    }

    let mut layering = Layering {
        roots,
        ..Layering::default()
    };
    for node in inner.node_indices() {
        let id = inner[node].id.clone();
        match depth_of[node.index()] {
            Some(depth) => {
                if layering.rings.len() <= depth {
                    layering.rings.resize_with(depth + 1, Vec::new);
                }
                layering.rings[depth].push(id.clone());
                layering.layer_of.insert(id, depth);
            }
            None => {
                layering.orphaned.insert(id);
            }
        }
    }

    tracing::debug!(
        roots = layering.roots.len(),
        layered = layering.layer_of.len(),
        orphaned = layering.orphaned.len(),
        "Layers computed"
    );
    layering
}
