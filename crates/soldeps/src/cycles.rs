//! Circular reference detection.
//!
//! # Algorithm
//!
//! 1. Iterative depth-first search from every unvisited node, in graph
//!    order. The search keeps a "fully processed" set and an ordered active
//!    path. An edge into a node on the active path closes a chain: the path
//!    slice from that node to the current node. Edges into fully processed
//!    nodes are pruned, so the pass is O(V + E).
//! 2. Back edges alone do not reach every node that lies on a cycle. With
//!    `A -> B, B -> A, A -> C, C -> B`, the search closes `[A, B]` and then
//!    prunes `C -> B` because `B` is already processed, leaving `C`
//!    unflagged. A completion pass therefore runs Tarjan's SCC algorithm and,
//!    for every node of a non-trivial component not yet in any chain, adds
//!    a simple cycle through that node built from two BFS trees rooted in
//!    its component. Both trees are built once per component and neighbor
//!    lists once per run.
//!
//! After both passes a node appears in some chain exactly when it lies on a
//! cycle. The chain list is not an enumeration of all simple cycles.
//!
//! Chains are deduplicated by rotation. A self-loop is the single-member
//! chain `[n]`.

use crate::domain::ComponentId;
use crate::graph::DependencyGraph;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

/// An ordered cyclic path of components.
///
/// Each member depends on the next, and the last member depends on the
/// first. `members` does not repeat the first id; use [`CircularChain::path`]
/// for the closed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CircularChain {
    /// Members in dependency order
    pub members: Vec<ComponentId>,
}

impl CircularChain {
    /// Create a chain from its members in dependency order.
    #[must_use]
    pub fn new(members: Vec<ComponentId>) -> Self {
        Self { members }
    }

    /// The closed path `[n0, n1, ..., nk, n0]`.
    #[must_use]
    pub fn path(&self) -> Vec<&ComponentId> {
        self.members.iter().chain(self.members.first()).collect()
    }

    /// Number of distinct members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` for a chain with no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns `true` for a component that depends on itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.members.len() == 1
    }

    /// Returns `true` if `id` is a member of this chain.
    #[must_use]
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.members.contains(id)
    }
}

impl fmt::Display for CircularChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<&str> = self.path().into_iter().map(ComponentId::as_str).collect();
        f.write_str(&rendered.join(" -> "))
    }
}

/// Every id that is a member of at least one chain.
#[must_use]
pub fn circular_members(chains: &[CircularChain]) -> BTreeSet<ComponentId> {
    chains
        .iter()
        .flat_map(|chain| chain.members.iter().cloned())
        .collect()
}

/// Find circular chains in the graph.
///
/// See the module documentation for the guarantees on the returned list.
#[must_use]
pub fn find_cycles(graph: &DependencyGraph) -> Vec<CircularChain> {
    let adjacency = Adjacency::new(graph);
    let mut collector = ChainCollector::default();

    back_edge_pass(&adjacency, &mut collector);
    let back_edge_chains = collector.chains.len();
    completion_pass(graph, &adjacency, &mut collector);

    tracing::debug!(
        chains = collector.chains.len(),
        completion_chains = collector.chains.len() - back_edge_chains,
        "Cycle detection finished"
    );

    collector
        .chains
        .into_iter()
        .map(|members| {
            CircularChain::new(
                members
                    .into_iter()
                    .map(|node| graph.inner()[node].id.clone())
                    .collect(),
            )
        })
        .collect()
}

/// Sorted, deduplicated neighbor lists per node, built once per run.
struct Adjacency {
    outgoing: Vec<Vec<NodeIndex>>,
    incoming: Vec<Vec<NodeIndex>>,
}

impl Adjacency {
    fn new(graph: &DependencyGraph) -> Self {
        let lists = |direction: Direction| -> Vec<Vec<NodeIndex>> {
            graph
                .inner()
                .node_indices()
                .map(|node| graph.sorted_neighbors(node, direction))
                .collect()
        };
        Self {
            outgoing: lists(Direction::Outgoing),
            incoming: lists(Direction::Incoming),
        }
    }

    fn len(&self) -> usize {
        self.outgoing.len()
    }
}

/// Accumulates chains as node indices, dropping rotations of known chains.
#[derive(Default)]
struct ChainCollector {
    chains: Vec<Vec<NodeIndex>>,
    canonical: HashSet<Vec<NodeIndex>>,
    covered: HashSet<NodeIndex>,
}

impl ChainCollector {
    fn record(&mut self, members: Vec<NodeIndex>) {
        if members.is_empty() || !self.canonical.insert(canonical_rotation(&members)) {
            return;
        }
        self.covered.extend(members.iter().copied());
        self.chains.push(members);
    }
}

/// Rotate so the smallest index comes first.
fn canonical_rotation(members: &[NodeIndex]) -> Vec<NodeIndex> {
    let start = members
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| **node)
        .map_or(0, |(pos, _)| pos);
    members[start..]
        .iter()
        .chain(&members[..start])
        .copied()
        .collect()
}

/// One DFS frame: a node and a cursor into its outgoing neighbors.
struct Frame {
    node: NodeIndex,
    cursor: usize,
}

fn back_edge_pass(adjacency: &Adjacency, collector: &mut ChainCollector) {
    let node_count = adjacency.len();
    let mut processed = vec![false; node_count];
    // Position of each node on the active path, if it is on it.
    let mut path_position: Vec<Option<usize>> = vec![None; node_count];
    let mut path: Vec<NodeIndex> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for start in (0..node_count).map(NodeIndex::new) {
        if processed[start.index()] {
            continue;
        }
        path_position[start.index()] = Some(0);
        path.push(start);
        stack.push(Frame { node: start, cursor: 0 });

        while let Some(frame) = stack.last_mut() {
            let Some(&next) = adjacency.outgoing[frame.node.index()].get(frame.cursor) else {
                let node = frame.node;
                stack.pop();
                path.pop();
                path_position[node.index()] = None;
                processed[node.index()] = true;
                continue;
            };
            frame.cursor += 1;

            if let Some(position) = path_position[next.index()] {
                collector.record(path[position..].to_vec());
            } else if !processed[next.index()] {
                path_position[next.index()] = Some(path.len());
                path.push(next);
                stack.push(Frame { node: next, cursor: 0 });
            }
        }
    }
}

/// Cover every node of each non-trivial SCC that no back-edge chain reached.
///
/// Each component gets one BFS out-tree and one BFS in-tree from its
/// smallest node `r`. An uncovered node `v` is closed into a cycle from the
/// tree paths `r -> v` and `v -> r`, cut at the first node they share so
/// the result stays simple.
fn completion_pass(graph: &DependencyGraph, adjacency: &Adjacency, collector: &mut ChainCollector) {
    let mut in_scope = vec![false; adjacency.len()];

    for mut component in tarjan_scc(graph.inner()) {
        if component.len() < 2 || component.iter().all(|node| collector.covered.contains(node)) {
            continue;
        }
        component.sort_unstable();
        for node in &component {
            in_scope[node.index()] = true;
        }

        let root = component[0];
        let reached_from_root = bfs_tree(&adjacency.outgoing, root, &in_scope);
        let toward_root = bfs_tree(&adjacency.incoming, root, &in_scope);

        for &node in &component {
            if collector.covered.contains(&node) {
                continue;
            }
            let cycle = if node == root {
                cycle_through_root(adjacency, root, &reached_from_root, &in_scope)
            } else {
                cycle_through(node, root, &reached_from_root, &toward_root)
            };
            if let Some(cycle) = cycle {
                tracing::debug!(
                    id = %graph.inner()[node].id,
                    length = cycle.len(),
                    "Added completion chain"
                );
                collector.record(cycle);
            }
        }

        for node in &component {
            in_scope[node.index()] = false;
        }
    }
}

/// BFS from `root` along `neighbors`, restricted to `in_scope`. Maps each
/// reached node to the node it was reached from.
fn bfs_tree(
    neighbors: &[Vec<NodeIndex>],
    root: NodeIndex,
    in_scope: &[bool],
) -> HashMap<NodeIndex, NodeIndex> {
    let mut parent = HashMap::new();
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        for &next in &neighbors[current.index()] {
            if next != root && in_scope[next.index()] && !parent.contains_key(&next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    parent
}

/// Tree path `root -> .. -> node` in an out-tree.
fn path_from_root(
    parent: &HashMap<NodeIndex, NodeIndex>,
    root: NodeIndex,
    node: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut path = vec![node];
    let mut cursor = node;
    while cursor != root {
        cursor = *parent.get(&cursor)?;
        path.push(cursor);
    }
    path.reverse();
    Some(path)
}

fn cycle_through_root(
    adjacency: &Adjacency,
    root: NodeIndex,
    reached_from_root: &HashMap<NodeIndex, NodeIndex>,
    in_scope: &[bool],
) -> Option<Vec<NodeIndex>> {
    let last = adjacency.incoming[root.index()]
        .iter()
        .copied()
        .find(|&node| node != root && in_scope[node.index()])?;
    path_from_root(reached_from_root, root, last)
}

fn cycle_through(
    node: NodeIndex,
    root: NodeIndex,
    reached_from_root: &HashMap<NodeIndex, NodeIndex>,
    toward_root: &HashMap<NodeIndex, NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    let forward = path_from_root(reached_from_root, root, node)?;
    let position: HashMap<NodeIndex, usize> =
        forward.iter().enumerate().map(|(pos, &n)| (n, pos)).collect();

    // Follow the in-tree from `node` until it rejoins the forward path.
    let mut tail = Vec::new();
    let mut cursor = *toward_root.get(&node)?;
    loop {
        if let Some(&start) = position.get(&cursor) {
            let mut members = forward[start..].to_vec();
            members.extend(tail);
            return Some(members);
        }
        tail.push(cursor);
        cursor = *toward_root.get(&cursor)?;
    }
}
