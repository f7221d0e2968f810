//! Summary metrics over a built graph.
//!
//! All per-component figures are taken over catalog components only;
//! virtual placeholders are counted separately in
//! [`Metrics::virtual_components`]. Edges into placeholders still count
//! toward their source's out-degree.

use crate::config::{AnalysisConfig, DEFAULT_SCORE_PRECISION, DEFAULT_TOP_CONNECTED};
use crate::cycles::{CircularChain, circular_members};
use crate::domain::{ComponentId, ComponentType};
use crate::graph::DependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Weight of the average out-degree in the complexity score.
const FAN_OUT_WEIGHT: f64 = 10.0;

/// Weight of each distinct circular chain in the complexity score.
const CHAIN_WEIGHT: f64 = 10.0;

/// Largest supported rounding precision; f64 carries ~15 significant digits.
const MAX_SCORE_PRECISION: u32 = 15;

/// Caller policy for [`compute_metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsOptions {
    /// How many components the most-connected ranking keeps
    pub top_n: usize,

    /// Decimal places kept in the complexity score
    pub score_precision: u32,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_CONNECTED,
            score_precision: DEFAULT_SCORE_PRECISION,
        }
    }
}

impl From<&AnalysisConfig> for MetricsOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            top_n: config.top_connected,
            score_precision: config.score_precision,
        }
    }
}

/// One entry of the most-connected ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedComponent {
    /// Component id
    pub id: ComponentId,

    /// Display name
    pub name: String,

    /// Component kind
    pub component_type: ComponentType,

    /// Number of components it depends on
    pub out_degree: usize,

    /// Number of components depending on it
    pub in_degree: usize,
}

impl ConnectedComponent {
    /// Ranking key: `out_degree + in_degree`.
    #[must_use]
    pub fn connections(&self) -> usize {
        self.out_degree + self.in_degree
    }
}

/// Aggregate figures for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Catalog components per kind
    pub type_counts: BTreeMap<ComponentType, usize>,

    /// Highest-degree catalog components, ties in catalog order
    pub most_connected: Vec<ConnectedComponent>,

    /// `average_out_degree * 10 + circular_chains * 10`, rounded
    pub complexity_score: f64,

    /// Mean out-degree over catalog components (unrounded)
    pub average_out_degree: f64,

    /// Number of catalog components
    pub total_components: usize,

    /// Number of virtual placeholders
    pub virtual_components: usize,

    /// Number of distinct edges
    pub total_edges: usize,

    /// Number of distinct circular chains
    pub circular_chains: usize,

    /// Number of components flagged circular
    pub circular_components: usize,
}

/// Compute metrics for a graph and its detected chains.
#[must_use]
pub fn compute_metrics(
    graph: &DependencyGraph,
    cycles: &[CircularChain],
    options: &MetricsOptions,
) -> Metrics {
    let mut type_counts = BTreeMap::new();
    let mut ranked = Vec::new();
    let mut total_out = 0usize;
    let mut virtual_components = 0usize;

    for component in graph.components() {
        if component.not_found {
            virtual_components += 1;
            continue;
        }
        *type_counts.entry(component.component_type).or_insert(0) += 1;

        let entry = ConnectedComponent {
            id: component.id.clone(),
            name: component.name.clone(),
            component_type: component.component_type,
            out_degree: graph.out_degree(&component.id),
            in_degree: graph.in_degree(&component.id),
        };
        total_out += entry.out_degree;
        ranked.push(entry);
    }

    let total_components = ranked.len();
    let average_out_degree = average(total_out, total_components);

    // Stable sort keeps catalog order among equal connection counts.
    ranked.sort_by(|a, b| b.connections().cmp(&a.connections()));
    ranked.truncate(options.top_n);

    let complexity_score = complexity_score(average_out_degree, cycles.len(), options.score_precision);

    Metrics {
        type_counts,
        most_connected: ranked,
        complexity_score,
        average_out_degree,
        total_components,
        virtual_components,
        total_edges: graph.edge_count(),
        circular_chains: cycles.len(),
        circular_components: circular_members(cycles).len(),
    }
}

/// `average_out_degree * 10 + chains * 10`, rounded to `precision` places.
#[must_use]
pub fn complexity_score(average_out_degree: f64, chains: usize, precision: u32) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let raw = average_out_degree * FAN_OUT_WEIGHT + chains as f64 * CHAIN_WEIGHT;
    round_to(raw, precision)
}

#[allow(clippy::cast_precision_loss)]
fn average(total: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let exponent = i32::try_from(places.min(MAX_SCORE_PRECISION)).unwrap_or(0);
    let factor = 10f64.powi(exponent);
    (value * factor).round() / factor
}

/// Qualitative complexity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityBand {
    /// Below the moderate threshold
    Low,

    /// At or above the moderate threshold, below high
    Moderate,

    /// At or above the high threshold
    High,
}

impl fmt::Display for ComplexityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

/// Caller-chosen thresholds for bucketing a complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexityBands {
    /// Scores at or above this are at least moderate
    pub moderate: f64,

    /// Scores at or above this are high
    pub high: f64,
}

impl Default for ComplexityBands {
    fn default() -> Self {
        Self {
            moderate: 20.0,
            high: 50.0,
        }
    }
}

impl ComplexityBands {
    /// Bucket a score.
    #[must_use]
    pub fn classify(&self, score: f64) -> ComplexityBand {
        if score >= self.high {
            ComplexityBand::High
        } else if score >= self.moderate {
            ComplexityBand::Moderate
        } else {
            ComplexityBand::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::cycles::find_cycles;
    use crate::domain::{DependencyFact, RawComponent};
    use crate::graph::build_graph;
    use rstest::rstest;

    fn graph_of(components: &[(&str, &str)], facts: &[(&str, &str)]) -> DependencyGraph {
        let catalog = build_catalog(
            components
                .iter()
                .map(|(id, kind)| RawComponent::new(*id, *kind, *id))
                .collect(),
        );
        build_graph(
            &catalog,
            facts.iter().map(|(f, t)| DependencyFact::new(*f, *t)),
        )
        .graph
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn counts_types_over_catalog_components() {
        let graph = graph_of(
            &[("a", "entity"), ("b", "entity"), ("f", "form")],
            &[("f", "a"), ("f", "lib.js")],
        );

        let metrics = compute_metrics(&graph, &[], &MetricsOptions::default());

        assert_eq!(metrics.type_counts[&ComponentType::Entity], 2);
        assert_eq!(metrics.type_counts[&ComponentType::Form], 1);
        assert!(!metrics.type_counts.contains_key(&ComponentType::Other));
        assert_eq!(metrics.total_components, 3);
        assert_eq!(metrics.virtual_components, 1);
        assert_eq!(metrics.total_edges, 2);
    }

    #[test]
    fn most_connected_breaks_ties_by_catalog_order() {
        let graph = graph_of(
            &[("a", "entity"), ("b", "entity"), ("c", "entity"), ("d", "entity")],
            &[("a", "b"), ("c", "d")],
        );

        let metrics = compute_metrics(
            &graph,
            &[],
            &MetricsOptions {
                top_n: 3,
                ..MetricsOptions::default()
            },
        );

        let ids: Vec<&str> = metrics.most_connected.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn most_connected_ranks_by_total_degree() {
        let graph = graph_of(
            &[("low", "entity"), ("hub", "entity"), ("x", "form"), ("y", "form")],
            &[("x", "hub"), ("y", "hub"), ("hub", "low")],
        );

        let metrics = compute_metrics(&graph, &[], &MetricsOptions::default());

        let top = &metrics.most_connected[0];
        assert_eq!(top.id.as_str(), "hub");
        assert_eq!((top.out_degree, top.in_degree), (1, 2));
        assert_eq!(top.connections(), 3);
    }

    #[test]
    fn complexity_score_combines_fan_out_and_chains() {
        // Every component has out-degree 2, forming one strongly connected ring.
        let graph = graph_of(
            &[("a", "entity"), ("b", "entity"), ("c", "entity")],
            &[("a", "b"), ("a", "c"), ("b", "c"), ("b", "x"), ("c", "a"), ("c", "x")],
        );
        let cycles = find_cycles(&graph);

        let metrics = compute_metrics(&graph, &cycles, &MetricsOptions::default());

        assert_close(metrics.average_out_degree, 2.0);
        assert_eq!(metrics.circular_chains, 1);
        assert_close(metrics.complexity_score, 30.0);
    }

    #[test]
    fn empty_graph_scores_zero() {
        let metrics = compute_metrics(&DependencyGraph::default(), &[], &MetricsOptions::default());

        assert_close(metrics.complexity_score, 0.0);
        assert!(metrics.most_connected.is_empty());
    }

    #[rstest]
    #[case::whole(2.0, 1, 0, 30.0)]
    #[case::one_place(1.333_333, 0, 1, 13.3)]
    #[case::two_places(1.666_666, 2, 2, 36.67)]
    #[case::no_cycles(0.5, 0, 1, 5.0)]
    fn complexity_score_rounds_to_precision(
        #[case] average_out_degree: f64,
        #[case] chains: usize,
        #[case] precision: u32,
        #[case] expected: f64,
    ) {
        assert_close(complexity_score(average_out_degree, chains, precision), expected);
    }

    #[rstest]
    #[case::low(19.9, ComplexityBand::Low)]
    #[case::moderate_boundary(20.0, ComplexityBand::Moderate)]
    #[case::moderate(49.0, ComplexityBand::Moderate)]
    #[case::high(50.0, ComplexityBand::High)]
    fn default_bands_classify(#[case] score: f64, #[case] expected: ComplexityBand) {
        assert_eq!(ComplexityBands::default().classify(score), expected);
    }
}
