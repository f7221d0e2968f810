//! The analysis pipeline and its immutable result.
//!
//! One call runs the whole pipeline on fully materialized input:
//!
//! ```text
//! validate -> catalog -> extract -> graph -> cycles -> layers -> metrics
//! ```
//!
//! Nothing is cached between calls; every run returns a fresh
//! [`AnalysisResult`] that replaces the previous one wholesale.
//!
//! # Example
//!
//! ```
//! use soldeps::analysis::Analyzer;
//! use soldeps::domain::{DependencyFact, RawComponent};
//!
//! let components = vec![
//!     RawComponent::new("a", "entity", "account"),
//!     RawComponent::new("f", "form", "account_main"),
//! ];
//! let facts = vec![DependencyFact::new("f", "a"), DependencyFact::new("f", "new_/lib.js")];
//!
//! let result = Analyzer::default().analyze(components, facts)?;
//!
//! assert_eq!(result.missing().len(), 1);
//! assert_eq!(result.layering().roots.len(), 1);
//! # Ok::<(), soldeps::error::Error>(())
//! ```

use crate::catalog::build_catalog;
use crate::config::AnalysisConfig;
use crate::cycles::{CircularChain, circular_members, find_cycles};
use crate::domain::{ComponentId, DependencyFact, RawComponent};
use crate::error::{Error, Result};
use crate::extract::{ReferenceExtractor, ReferencePayload};
use crate::graph::{DependencyGraph, MissingReference, build_graph};
use crate::input::{
    parse_components, parse_facts, validate_components, validate_facts, validate_payloads,
};
use crate::layers::{Layering, compute_layers};
use crate::metrics::{ComplexityBand, Metrics, MetricsOptions, compute_metrics};
use crate::warning::AnalysisWarning;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Immutable snapshot of one analysis run.
///
/// Serializes losslessly (chain order, missing references, flags, layers,
/// metrics and warnings); [`AnalysisResult::from_json`] re-validates graph
/// invariants and every derived field that is a pure function of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    graph: DependencyGraph,
    cycles: Vec<CircularChain>,
    layering: Layering,
    metrics: Metrics,
    missing: Vec<MissingReference>,
    warnings: Vec<AnalysisWarning>,
}

impl AnalysisResult {
    /// The dependency graph, circular flags applied.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Circular chains in detection order.
    #[must_use]
    pub fn cycles(&self) -> &[CircularChain] {
        &self.cycles
    }

    /// Layer assignment and orphaned set.
    #[must_use]
    pub fn layering(&self) -> &Layering {
        &self.layering
    }

    /// Summary metrics.
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Edges whose target is not in the catalog.
    #[must_use]
    pub fn missing(&self) -> &[MissingReference] {
        &self.missing
    }

    /// Recoverable problems encountered during the run.
    #[must_use]
    pub fn warnings(&self) -> &[AnalysisWarning] {
        &self.warnings
    }

    /// Ids of every component flagged circular.
    #[must_use]
    pub fn circular_components(&self) -> BTreeSet<ComponentId> {
        self.graph
            .components()
            .filter(|component| component.has_circular_reference)
            .map(|component| component.id.clone())
            .collect()
    }

    /// Bucket the complexity score with the given thresholds.
    #[must_use]
    pub fn complexity_band(&self, config: &AnalysisConfig) -> ComplexityBand {
        config.complexity_bands.classify(self.metrics.complexity_score)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a result previously produced by [`AnalysisResult::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for malformed JSON and
    /// [`Error::InvalidSnapshot`] when the graph invariants do not hold, or
    /// when the circular flags, missing references or layers disagree with
    /// the graph.
    pub fn from_json(text: &str) -> Result<Self> {
        let result: Self = serde_json::from_str(text)?;
        result.validate()?;
        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        let members = circular_members(&self.cycles);
        if let Some(unknown) = members.iter().find(|id| !self.graph.contains(id)) {
            return Err(Error::InvalidSnapshot(format!(
                "chain member {unknown} is not a component"
            )));
        }
        if members != self.circular_components() {
            return Err(Error::InvalidSnapshot(
                "circular flags disagree with chain membership".to_string(),
            ));
        }

        let dangling: BTreeSet<(ComponentId, ComponentId)> = self
            .graph
            .edges()
            .into_iter()
            .filter(|edge| self.graph.get(&edge.to).is_some_and(|c| c.not_found))
            .map(|edge| (edge.from, edge.to))
            .collect();
        let reported: BTreeSet<(ComponentId, ComponentId)> = self
            .missing
            .iter()
            .map(|m| (m.from.clone(), m.to.clone()))
            .collect();
        if reported.len() != self.missing.len() || reported != dangling {
            return Err(Error::InvalidSnapshot(
                "missing references disagree with placeholder edges".to_string(),
            ));
        }

        if self.layering != compute_layers(&self.graph) {
            return Err(Error::InvalidSnapshot(
                "layers disagree with the graph".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs the analysis pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer with the given configuration.
    #[must_use]
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze components and already-extracted dependency facts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any component or fact id is blank.
    /// Every other data problem is reported as a warning or a missing
    /// reference in the result.
    pub fn analyze(
        &self,
        components: Vec<RawComponent>,
        facts: Vec<DependencyFact>,
    ) -> Result<AnalysisResult> {
        self.analyze_with_payloads(components, facts, &[])
    }

    /// Analyze components, dependency facts and type-specific payloads.
    ///
    /// Payload facts are appended after the explicit facts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any component, fact or payload id
    /// is blank.
    pub fn analyze_with_payloads(
        &self,
        components: Vec<RawComponent>,
        mut facts: Vec<DependencyFact>,
        payloads: &[ReferencePayload],
    ) -> Result<AnalysisResult> {
        validate_components(&components)?;
        validate_facts(&facts)?;
        validate_payloads(payloads)?;

        tracing::debug!(
            components = components.len(),
            facts = facts.len(),
            payloads = payloads.len(),
            "Starting analysis"
        );

        let catalog = build_catalog(components);
        facts.extend(ReferenceExtractor::new(&catalog).extract_all(payloads));

        let build = build_graph(&catalog, facts);
        let mut graph = build.graph;
        let mut warnings = catalog.warnings().to_vec();
        warnings.extend(build.warnings);

        let cycles = find_cycles(&graph);
        graph.mark_circular(&circular_members(&cycles));

        let layering = compute_layers(&graph);
        let metrics = compute_metrics(&graph, &cycles, &MetricsOptions::from(&self.config));

        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            cycles = cycles.len(),
            missing = build.missing.len(),
            warnings = warnings.len(),
            score = metrics.complexity_score,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            graph,
            cycles,
            layering,
            metrics,
            missing: build.missing,
            warnings,
        })
    }

    /// Parse JSON component and fact lists, then analyze them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] or [`Error::Json`] if either document
    /// is malformed; no partial result is produced.
    pub fn analyze_json(&self, components_json: &str, facts_json: &str) -> Result<AnalysisResult> {
        let components = parse_components(components_json)?;
        let facts = parse_facts(facts_json)?;
        self.analyze(components, facts)
    }
}

/// Analyze with the default configuration.
///
/// # Errors
///
/// See [`Analyzer::analyze`].
pub fn analyze(
    components: Vec<RawComponent>,
    facts: Vec<DependencyFact>,
) -> Result<AnalysisResult> {
    Analyzer::default().analyze(components, facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawComponent {
        RawComponent::new(id, "entity", id)
    }

    #[test]
    fn warnings_from_every_stage_are_collected() {
        let result = analyze(
            vec![raw("a"), raw("a"), RawComponent::new("s", "sitemap", "s")],
            vec![DependencyFact::new("ghost", "a")],
        )
        .unwrap();

        assert_eq!(result.warnings().len(), 3);
        assert!(matches!(
            result.warnings()[2],
            AnalysisWarning::UnknownSource { .. }
        ));
    }

    #[test]
    fn blank_fact_id_is_fatal() {
        let err = analyze(vec![raw("a")], vec![DependencyFact::new("a", "")]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn flags_match_chains() {
        let result = analyze(
            vec![raw("a"), raw("b"), raw("c")],
            vec![DependencyFact::new("a", "b"), DependencyFact::new("b", "a")],
        )
        .unwrap();

        let flagged: Vec<String> = result.circular_components().into_iter().map(|id| id.0).collect();
        assert_eq!(flagged, vec!["a", "b"]);
        assert!(!result.graph().get(&ComponentId::new("c")).unwrap().has_circular_reference);
    }

    #[test]
    fn payloads_feed_the_graph() {
        let result = Analyzer::default()
            .analyze_with_payloads(
                vec![
                    RawComponent::new("e", "entity", "account"),
                    RawComponent::new("v", "view", "active_accounts"),
                ],
                vec![],
                &[ReferencePayload::View {
                    view_id: ComponentId::new("v"),
                    entities: vec!["account".to_string(), "contact".to_string()],
                }],
            )
            .unwrap();

        assert_eq!(result.graph().out_degree(&ComponentId::new("v")), 2);
        assert_eq!(
            result.missing(),
            &[MissingReference {
                from: ComponentId::new("v"),
                to: ComponentId::new("contact"),
            }]
        );
    }

    #[test]
    fn from_json_rejects_inconsistent_flags() {
        let result = analyze(
            vec![raw("a"), raw("b")],
            vec![DependencyFact::new("a", "b"), DependencyFact::new("b", "a")],
        )
        .unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        value["cycles"] = serde_json::json!([]);

        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }

    fn layered_with_missing() -> serde_json::Value {
        let result = analyze(
            vec![raw("a"), raw("b"), raw("d")],
            vec![DependencyFact::new("a", "b"), DependencyFact::new("d", "e")],
        )
        .unwrap();
        serde_json::from_str(&result.to_json().unwrap()).unwrap()
    }

    #[test]
    fn from_json_rejects_rings_that_disagree_with_depths() {
        let mut value = layered_with_missing();
        assert_eq!(value["layering"]["rings"], serde_json::json!([["b"], ["a"]]));
        value["layering"]["rings"] = serde_json::json!([["a"], ["b"]]);

        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }

    #[test]
    fn from_json_rejects_edited_depths() {
        let mut value = layered_with_missing();
        value["layering"]["layer_of"]["a"] = serde_json::json!(5);

        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }

    #[test]
    fn from_json_rejects_dropped_missing_reference() {
        let mut value = layered_with_missing();
        value["missing"] = serde_json::json!([]);

        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }

    #[test]
    fn from_json_rejects_missing_reference_to_catalog_component() {
        let mut value = layered_with_missing();
        value["missing"] = serde_json::json!([{"from": "a", "to": "b"}]);

        let err = AnalysisResult::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::InvalidSnapshot(_)));
    }

    #[test]
    fn from_json_accepts_untouched_snapshot() {
        let value = layered_with_missing();
        let restored = AnalysisResult::from_json(&value.to_string()).unwrap();
        assert_eq!(restored.layering().rings().len(), 2);
        assert_eq!(restored.missing().len(), 1);
    }

    #[test]
    fn blank_payload_id_names_the_payload_field() {
        let err = Analyzer::default()
            .analyze_with_payloads(
                vec![raw("f")],
                vec![],
                &[ReferencePayload::Form {
                    form_id: ComponentId::new(""),
                    entity: Some("f".to_string()),
                    libraries: vec![],
                }],
            )
            .unwrap_err();

        match err {
            Error::InvalidInput { context, .. } => assert_eq!(context, "payloads[0].form_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_id_leaves_shared_name_with_remaining_owner() {
        let result = Analyzer::default()
            .analyze_with_payloads(
                vec![
                    RawComponent::new("x", "entity", "account"),
                    RawComponent::new("y", "entity", "account"),
                    RawComponent::new("x", "entity", "contact"),
                    RawComponent::new("v", "view", "active_accounts"),
                ],
                vec![],
                &[ReferencePayload::View {
                    view_id: ComponentId::new("v"),
                    entities: vec!["account".to_string()],
                }],
            )
            .unwrap();

        assert_eq!(
            result.graph().dependencies(&ComponentId::new("v")),
            vec![&ComponentId::new("y")]
        );
        assert!(result.missing().is_empty());
    }

    #[test]
    fn complexity_band_uses_config_thresholds() {
        let result = analyze(
            vec![raw("a"), raw("b")],
            vec![DependencyFact::new("a", "b"), DependencyFact::new("b", "a")],
        )
        .unwrap();
        // avg out-degree 1.0 and one chain: 10 + 10
        let config = AnalysisConfig::default();

        assert!((result.metrics().complexity_score - 20.0).abs() < 1e-9);
        assert_eq!(result.complexity_band(&config), ComplexityBand::Moderate);
    }
}
