//! Soldeps - dependency-graph engine for platform solution analysis.
//!
//! Given a flat list of solution components (entities, forms, views,
//! plugins, web resources, workflows, apps) and the raw references between
//! them, this crate builds a directed dependency graph, finds circular
//! references, reports references to components that are not in the
//! solution, assigns each component a layer for radial placement, and
//! summarizes the result.
//!
//! The engine is synchronous and pure: it takes in-memory records and
//! returns an immutable [`analysis::AnalysisResult`]. Fetching metadata and
//! rendering results belong to the caller.

#![forbid(unsafe_code)]

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod cycles;
pub mod domain;
pub mod error;
pub mod extract;
pub mod graph;
pub mod input;
pub mod layers;
pub mod metrics;
pub mod warning;

pub use analysis::{AnalysisResult, Analyzer, analyze};
pub use error::{Error, Result};
