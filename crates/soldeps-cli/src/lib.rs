//! Soldeps CLI - command-line front end for the soldeps analyzer.
//!
//! Reads component, dependency and payload documents from disk, runs one
//! analysis and prints a summary or the full JSON result.

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod output;
