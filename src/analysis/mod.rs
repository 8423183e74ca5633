//! Static analysis over token streams.
//!
//! The analysis is structured as:
//! - `rule`: pluggable rule trait and findings
//! - `rules`: individual rules (currently unused variable detection)
//! - `analyzer`: runs every enabled rule over a stream and reports diagnostics

pub mod analyzer;
pub mod rule;
pub mod rules;

pub use analyzer::Analyzer;
pub use rule::{Finding, Rule};
pub use rules::{default_rules, UnusedVariableRule};
