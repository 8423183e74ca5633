//! Main analyzer that runs rules over a token stream.
//!
//! This module provides the `Analyzer` struct that:
//! 1. Visits every token in source order
//! 2. Runs each enabled rule that applies to the token's kind
//! 3. Turns findings into diagnostics and hands them to a reporter
//!
//! Contract violations either abort the pass or are logged and skipped,
//! depending on the configured [`ContractPolicy`].

use tracing::{debug, warn};

use crate::config::{ContractPolicy, LintConfig};
use crate::diagnostics::{Diagnostic, Reporter};
use crate::token_stream::{ContractViolation, TokenStream};

use super::rule::Rule;
use super::rules::default_rules;

// ═══════════════════════════════════════════════════════════════════════════
// Analyzer
// ═══════════════════════════════════════════════════════════════════════════

/// Runs a set of rules over token streams.
pub struct Analyzer {
    rules: Vec<Box<dyn Rule>>,
    policy: ContractPolicy,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// Create a new analyzer with default rules.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            policy: ContractPolicy::default(),
        }
    }

    /// Create an analyzer with the default rules the config leaves enabled.
    pub fn from_config(config: &LintConfig) -> Self {
        let rules = default_rules()
            .into_iter()
            .filter(|rule| config.is_rule_enabled(rule.code()))
            .collect();
        Self {
            rules,
            policy: config.contract_policy,
        }
    }

    /// Add a custom rule to the analyzer.
    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_policy(mut self, policy: ContractPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Codes of the rules this analyzer runs.
    pub fn rule_codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.code())
    }

    /// Run every rule over the stream, reporting diagnostics in source order.
    ///
    /// Returns the number of diagnostics reported.
    pub fn analyze(
        &self,
        stream: &TokenStream,
        reporter: &mut dyn Reporter,
    ) -> Result<usize, ContractViolation> {
        let mut reported = 0;
        for token in stream.iter() {
            for rule in &self.rules {
                if !rule.applies_to(token.kind) {
                    continue;
                }
                let finding = match rule.check(stream, token.position) {
                    Ok(finding) => finding,
                    Err(violation) => match self.policy {
                        ContractPolicy::AbortPass => return Err(violation),
                        ContractPolicy::SkipOccurrence => {
                            warn!(
                                rule = rule.code(),
                                position = token.position,
                                %violation,
                                "skipping occurrence"
                            );
                            continue;
                        }
                    },
                };
                if let Some(finding) = finding {
                    reporter.report(Diagnostic::new(rule.code(), finding.message, token.position));
                    reported += 1;
                }
            }
        }
        debug!(tokens = stream.len(), reported, "analysis finished");
        Ok(reported)
    }

    /// Run the analysis and collect diagnostics ordered by position.
    pub fn diagnostics(&self, stream: &TokenStream) -> Result<Vec<Diagnostic>, ContractViolation> {
        let mut diagnostics = Vec::new();
        self.analyze(stream, &mut diagnostics)?;
        diagnostics.sort_by_key(|diag| diag.position);
        Ok(diagnostics)
    }
}
