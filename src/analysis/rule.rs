//! Rule trait for pluggable token-level analyses.
//!
//! This module defines the `Rule` trait that lets individual checks be
//! composed into the [`Analyzer`](super::analyzer::Analyzer).

use crate::token::TokenKind;
use crate::token_stream::{ContractViolation, TokenStream};

// ═══════════════════════════════════════════════════════════════════════════
// Finding - result of a rule
// ═══════════════════════════════════════════════════════════════════════════

/// A problem found by a rule at the token it was invoked on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    /// Human-readable description of the issue
    pub message: String,
}

impl Finding {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rule trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for rules that examine individual tokens.
///
/// The analyzer calls [`Rule::check`] once for every token whose kind the
/// rule [applies to](Rule::applies_to), in source order. Rules only read the
/// stream; each call is independent of every other.
///
/// # Example
///
/// ```ignore
/// struct MyRule;
///
/// impl Rule for MyRule {
///     fn code(&self) -> &'static str {
///         "MY_RULE"
///     }
///
///     fn applies_to(&self, kind: TokenKind) -> bool {
///         kind == TokenKind::Variable
///     }
///
///     fn check(
///         &self,
///         stream: &TokenStream,
///         position: usize,
///     ) -> Result<Option<Finding>, ContractViolation> {
///         Ok(None)
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Stable identifier reported with every diagnostic.
    fn code(&self) -> &'static str;

    /// Whether the rule wants to see tokens of this kind.
    fn applies_to(&self, kind: TokenKind) -> bool;

    /// Inspect the token at `position`.
    ///
    /// Returns `Err` only when the stream breaks its metadata contract.
    fn check(
        &self,
        stream: &TokenStream,
        position: usize,
    ) -> Result<Option<Finding>, ContractViolation>;
}
