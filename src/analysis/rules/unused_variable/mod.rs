//! Unused variable detection.
//!
//! Flags a write to a local variable when nothing in its scope ever reads
//! the value afterwards.
//!
//! # Decision pipeline
//!
//! Each variable occurrence is handled on its own:
//!
//! 1. `classify`: is this occurrence a write at all?
//! 2. `exemptions`: is the write observable through a loop, a `static`
//!    declaration, or a reference?
//! 3. `scope`: which token range can consume the value?
//! 4. `usage`: does any later occurrence in that range read it?
//!
//! A write that is classified, not exempt, and never read is reported.
//!
//! # Example
//!
//! ```text
//! <?php
//! function total(array $items) {
//!     $sum = 0;
//!     $unused = 1;        // Unused variable $unused.
//!     foreach ($items as $item) {
//!         $sum += $item;
//!     }
//!     return $sum;
//! }
//! ```

mod classify;
mod exemptions;
mod scope;
mod usage;

#[cfg(test)]
mod tests;

use tracing::trace;

use crate::analysis::rule::{Finding, Rule};
use crate::token::TokenKind;
use crate::token_stream::{ContractViolation, TokenStream};

pub use classify::{classify, Classification, WriteKind};
pub use exemptions::{find_exemption, Exemption};
pub use scope::{enclosing_function, resolve, ScopeBoundary, ScopeOwner};
pub use usage::{has_later_usage, is_in_same_scope};

/// Rule code attached to every unused-variable diagnostic.
pub const CODE: &str = "UNUSED_VARIABLE";

/// Why an occurrence produced no diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The occurrence reads, references a member, or is a parameter default.
    NotAWrite,
    /// The write is observable through its context.
    Exempt(Exemption),
    /// A later read in the same scope consumes the value.
    Used,
}

/// Terminal state of the decision pipeline for one occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Skip(SkipReason),
    Report,
}

/// Rule reporting writes whose value is never read.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnusedVariableRule;

impl UnusedVariableRule {
    /// Run the full pipeline for the occurrence at `position`.
    pub fn evaluate(
        &self,
        stream: &TokenStream,
        position: usize,
    ) -> Result<Outcome, ContractViolation> {
        if !classify(stream, position)?.is_candidate() {
            return Ok(Outcome::Skip(SkipReason::NotAWrite));
        }

        let name = stream.get(position)?.text.as_str();
        if let Some(exemption) = find_exemption(stream, position, name)? {
            return Ok(Outcome::Skip(SkipReason::Exempt(exemption)));
        }

        let boundary = resolve(stream, position)?;
        if has_later_usage(stream, position, &boundary)? {
            return Ok(Outcome::Skip(SkipReason::Used));
        }
        Ok(Outcome::Report)
    }
}

impl Rule for UnusedVariableRule {
    fn code(&self) -> &'static str {
        CODE
    }

    fn applies_to(&self, kind: TokenKind) -> bool {
        kind == TokenKind::Variable
    }

    fn check(
        &self,
        stream: &TokenStream,
        position: usize,
    ) -> Result<Option<Finding>, ContractViolation> {
        match self.evaluate(stream, position)? {
            Outcome::Skip(reason) => {
                trace!(position, ?reason, "variable occurrence skipped");
                Ok(None)
            }
            Outcome::Report => {
                let name = &stream.get(position)?.text;
                Ok(Some(Finding::new(format!("Unused variable {name}."))))
            }
        }
    }
}
