//! Built-in rules.
//!
//! - `unused_variable`: writes to local variables whose value is never read

pub mod unused_variable;

pub use unused_variable::UnusedVariableRule;

use super::rule::Rule;

/// Create the default set of rules.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![Box::new(UnusedVariableRule)]
}
