//! Forward scan for a later read of a written variable.

use crate::token_stream::{ContractViolation, TokenStream};

use super::scope::ScopeBoundary;

/// Whether any occurrence of the same name after `position` and up to the
/// boundary's end belongs to the same scope.
pub fn has_later_usage(
    stream: &TokenStream,
    position: usize,
    boundary: &ScopeBoundary,
) -> Result<bool, ContractViolation> {
    let occurrence = stream.get(position)?;
    let end = boundary.end.saturating_add(1);
    for candidate in stream.variables_named(&occurrence.text, position, end) {
        if is_in_same_scope(stream, candidate, occurrence.level)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A token belongs to the scope of a write at `level` unless a function or
/// closure opened at or below that level encloses it.
pub fn is_in_same_scope(
    stream: &TokenStream,
    position: usize,
    level: usize,
) -> Result<bool, ContractViolation> {
    for condition in stream.get(position)?.conditions.iter().rev() {
        if stream.get(condition.owner)?.level < level {
            break;
        }
        if condition.keyword.is_function_like() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rules::unused_variable::scope::resolve;
    use crate::tokenizer::tokenize;

    fn later_usage(source: &str, name: &str) -> bool {
        let stream = tokenize(source).unwrap();
        let position = stream
            .iter()
            .find(|token| token.text == name)
            .map(|token| token.position)
            .unwrap();
        let boundary = resolve(&stream, position).unwrap();
        has_later_usage(&stream, position, &boundary).unwrap()
    }

    #[test]
    fn test_read_in_nested_block_counts() {
        assert!(later_usage("<?php $a = 1; if ($b) { echo $a; }", "$a"));
    }

    #[test]
    fn test_earlier_read_does_not_count() {
        let stream = tokenize("<?php echo $b; $b = 1;").unwrap();
        let write = stream
            .iter()
            .filter(|token| token.text == "$b")
            .nth(1)
            .map(|token| token.position)
            .unwrap();
        let boundary = resolve(&stream, write).unwrap();
        assert!(!has_later_usage(&stream, write, &boundary).unwrap());
    }

    #[test]
    fn test_nested_closure_shadows() {
        assert!(!later_usage("<?php $a = 1; $f = function () { $a = 2; };", "$a"));
        assert!(!later_usage(
            "<?php function f() { $a = 1; $g = function () { echo $a; }; }",
            "$a"
        ));
    }

    #[test]
    fn test_use_clause_counts_as_usage() {
        assert!(later_usage(
            "<?php $a = 1; $f = function () use ($a) { echo $a; };",
            "$a"
        ));
    }

    #[test]
    fn test_scan_stops_at_function_end() {
        assert!(!later_usage(
            "<?php function f() { $a = 1; } function g() { echo $a; }",
            "$a"
        ));
    }

    #[test]
    fn test_named_function_body_does_not_see_top_level() {
        assert!(!later_usage("<?php $a = 1; function g() { echo $a; }", "$a"));
    }
}
