//! Scope resolution for variable occurrences.
//!
//! A write is only ever consumed inside the nearest enclosing function or
//! closure body, or anywhere after it when it sits in top-level code.

use crate::token::{Condition, TokenKind};
use crate::token_stream::{ContractViolation, TokenStream};

/// What delimits the scope of an occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeOwner {
    /// A function or closure declaration.
    Function(Condition),
    /// Top-level code, starting at the preceding open tag if there is one.
    File { open_tag: Option<usize> },
}

/// Token range searched for later usage: `start..=end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeBoundary {
    pub owner: ScopeOwner,
    pub start: usize,
    pub end: usize,
}

/// Nearest function or closure enclosing `position`.
pub fn enclosing_function(
    stream: &TokenStream,
    position: usize,
) -> Result<Option<Condition>, ContractViolation> {
    Ok(stream
        .get(position)?
        .conditions
        .iter()
        .rev()
        .find(|condition| condition.keyword.is_function_like())
        .copied())
}

/// Resolve the scope boundary for the occurrence at `position`.
pub fn resolve(stream: &TokenStream, position: usize) -> Result<ScopeBoundary, ContractViolation> {
    if let Some(function) = enclosing_function(stream, position)? {
        let (opener, closer) = stream.enclosing_scope(function.owner, position)?;
        return Ok(ScopeBoundary {
            owner: ScopeOwner::Function(function),
            start: opener + 1,
            end: closer,
        });
    }

    let open_tag = stream.tokens()[..position]
        .iter()
        .rposition(|token| token.kind == TokenKind::OpenTag);
    Ok(ScopeBoundary {
        owner: ScopeOwner::File { open_tag },
        start: open_tag.unwrap_or(0),
        end: stream.len().saturating_sub(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;
    use crate::tokenizer::tokenize;

    fn position_of(stream: &TokenStream, text: &str, nth: usize) -> usize {
        stream
            .iter()
            .filter(|token| token.text == text)
            .nth(nth)
            .map(|token| token.position)
            .unwrap()
    }

    #[test]
    fn test_top_level_scope_spans_the_file() {
        let stream = tokenize("<p>\n<?php $a = 1; if ($b) { $a = 2; }").unwrap();
        let a = position_of(&stream, "$a", 1);
        let boundary = resolve(&stream, a).unwrap();
        assert_eq!(boundary.owner, ScopeOwner::File { open_tag: Some(1) });
        assert_eq!(boundary.start, 1);
        assert_eq!(boundary.end, stream.len() - 1);
    }

    #[test]
    fn test_function_scope_is_its_body() {
        let stream = tokenize("<?php function f() { if ($x) { $a = 1; } } $a = 2;").unwrap();
        let a = position_of(&stream, "$a", 0);
        let boundary = resolve(&stream, a).unwrap();
        let function = position_of(&stream, "function", 0);
        assert_eq!(
            boundary.owner,
            ScopeOwner::Function(Condition {
                owner: function,
                keyword: Keyword::Function
            })
        );
        assert_eq!(boundary.start, stream.tokens()[function].scope_opener.unwrap() + 1);
        assert_eq!(boundary.end, stream.tokens()[function].scope_closer.unwrap());
    }

    #[test]
    fn test_nearest_closure_wins() {
        let source = "<?php function f() { $g = function () { $a = 1; }; }";
        let stream = tokenize(source).unwrap();
        let a = position_of(&stream, "$a", 0);
        let closure = enclosing_function(&stream, a).unwrap().unwrap();
        assert_eq!(closure.keyword, Keyword::Closure);
    }

    #[test]
    fn test_broken_scope_link_is_reported() {
        let stream = tokenize("<?php function f() { $a = 1; }").unwrap();
        let mut tokens = stream.tokens().to_vec();
        let function = position_of(&stream, "function", 0);
        tokens[function].scope_closer = None;
        let broken = TokenStream::new(tokens);
        let a = position_of(&broken, "$a", 0);
        assert_eq!(
            resolve(&broken, a).unwrap_err(),
            ContractViolation::MissingScopeCloser { position: function }
        );
    }
}
