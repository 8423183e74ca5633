//! Read-only token arena with index-based navigation.
//!
//! The stream is produced once by a tokenizer and never mutated during
//! analysis. Every accessor that follows a metadata link checks it and
//! reports a [`ContractViolation`] instead of guessing, since a broken link
//! is a tokenizer bug rather than a property of the analysed code.

use thiserror::Error;

use crate::token::{Keyword, Token, TokenKind};

/// Broken invariants in the token stream handed to the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("token position {position} is out of range (stream has {len} tokens)")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("token {position} has no parenthesis opener")]
    MissingParenthesisOpener { position: usize },

    #[error("token {position} has no parenthesis closer")]
    MissingParenthesisCloser { position: usize },

    #[error("token {position} has no scope opener")]
    MissingScopeOpener { position: usize },

    #[error("token {position} has no scope closer")]
    MissingScopeCloser { position: usize },

    #[error("token {position} refers to owner {owner} which does not own it")]
    DanglingOwner { position: usize, owner: usize },

    #[error("condition {condition} listed for token {position} is not an enclosing construct")]
    ConditionNotAncestor { position: usize, condition: usize },
}

/// Immutable, randomly indexable token sequence.
#[derive(Clone, Debug, Default)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Wrap tokens, renumbering positions to match their indices.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        for (position, token) in tokens.iter_mut().enumerate() {
            token.position = position;
        }
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Fetch a token, failing if the position lies outside the stream.
    pub fn get(&self, position: usize) -> Result<&Token, ContractViolation> {
        self.tokens
            .get(position)
            .ok_or(ContractViolation::PositionOutOfRange {
                position,
                len: self.tokens.len(),
            })
    }

    pub fn kind(&self, position: usize) -> Result<TokenKind, ContractViolation> {
        Ok(self.get(position)?.kind)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Effective-token navigation
    // ═══════════════════════════════════════════════════════════════════════

    /// First token at or after `from` that is not whitespace or a comment.
    pub fn next_effective(&self, from: usize) -> Option<usize> {
        self.next_excluding(from, |kind| kind.is_ineffective())
    }

    /// Last token at or before `from` that is not whitespace or a comment.
    pub fn previous_effective(&self, from: usize) -> Option<usize> {
        let end = from.checked_add(1)?.min(self.tokens.len());
        self.tokens[..end]
            .iter()
            .rposition(|token| !token.kind.is_ineffective())
    }

    /// First token at or after `from` whose kind is not skipped by `skip`.
    pub fn next_excluding(&self, from: usize, skip: impl Fn(TokenKind) -> bool) -> Option<usize> {
        self.tokens
            .get(from..)?
            .iter()
            .position(|token| !skip(token.kind))
            .map(|offset| from + offset)
    }

    /// Kind of the previous effective token before `position`.
    pub fn previous_effective_kind(&self, position: usize) -> Option<TokenKind> {
        let previous = self.previous_effective(position.checked_sub(1)?)?;
        Some(self.tokens[previous].kind)
    }

    /// Kind of the next effective token after `position`.
    pub fn next_effective_kind(&self, position: usize) -> Option<TokenKind> {
        let next = self.next_effective(position + 1)?;
        Some(self.tokens[next].kind)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Checked metadata links
    // ═══════════════════════════════════════════════════════════════════════

    /// Closer of the parenthesis pair at or owned by `position`.
    pub fn parenthesis_closer(&self, position: usize) -> Result<usize, ContractViolation> {
        let closer = self
            .get(position)?
            .parenthesis_closer
            .ok_or(ContractViolation::MissingParenthesisCloser { position })?;
        self.get(closer)?;
        Ok(closer)
    }

    /// Opener of the parenthesis pair owned by `position`.
    pub fn parenthesis_opener(&self, position: usize) -> Result<usize, ContractViolation> {
        let opener = self
            .get(position)?
            .parenthesis_opener
            .ok_or(ContractViolation::MissingParenthesisOpener { position })?;
        self.get(opener)?;
        Ok(opener)
    }

    /// Owner of the parenthesis opened at `opener`, verified to point back.
    pub fn parenthesis_owner(&self, opener: usize) -> Result<Option<usize>, ContractViolation> {
        let Some(owner) = self.get(opener)?.parenthesis_owner else {
            return Ok(None);
        };
        if self.get(owner)?.parenthesis_opener != Some(opener) {
            return Err(ContractViolation::DanglingOwner {
                position: opener,
                owner,
            });
        }
        Ok(Some(owner))
    }

    /// Keyword owning the innermost parenthesis around `position`.
    pub fn innermost_parenthesis_owner(
        &self,
        position: usize,
    ) -> Result<Option<(usize, Keyword)>, ContractViolation> {
        let Some(opener) = self.get(position)?.innermost_parenthesis() else {
            return Ok(None);
        };
        let Some(owner) = self.parenthesis_owner(opener)? else {
            return Ok(None);
        };
        Ok(self.kind(owner)?.keyword().map(|keyword| (owner, keyword)))
    }

    /// Opening brace of the scope owned by `owner`.
    pub fn scope_opener(&self, owner: usize) -> Result<usize, ContractViolation> {
        let opener = self
            .get(owner)?
            .scope_opener
            .ok_or(ContractViolation::MissingScopeOpener { position: owner })?;
        self.get(opener)?;
        Ok(opener)
    }

    /// Closing brace of the scope owned by `owner`.
    pub fn scope_closer(&self, owner: usize) -> Result<usize, ContractViolation> {
        let closer = self
            .get(owner)?
            .scope_closer
            .ok_or(ContractViolation::MissingScopeCloser { position: owner })?;
        self.get(closer)?;
        Ok(closer)
    }

    /// Body range `(opener, closer)` of a scope owner, checked to enclose `position`.
    pub fn enclosing_scope(
        &self,
        owner: usize,
        position: usize,
    ) -> Result<(usize, usize), ContractViolation> {
        let opener = self.scope_opener(owner)?;
        let closer = self.scope_closer(owner)?;
        if !(opener < position && position < closer) {
            return Err(ContractViolation::ConditionNotAncestor {
                position,
                condition: owner,
            });
        }
        Ok((opener, closer))
    }

    /// Positions of variables named `name` strictly between `start` and `end`.
    pub fn variables_named<'a>(
        &'a self,
        name: &'a str,
        start: usize,
        end: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        let end = end.min(self.tokens.len());
        let start = start.saturating_add(1).min(end);
        self.tokens[start..end]
            .iter()
            .filter(move |token| token.kind == TokenKind::Variable && token.text == name)
            .map(|token| token.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, 1, 1)
    }

    fn sample() -> TokenStream {
        TokenStream::new(vec![
            token(TokenKind::OpenTag, "<?php"),
            token(TokenKind::Whitespace, " "),
            token(TokenKind::Variable, "$a"),
            token(TokenKind::Comment, "/* c */"),
            token(TokenKind::Assign(crate::token::AssignOp::Plain), "="),
            token(TokenKind::Number, "1"),
            token(TokenKind::Semicolon, ";"),
        ])
    }

    #[test]
    fn test_positions_are_renumbered() {
        let stream = sample();
        for (index, token) in stream.iter().enumerate() {
            assert_eq!(token.position, index);
        }
    }

    #[test]
    fn test_effective_navigation_skips_trivia() {
        let stream = sample();
        assert_eq!(stream.next_effective(3), Some(4));
        assert_eq!(stream.previous_effective(3), Some(2));
        assert_eq!(stream.previous_effective_kind(2), Some(TokenKind::OpenTag));
        assert_eq!(
            stream.next_effective_kind(2),
            Some(TokenKind::Assign(crate::token::AssignOp::Plain))
        );
        assert_eq!(stream.next_effective(7), None);
        assert_eq!(stream.previous_effective_kind(0), None);
    }

    #[test]
    fn test_out_of_range_is_a_violation() {
        let stream = sample();
        assert_eq!(
            stream.get(42).unwrap_err(),
            ContractViolation::PositionOutOfRange { position: 42, len: 7 }
        );
    }

    #[test]
    fn test_missing_links_are_violations() {
        let stream = sample();
        assert_eq!(
            stream.scope_closer(2).unwrap_err(),
            ContractViolation::MissingScopeCloser { position: 2 }
        );
        assert_eq!(
            stream.parenthesis_closer(2).unwrap_err(),
            ContractViolation::MissingParenthesisCloser { position: 2 }
        );
    }

    #[test]
    fn test_dangling_owner_is_detected() {
        let mut tokens = vec![
            token(TokenKind::Keyword(Keyword::If), "if"),
            token(TokenKind::OpenParen, "("),
            token(TokenKind::CloseParen, ")"),
        ];
        tokens[1].parenthesis_owner = Some(0);
        let stream = TokenStream::new(tokens);
        assert_eq!(
            stream.parenthesis_owner(1).unwrap_err(),
            ContractViolation::DanglingOwner {
                position: 1,
                owner: 0
            }
        );
    }

    #[test]
    fn test_variables_named_is_exclusive() {
        let stream = sample();
        assert_eq!(stream.variables_named("$a", 0, 7).collect::<Vec<_>>(), vec![2]);
        assert!(stream.variables_named("$a", 2, 7).next().is_none());
        assert!(stream.variables_named("$b", 0, 7).next().is_none());
    }
}
