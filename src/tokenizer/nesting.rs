//! Nesting metadata pass.
//!
//! Walks lexed tokens once and records, for every token, the scope owners
//! and parentheses enclosing it, plus the opener/closer/owner links on the
//! delimiters and constructs themselves.

use crate::token::{Condition, Keyword, Token, TokenKind};

use super::TokenizeError;

/// An open `{` (or alternative-syntax `:`) and the construct it belongs to.
#[derive(Debug, Clone, Copy)]
struct BraceFrame {
    position: usize,
    owner: Option<usize>,
    /// Keyword closing a `:` body, `None` for braces.
    terminator: Option<Keyword>,
}

/// Single forward pass filling in nesting metadata.
pub struct NestingBuilder {
    tokens: Vec<Token>,
    conditions: Vec<Condition>,
    parentheses: Vec<usize>,
    brackets: Vec<usize>,
    braces: Vec<BraceFrame>,
    /// Construct waiting for its `{`.
    pending_owner: Option<usize>,
}

impl NestingBuilder {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            conditions: Vec::new(),
            parentheses: Vec::new(),
            brackets: Vec::new(),
            braces: Vec::new(),
            pending_owner: None,
        }
    }

    /// Compute metadata for every token.
    pub fn build(mut self) -> Result<Vec<Token>, TokenizeError> {
        for idx in 0..self.tokens.len() {
            self.tokens[idx].position = idx;
            match self.tokens[idx].kind {
                TokenKind::OpenParen => {
                    self.record(idx);
                    self.open_parenthesis(idx);
                }
                TokenKind::CloseParen => {
                    self.close_parenthesis(idx)?;
                    self.record(idx);
                }
                TokenKind::OpenSquareBracket => {
                    if self.starts_short_array(idx) {
                        self.tokens[idx].kind = TokenKind::OpenShortArray;
                    }
                    self.brackets.push(idx);
                    self.record(idx);
                }
                TokenKind::CloseSquareBracket => {
                    self.close_bracket(idx)?;
                    self.record(idx);
                }
                TokenKind::OpenBrace => {
                    self.record(idx);
                    self.open_brace(idx);
                }
                TokenKind::CloseBrace => {
                    self.close_brace(idx)?;
                    self.record(idx);
                }
                TokenKind::Colon => {
                    self.record(idx);
                    self.open_alternative_body(idx);
                }
                TokenKind::Keyword(
                    keyword @ (Keyword::Endfor | Keyword::Endforeach | Keyword::Endwhile),
                ) => {
                    self.close_alternative_body(idx, keyword)?;
                    self.record(idx);
                }
                TokenKind::Keyword(keyword) => {
                    self.record(idx);
                    if self.awaits_body_at_keyword(idx, keyword) {
                        self.pending_owner = Some(idx);
                    }
                }
                TokenKind::Semicolon => {
                    self.record(idx);
                    if self.parentheses.is_empty() {
                        self.pending_owner = None;
                    }
                }
                _ => self.record(idx),
            }
        }

        if let Some(&opener) = self
            .parentheses
            .first()
            .or(self.brackets.first())
            .or(self.braces.first().map(|frame| &frame.position))
        {
            return Err(self.unclosed(opener));
        }

        Ok(self.tokens)
    }

    /// Snapshot the current nesting state onto a token.
    fn record(&mut self, idx: usize) {
        let token = &mut self.tokens[idx];
        token.conditions = self.conditions.clone();
        token.level = self.conditions.len();
        token.nested_parentheses = self.parentheses.clone();
    }

    fn previous_effective(&self, idx: usize) -> Option<usize> {
        self.tokens[..idx]
            .iter()
            .rposition(|token| !token.kind.is_ineffective())
    }

    fn previous_effective_kind(&self, idx: usize) -> Option<TokenKind> {
        self.previous_effective(idx).map(|prev| self.tokens[prev].kind)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Parentheses
    // ═══════════════════════════════════════════════════════════════════════

    fn open_parenthesis(&mut self, idx: usize) {
        if let Some(owner) = self.parenthesis_owner_for(idx) {
            self.tokens[idx].parenthesis_owner = Some(owner);
            self.tokens[owner].parenthesis_opener = Some(idx);
        }
        self.tokens[idx].parenthesis_opener = Some(idx);
        self.parentheses.push(idx);
    }

    fn close_parenthesis(&mut self, idx: usize) -> Result<(), TokenizeError> {
        let opener = self
            .parentheses
            .pop()
            .ok_or_else(|| self.unbalanced(idx))?;
        let owner = self.tokens[opener].parenthesis_owner;

        self.tokens[opener].parenthesis_closer = Some(idx);
        let closer = &mut self.tokens[idx];
        closer.parenthesis_opener = Some(opener);
        closer.parenthesis_closer = Some(idx);
        closer.parenthesis_owner = owner;

        if let Some(owner) = owner {
            self.tokens[owner].parenthesis_closer = Some(idx);
            let keyword = self.tokens[owner].kind.keyword();
            if keyword.is_some_and(awaits_body_after_header) {
                self.pending_owner = Some(owner);
            }
        }
        Ok(())
    }

    /// The construct owning a `(` at `idx`, judged from what precedes it.
    fn parenthesis_owner_for(&self, idx: usize) -> Option<usize> {
        let prev = self.previous_effective(idx)?;
        match self.tokens[prev].kind {
            TokenKind::Keyword(
                Keyword::For
                | Keyword::Foreach
                | Keyword::While
                | Keyword::If
                | Keyword::Elseif
                | Keyword::Switch
                | Keyword::Catch
                | Keyword::List
                | Keyword::Closure
                | Keyword::Fn,
            ) => Some(prev),
            // `function name(` and `function &name(`
            TokenKind::Identifier => {
                let before = self.previous_effective(prev)?;
                let before = match self.tokens[before].kind {
                    TokenKind::BitwiseAnd => self.previous_effective(before)?,
                    _ => before,
                };
                self.tokens[before]
                    .kind
                    .is_keyword(Keyword::Function)
                    .then_some(before)
            }
            // `function &(` and `fn &(`
            TokenKind::BitwiseAnd => {
                let before = self.previous_effective(prev)?;
                matches!(
                    self.tokens[before].kind,
                    TokenKind::Keyword(Keyword::Closure | Keyword::Fn)
                )
                .then_some(before)
            }
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Square brackets
    // ═══════════════════════════════════════════════════════════════════════

    /// A `[` opens a short array unless it indexes the preceding expression.
    fn starts_short_array(&self, idx: usize) -> bool {
        !matches!(
            self.previous_effective_kind(idx),
            Some(
                TokenKind::Variable
                    | TokenKind::CloseParen
                    | TokenKind::CloseSquareBracket
                    | TokenKind::CloseShortArray
                    | TokenKind::CloseBrace
                    | TokenKind::Identifier
                    | TokenKind::String
            )
        )
    }

    fn close_bracket(&mut self, idx: usize) -> Result<(), TokenizeError> {
        let opener = self.brackets.pop().ok_or_else(|| self.unbalanced(idx))?;
        if self.tokens[opener].kind == TokenKind::OpenShortArray {
            self.tokens[idx].kind = TokenKind::CloseShortArray;
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Braces and scope owners
    // ═══════════════════════════════════════════════════════════════════════

    fn awaits_body_at_keyword(&self, idx: usize, keyword: Keyword) -> bool {
        match keyword {
            Keyword::Function
            | Keyword::Closure
            | Keyword::Interface
            | Keyword::Trait
            | Keyword::Else
            | Keyword::Do
            | Keyword::Try
            | Keyword::Finally => true,
            // `Foo::class` is a constant, not a declaration.
            Keyword::Class => self.previous_effective_kind(idx) != Some(TokenKind::DoubleColon),
            _ => false,
        }
    }

    fn open_brace(&mut self, idx: usize) {
        let member_access = matches!(
            self.previous_effective_kind(idx),
            Some(TokenKind::ObjectOperator | TokenKind::Variable | TokenKind::Operator)
        );
        let owner = if member_access {
            None
        } else {
            self.pending_owner.take()
        };

        if let Some(owner) = owner {
            if let Some(keyword) = self.tokens[owner].kind.keyword() {
                self.tokens[owner].scope_opener = Some(idx);
                self.tokens[idx].scope_opener = Some(idx);
                self.conditions.push(Condition { owner, keyword });
            }
        }
        self.braces.push(BraceFrame {
            position: idx,
            owner,
            terminator: None,
        });
    }

    fn close_brace(&mut self, idx: usize) -> Result<(), TokenizeError> {
        let frame = self.braces.pop().ok_or_else(|| self.unbalanced(idx))?;
        if frame.terminator.is_some() {
            return Err(self.unbalanced(idx));
        }
        self.close_scope(frame, idx);
        Ok(())
    }

    /// `while (...):` opens a body that `endwhile` closes.
    fn open_alternative_body(&mut self, idx: usize) {
        let Some(owner) = self.pending_owner else {
            return;
        };
        let Some(keyword) = self.tokens[owner].kind.keyword() else {
            return;
        };
        let Some(terminator) = keyword.alternative_terminator() else {
            return;
        };
        if self.previous_effective(idx) != self.tokens[owner].parenthesis_closer {
            return;
        }

        self.pending_owner = None;
        self.tokens[owner].scope_opener = Some(idx);
        self.tokens[idx].scope_opener = Some(idx);
        self.conditions.push(Condition { owner, keyword });
        self.braces.push(BraceFrame {
            position: idx,
            owner: Some(owner),
            terminator: Some(terminator),
        });
    }

    fn close_alternative_body(&mut self, idx: usize, keyword: Keyword) -> Result<(), TokenizeError> {
        let frame = self.braces.pop().ok_or_else(|| self.unbalanced(idx))?;
        if frame.terminator != Some(keyword) {
            return Err(self.unbalanced(idx));
        }
        self.close_scope(frame, idx);
        Ok(())
    }

    /// Link a scope owner, its opener and the closer at `idx`.
    fn close_scope(&mut self, frame: BraceFrame, idx: usize) {
        let Some(owner) = frame.owner else {
            return;
        };
        if self.conditions.last().map(|c| c.owner) == Some(owner) {
            self.conditions.pop();
        }
        self.tokens[owner].scope_closer = Some(idx);
        self.tokens[frame.position].scope_closer = Some(idx);
        let closer = &mut self.tokens[idx];
        closer.scope_opener = Some(frame.position);
        closer.scope_closer = Some(idx);
    }

    fn unbalanced(&self, idx: usize) -> TokenizeError {
        let token = &self.tokens[idx];
        TokenizeError::UnbalancedDelimiter {
            delimiter: token.text.clone(),
            line: token.line,
            column: token.column,
        }
    }

    fn unclosed(&self, idx: usize) -> TokenizeError {
        let token = &self.tokens[idx];
        TokenizeError::UnclosedDelimiter {
            delimiter: token.text.clone(),
            line: token.line,
            column: token.column,
        }
    }
}

/// Constructs whose body follows their parenthesised header.
fn awaits_body_after_header(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::For
            | Keyword::Foreach
            | Keyword::While
            | Keyword::If
            | Keyword::Elseif
            | Keyword::Switch
            | Keyword::Catch
    )
}
