//! Lexer for the PHP-like source language.
//!
//! Produces flat tokens with source locations; nesting metadata is filled in
//! afterwards by the [`nesting`](super::nesting) pass.

use crate::token::{AssignOp, Keyword, Token, TokenKind};

use super::TokenizeError;

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "**=", "===", "!==", "<=>", "...", "??=", "?->", "->", "=>", "::", "++", "--",
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", ".=", "**", "==", "!=", "<>", "<=", ">=",
    "&&", "||", "??", "<<", ">>",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Outside `<?php ... ?>`.
    Inline,
    /// Inside PHP code.
    Script,
}

/// Hand-written scanner over the source text.
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    line: u32,
    column: u32,
    mode: Mode,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            mode: Mode::Inline,
        }
    }

    /// Scan the whole source.
    pub fn tokenize(mut self) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = Vec::new();
        while !self.is_eof() {
            let token = match self.mode {
                Mode::Inline => self.scan_inline(),
                Mode::Script => self.scan_script()?,
            };
            tokens.push(token);
        }
        demote_member_names(&mut tokens);
        promote_closures(&mut tokens);
        Ok(tokens)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Advance over `len` bytes, keeping line and column in sync.
    fn advance(&mut self, len: usize) -> &'src str {
        let text = &self.source[self.pos..self.pos + len];
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += len;
        text
    }

    /// Advance while `pred` holds and return the consumed text.
    fn advance_while(&mut self, pred: impl Fn(char) -> bool) -> &'src str {
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, ch)| !pred(ch))
            .map_or(self.rest().len(), |(idx, _)| idx);
        self.advance(len)
    }

    fn scan_inline(&mut self) -> Token {
        let (line, column) = (self.line, self.column);
        for tag in ["<?php", "<?="] {
            if self.rest().starts_with(tag) {
                let text = self.advance(tag.len());
                self.mode = Mode::Script;
                return Token::new(TokenKind::OpenTag, text, line, column);
            }
        }
        let len = self.rest().find("<?").unwrap_or(self.rest().len());
        // A stray `<?` that is not an open tag is still inline text.
        let len = if len == 0 { 2.min(self.rest().len()) } else { len };
        let text = self.advance(len);
        Token::new(TokenKind::InlineHtml, text, line, column)
    }

    fn scan_script(&mut self) -> Result<Token, TokenizeError> {
        let (line, column) = (self.line, self.column);
        let rest = self.rest();
        let Some(ch) = self.peek() else {
            return Err(TokenizeError::UnexpectedEof { line, column });
        };

        let (kind, text) = if ch.is_whitespace() {
            (TokenKind::Whitespace, self.advance_while(char::is_whitespace))
        } else if rest.starts_with("?>") {
            self.mode = Mode::Inline;
            (TokenKind::CloseTag, self.advance(2))
        } else if rest.starts_with("//") || (ch == '#' && self.peek_nth(1) != Some('[')) {
            (TokenKind::Comment, self.advance_while(|c| c != '\n'))
        } else if rest.starts_with("/*") {
            let end = rest[2..]
                .find("*/")
                .ok_or(TokenizeError::UnterminatedComment { line, column })?;
            (TokenKind::Comment, self.advance(end + 4))
        } else if ch == '$' && self.peek_nth(1).is_some_and(is_ident_start) {
            let len = 1 + ident_len(&rest[1..]);
            (TokenKind::Variable, self.advance(len))
        } else if is_ident_start(ch) || ch == '\\' {
            let text = self.advance_while(|c| is_ident_continue(c) || c == '\\');
            let kind = Keyword::lookup(text).map_or(TokenKind::Identifier, TokenKind::Keyword);
            (kind, text)
        } else if ch.is_ascii_digit() {
            (
                TokenKind::Number,
                self.advance_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_'),
            )
        } else if ch == '\'' || ch == '"' {
            let len = string_len(rest, ch).ok_or(TokenizeError::UnterminatedString { line, column })?;
            (TokenKind::String, self.advance(len))
        } else if rest.starts_with("<<<") {
            let len = heredoc_len(rest).ok_or(TokenizeError::UnterminatedString { line, column })?;
            (TokenKind::String, self.advance(len))
        } else {
            self.scan_operator()
        };

        Ok(Token::new(kind, text, line, column))
    }

    fn scan_operator(&mut self) -> (TokenKind, &'src str) {
        let rest = self.rest();
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            let kind = match *op {
                "->" | "?->" => TokenKind::ObjectOperator,
                "=>" => TokenKind::DoubleArrow,
                "::" => TokenKind::DoubleColon,
                "++" => TokenKind::Increment,
                "--" => TokenKind::Decrement,
                other => AssignOp::from_lexeme(other).map_or(TokenKind::Operator, TokenKind::Assign),
            };
            return (kind, self.advance(op.len()));
        }

        let ch = self.peek().unwrap_or_default();
        let kind = match ch {
            '=' => TokenKind::Assign(AssignOp::Plain),
            '&' => TokenKind::BitwiseAnd,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            // Refined into short-array or index brackets by the nesting pass.
            '[' => TokenKind::OpenSquareBracket,
            ']' => TokenKind::CloseSquareBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            _ => TokenKind::Operator,
        };
        (kind, self.advance(ch.len_utf8().max(1)))
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || !ch.is_ascii()
}

fn ident_len(text: &str) -> usize {
    text.char_indices()
        .find(|&(_, ch)| !is_ident_continue(ch))
        .map_or(text.len(), |(idx, _)| idx)
}

/// Byte length of a quoted string starting at `text[0]`, including quotes.
fn string_len(text: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in text.char_indices().skip(1) {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            c if c == quote => return Some(idx + c.len_utf8()),
            _ => {}
        }
    }
    None
}

/// Byte length of a heredoc or nowdoc starting at `text[0]`, closing label included.
///
/// The body is opaque, like any other string literal.
fn heredoc_len(text: &str) -> Option<usize> {
    let is_blank = |c: char| c == ' ' || c == '\t';
    let header = text[3..].trim_start_matches(is_blank);
    let (label, quotes) = match header.chars().next()? {
        quote @ ('\'' | '"') => {
            let inner = &header[1..];
            let len = ident_len(inner);
            if !inner[len..].starts_with(quote) {
                return None;
            }
            (&inner[..len], 2)
        }
        _ => (&header[..ident_len(header)], 0),
    };
    if !label.chars().next().is_some_and(is_ident_start) {
        return None;
    }

    let header_end = text.len() - header.len() + label.len() + quotes;
    let mut line_start = header_end + text[header_end..].find('\n')? + 1;
    loop {
        let line = &text[line_start..];
        if let Some(after) = line.trim_start_matches(is_blank).strip_prefix(label) {
            if !after.chars().next().is_some_and(is_ident_continue) {
                return Some(text.len() - after.len());
            }
        }
        line_start += line.find('\n')? + 1;
    }
}

/// Reserved words after `->`, `::` or `function` name a member, not a construct.
fn demote_member_names(tokens: &mut [Token]) {
    let mut previous: Option<TokenKind> = None;
    let mut before_previous: Option<TokenKind> = None;
    for token in tokens.iter_mut() {
        if token.kind.is_ineffective() {
            continue;
        }
        let names_member = match previous {
            Some(TokenKind::ObjectOperator | TokenKind::DoubleColon) => true,
            Some(TokenKind::Keyword(Keyword::Function)) => true,
            // `function &list(`
            Some(TokenKind::BitwiseAnd) => {
                before_previous == Some(TokenKind::Keyword(Keyword::Function))
            }
            _ => false,
        };
        if names_member && token.kind.keyword().is_some() {
            token.kind = TokenKind::Identifier;
        }
        before_previous = previous;
        previous = Some(token.kind);
    }
}

/// Turn `function` into `Closure` when no name follows it.
fn promote_closures(tokens: &mut [Token]) {
    for idx in 0..tokens.len() {
        if !tokens[idx].kind.is_keyword(Keyword::Function) {
            continue;
        }
        let mut following = tokens[idx + 1..]
            .iter()
            .filter(|token| !token.kind.is_ineffective())
            .map(|token| token.kind);
        let anonymous = match following.next() {
            Some(TokenKind::OpenParen) => true,
            Some(TokenKind::BitwiseAnd) => following.next() == Some(TokenKind::OpenParen),
            _ => false,
        };
        if anonymous {
            tokens[idx].kind = TokenKind::Keyword(Keyword::Closure);
        }
    }
}
