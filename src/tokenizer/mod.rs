//! Reference tokenizer producing a [`TokenStream`] from PHP-like source.
//!
//! The analysis only depends on the stream contract, so any producer that
//! fills in the same nesting metadata can replace this one. The tokenizer
//! runs in two stages:
//! - `lexer`: flat tokens with source locations
//! - `nesting`: conditions, levels, parenthesis owners and scope links

mod lexer;
mod nesting;

use thiserror::Error;
use tracing::trace;

use crate::token_stream::TokenStream;

pub use lexer::Lexer;
pub use nesting::NestingBuilder;

/// Problems in the analysed source that prevent tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unterminated string starting at {line}:{column}")]
    UnterminatedString { line: u32, column: u32 },

    #[error("unterminated comment starting at {line}:{column}")]
    UnterminatedComment { line: u32, column: u32 },

    #[error("unexpected end of input at {line}:{column}")]
    UnexpectedEof { line: u32, column: u32 },

    #[error("unbalanced `{delimiter}` at {line}:{column}")]
    UnbalancedDelimiter {
        delimiter: String,
        line: u32,
        column: u32,
    },

    #[error("`{delimiter}` opened at {line}:{column} is never closed")]
    UnclosedDelimiter {
        delimiter: String,
        line: u32,
        column: u32,
    },
}

/// Tokenize source text into a stream with full nesting metadata.
pub fn tokenize(source: &str) -> Result<TokenStream, TokenizeError> {
    let tokens = Lexer::new(source).tokenize()?;
    trace!("lexed {} tokens", tokens.len());
    let tokens = NestingBuilder::new(tokens).build()?;
    Ok(TokenStream::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    #[test]
    fn test_tokenize_empty_source() {
        let stream = tokenize("").unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn test_tokenize_positions_match_indices() {
        let stream = tokenize("<?php function f() { $a = [1, 2]; }").unwrap();
        for (index, token) in stream.iter().enumerate() {
            assert_eq!(token.position, index);
        }
        assert_eq!(stream.kind(0).unwrap(), TokenKind::OpenTag);
    }

    #[test]
    fn test_tokenize_error_messages() {
        let err = tokenize("<?php if ($a) {").unwrap_err();
        assert_eq!(err.to_string(), "`{` opened at 1:15 is never closed");
    }
}
