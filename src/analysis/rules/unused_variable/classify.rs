//! Assignment classification for variable occurrences.
//!
//! Decides whether an occurrence writes a value (a candidate for the unused
//! check) or only reads, references a member, or declares a parameter
//! default.

use crate::token::{AssignOp, Keyword, TokenKind};
use crate::token_stream::{ContractViolation, TokenStream};

/// How a candidate occurrence writes its variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteKind {
    /// `$a = ...`
    Assignment,
    /// `$a += ...`, `$a .= ...` and friends
    CompoundAssignment,
    /// `$a++` / `$a--`
    IncrementDecrement,
    /// `foreach (... as $k => $v)`
    ForeachBinding,
    /// `list($a, $b) = ...` / `[$a, $b] = ...`
    Destructuring,
}

/// Result of classifying one occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Candidate(WriteKind),
    NotCandidate,
}

impl Classification {
    pub fn is_candidate(self) -> bool {
        matches!(self, Self::Candidate(_))
    }
}

/// Classify the variable occurrence at `position`.
///
/// Non-variable tokens are never candidates.
pub fn classify(stream: &TokenStream, position: usize) -> Result<Classification, ContractViolation> {
    use Classification::*;

    let token = stream.get(position)?;
    if token.kind != TokenKind::Variable {
        return Ok(NotCandidate);
    }

    // `$obj->$name`, `Foo::$bar`
    if let Some(previous) = position.checked_sub(1) {
        if matches!(
            stream.kind(previous)?,
            TokenKind::ObjectOperator | TokenKind::DoubleColon
        ) {
            return Ok(NotCandidate);
        }
    }

    let parenthesis_owner = stream
        .innermost_parenthesis_owner(position)?
        .map(|(_, keyword)| keyword);

    match stream.next_effective_kind(position) {
        Some(TokenKind::Assign(op)) if op.is_compound() => {
            return Ok(Candidate(WriteKind::CompoundAssignment));
        }
        Some(TokenKind::Assign(_)) => {
            let is_property = token
                .innermost_condition()
                .is_some_and(|condition| condition.keyword.is_class_like());
            let is_parameter_default = parenthesis_owner.is_some_and(Keyword::declares_parameters);
            if is_property || is_parameter_default {
                return Ok(NotCandidate);
            }
            return Ok(Candidate(WriteKind::Assignment));
        }
        // Counters inside a `for` header are handled by the loop exemption.
        Some(TokenKind::Increment | TokenKind::Decrement) => {
            if parenthesis_owner == Some(Keyword::For) {
                return Ok(NotCandidate);
            }
            return Ok(Candidate(WriteKind::IncrementDecrement));
        }
        _ => {}
    }

    match parenthesis_owner {
        Some(Keyword::Foreach) => {
            let binds = matches!(
                stream.previous_effective_kind(position),
                Some(TokenKind::Keyword(Keyword::As) | TokenKind::DoubleArrow)
            );
            return Ok(if binds {
                Candidate(WriteKind::ForeachBinding)
            } else {
                NotCandidate
            });
        }
        Some(Keyword::List) => return Ok(Candidate(WriteKind::Destructuring)),
        _ => {}
    }

    if is_short_list_target(stream, position) {
        return Ok(Candidate(WriteKind::Destructuring));
    }

    Ok(NotCandidate)
}

/// `[$a, $b] = ...`: the variable list is closed by `]` and followed by `=`.
fn is_short_list_target(stream: &TokenStream, position: usize) -> bool {
    let closer = stream.next_excluding(position + 1, |kind| {
        kind.is_ineffective() || matches!(kind, TokenKind::Variable | TokenKind::Comma)
    });
    let Some(closer) = closer else {
        return false;
    };
    if stream.tokens()[closer].kind != TokenKind::CloseShortArray {
        return false;
    }
    stream.next_effective_kind(closer) == Some(TokenKind::Assign(AssignOp::Plain))
}
