//! Contexts that make a write observable regardless of later reads.
//!
//! Checks run in a fixed order and the first match wins:
//! 1. the variable is referenced elsewhere in its own `for` header
//! 2. an enclosing loop reads it in its condition or body
//! 3. it is declared `static` in the enclosing function
//! 4. it is a by-reference parameter of the enclosing function
//! 5. it is captured by reference in the enclosing closure's `use` clause

use crate::token::{Keyword, TokenKind};
use crate::token_stream::{ContractViolation, TokenStream};

use super::classify::classify;
use super::scope::enclosing_function;

/// Why a candidate write is not reportable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exemption {
    LoopHeaderSelfReference,
    LoopReconsumption,
    StaticLocal,
    ReferenceParameter,
    ReferenceCapture,
}

/// First exemption that applies to the write at `position`, if any.
pub fn find_exemption(
    stream: &TokenStream,
    position: usize,
    name: &str,
) -> Result<Option<Exemption>, ContractViolation> {
    if is_used_in_for_header(stream, position, name)? {
        return Ok(Some(Exemption::LoopHeaderSelfReference));
    }
    if is_used_in_loop(stream, position, name)? {
        return Ok(Some(Exemption::LoopReconsumption));
    }

    let Some(function) = enclosing_function(stream, position)? else {
        return Ok(None);
    };
    if is_static_local(stream, function.owner, position, name)? {
        return Ok(Some(Exemption::StaticLocal));
    }
    if is_reference_parameter(stream, function.owner, name)? {
        return Ok(Some(Exemption::ReferenceParameter));
    }
    if function.keyword == Keyword::Closure && is_reference_capture(stream, function.owner, name)? {
        return Ok(Some(Exemption::ReferenceCapture));
    }
    Ok(None)
}

/// `for ($i = 0; $i < $n; $i++)`: the header itself reads the counter.
fn is_used_in_for_header(
    stream: &TokenStream,
    position: usize,
    name: &str,
) -> Result<bool, ContractViolation> {
    let Some((owner, Keyword::For)) = stream.innermost_parenthesis_owner(position)? else {
        return Ok(false);
    };
    let opener = stream.parenthesis_opener(owner)?;
    let closer = stream.parenthesis_closer(owner)?;
    Ok(stream
        .variables_named(name, opener, closer)
        .any(|other| other != position))
}

/// A later iteration may read what this one wrote.
///
/// Every `while` and `do ... while` condition up to the enclosing function is
/// checked, then the body of the outermost of those loops is searched for a
/// read of the same name.
fn is_used_in_loop(
    stream: &TokenStream,
    position: usize,
    name: &str,
) -> Result<bool, ContractViolation> {
    let mut outermost_loop = None;

    for condition in stream.get(position)?.conditions.iter().rev() {
        if condition.keyword.is_function_like() {
            break;
        }
        if !condition.keyword.is_loop() {
            continue;
        }
        outermost_loop = Some(condition.owner);

        let header = match condition.keyword {
            Keyword::While => Some(condition.owner),
            Keyword::Do => trailing_while(stream, condition.owner)?,
            _ => None,
        };
        let Some(header) = header else {
            continue;
        };
        let opener = stream.parenthesis_opener(header)?;
        let closer = stream.parenthesis_closer(header)?;
        if stream
            .variables_named(name, opener, closer)
            .any(|other| other != position)
        {
            return Ok(true);
        }
    }

    let Some(loop_owner) = outermost_loop else {
        return Ok(false);
    };
    let (opener, closer) = stream.enclosing_scope(loop_owner, position)?;
    for other in stream.variables_named(name, opener, closer) {
        if other != position && !classify(stream, other)?.is_candidate() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// The `while` keyword following the body of a `do` loop.
fn trailing_while(stream: &TokenStream, do_owner: usize) -> Result<Option<usize>, ContractViolation> {
    let closer = stream.scope_closer(do_owner)?;
    Ok(stream
        .next_effective(closer + 1)
        .filter(|&next| stream.tokens()[next].kind.is_keyword(Keyword::While)))
}

/// `static $count = 0;` anywhere in the function body.
fn is_static_local(
    stream: &TokenStream,
    function: usize,
    position: usize,
    name: &str,
) -> Result<bool, ContractViolation> {
    let (opener, closer) = stream.enclosing_scope(function, position)?;
    Ok(stream
        .variables_named(name, opener, closer)
        .any(|other| preceded_by(stream, other, TokenKind::Keyword(Keyword::Static))))
}

/// `function f(&$out)`
fn is_reference_parameter(
    stream: &TokenStream,
    function: usize,
    name: &str,
) -> Result<bool, ContractViolation> {
    let opener = stream.parenthesis_opener(function)?;
    let closer = stream.parenthesis_closer(function)?;
    Ok(stream
        .variables_named(name, opener, closer)
        .any(|other| preceded_by(stream, other, TokenKind::BitwiseAnd)))
}

/// `function () use (&$out)`
fn is_reference_capture(
    stream: &TokenStream,
    closure: usize,
    name: &str,
) -> Result<bool, ContractViolation> {
    let parameters_closer = stream.parenthesis_closer(closure)?;
    let Some(use_keyword) = stream.next_effective(parameters_closer + 1) else {
        return Ok(false);
    };
    if !stream.kind(use_keyword)?.is_keyword(Keyword::Use) {
        return Ok(false);
    }
    let Some(opener) = stream.next_effective(use_keyword + 1) else {
        return Ok(false);
    };
    if stream.kind(opener)? != TokenKind::OpenParen {
        return Ok(false);
    }
    let closer = stream.parenthesis_closer(opener)?;
    Ok(stream
        .variables_named(name, opener, closer)
        .any(|other| preceded_by(stream, other, TokenKind::BitwiseAnd)))
}

fn preceded_by(stream: &TokenStream, position: usize, kind: TokenKind) -> bool {
    stream.previous_effective_kind(position) == Some(kind)
}
