//! Diagnostics produced by rules and their rendered forms.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::token_stream::TokenStream;

/// A rule violation attached to a token position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule_code: String,
    pub message: String,
    pub position: usize,
}

impl Diagnostic {
    pub fn new(rule_code: impl Into<String>, message: impl Into<String>, position: usize) -> Self {
        Self {
            rule_code: rule_code.into(),
            message: message.into(),
            position,
        }
    }
}

/// Sink for diagnostics emitted during a pass.
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl Reporter for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════

/// A diagnostic resolved to a file and a 1-based line/column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocatedDiagnostic {
    pub path: String,
    pub rule_code: String,
    pub message: String,
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

impl LocatedDiagnostic {
    /// Attach the source location of the diagnostic's token.
    ///
    /// Positions outside the stream fall back to line 0, column 0.
    pub fn locate(path: &Path, stream: &TokenStream, diagnostic: Diagnostic) -> Self {
        let (line, column) = stream
            .tokens()
            .get(diagnostic.position)
            .map(|token| (token.line, token.column))
            .unwrap_or((0, 0));
        Self {
            path: path.display().to_string(),
            rule_code: diagnostic.rule_code,
            message: diagnostic.message,
            position: diagnostic.position,
            line,
            column,
        }
    }
}

/// `path:line:column: CODE message`, one diagnostic per line.
pub fn render_text(diagnostics: &[LocatedDiagnostic]) -> String {
    let mut out = String::new();
    for diag in diagnostics {
        let _ = writeln!(
            out,
            "{}:{}:{}: {} {}",
            diag.path, diag.line, diag.column, diag.rule_code, diag.message
        );
    }
    out
}

/// A pretty-printed JSON array of diagnostics.
pub fn render_json(diagnostics: &[LocatedDiagnostic]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(diagnostics)
}
