//! Detection of unused local-variable writes in PHP-like source.
//!
//! Source text is tokenized into a [`TokenStream`] carrying nesting metadata,
//! then every enabled rule is run over it by the [`Analyzer`].
//!
//! ```
//! use unused_var_lint::{lint_source, LintConfig};
//!
//! let diagnostics = lint_source("<?php $a = 1; $b = 2; echo $b;", &LintConfig::default()).unwrap();
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].message, "Unused variable $a.");
//! ```

pub mod analysis;
pub mod config;
pub mod diagnostics;
pub mod token;
pub mod token_stream;
pub mod tokenizer;

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

pub use analysis::{Analyzer, Finding, Rule, UnusedVariableRule};
pub use config::{ConfigError, ContractPolicy, LintConfig, LintConfigBuilder, OutputFormat};
pub use diagnostics::{Diagnostic, LocatedDiagnostic, Reporter};
pub use token::{AssignOp, Condition, Keyword, Token, TokenKind};
pub use token_stream::{ContractViolation, TokenStream};
pub use tokenizer::{tokenize, TokenizeError};

/// Anything that can stop a file from being linted.
#[derive(Debug, Error)]
pub enum LintError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("malformed token stream: {0}")]
    Contract(#[from] ContractViolation),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tokenize `source` and run the rules `config` enables.
pub fn lint_source(source: &str, config: &LintConfig) -> Result<Vec<Diagnostic>, LintError> {
    let stream = tokenize(source)?;
    debug!(tokens = stream.len(), "tokenized source");
    Ok(Analyzer::from_config(config).diagnostics(&stream)?)
}
