//! Lint configuration.
//!
//! Settings come from defaults, an optional TOML file and command-line
//! overrides, in that order:
//!
//! ```toml
//! disabled-rules = []
//! contract-policy = "skip-occurrence"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// `path:line:column: CODE message`
    #[default]
    Text,
    /// A JSON array of diagnostics.
    Json,
}

/// What to do when a token stream breaks its metadata contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractPolicy {
    /// Stop analysing the file at the first violation.
    #[default]
    AbortPass,
    /// Log the violation and move on to the next occurrence.
    SkipOccurrence,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Lint settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LintConfig {
    /// Rule codes that are not run.
    pub disabled_rules: Vec<String>,
    pub contract_policy: ContractPolicy,
    pub format: OutputFormat,
}

impl LintConfig {
    /// Create a new builder for `LintConfig`.
    pub fn builder() -> LintConfigBuilder {
        LintConfigBuilder::default()
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn is_rule_enabled(&self, code: &str) -> bool {
        !self.disabled_rules.iter().any(|disabled| disabled == code)
    }
}

/// Builder for `LintConfig` with fluent API.
#[derive(Default)]
pub struct LintConfigBuilder {
    disabled_rules: Vec<String>,
    contract_policy: Option<ContractPolicy>,
    format: Option<OutputFormat>,
}

impl LintConfigBuilder {
    /// Skip the rule with this code.
    pub fn disable_rule(mut self, code: impl Into<String>) -> Self {
        self.disabled_rules.push(code.into());
        self
    }

    pub fn contract_policy(mut self, policy: ContractPolicy) -> Self {
        self.contract_policy = Some(policy);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Build the config, using defaults for unset values.
    pub fn build(self) -> LintConfig {
        LintConfig {
            disabled_rules: self.disabled_rules,
            contract_policy: self.contract_policy.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
        }
    }
}
