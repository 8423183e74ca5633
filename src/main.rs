use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use unused_var_lint::diagnostics::{render_json, render_text};
use unused_var_lint::{tokenize, Analyzer, LintConfig, LintError, LocatedDiagnostic, OutputFormat};

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };
    let analyzer = Analyzer::from_config(&config);

    let mut located = Vec::new();
    let mut failed = false;
    for path in &args.paths {
        match lint_file(&analyzer, path) {
            Ok(diagnostics) => located.extend(diagnostics),
            Err(err) => {
                error!(path = %path.display(), "{err}");
                failed = true;
            }
        }
    }

    match config.format {
        OutputFormat::Text => print!("{}", render_text(&located)),
        OutputFormat::Json => match render_json(&located) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                error!("failed to render diagnostics: {err}");
                return ExitCode::from(2);
            }
        },
    }

    if failed {
        ExitCode::from(2)
    } else if located.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

#[derive(Parser, Debug)]
#[command(name = "unused-var-lint", version, about)]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Log per-file progress
    #[arg(short, long)]
    verbose: bool,

    /// Source files to lint
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn build_config(args: &Args) -> Result<LintConfig, LintError> {
    let mut config = match &args.config {
        Some(path) => LintConfig::load(path)?,
        None => LintConfig::default(),
    };
    if let Some(format) = args.format {
        config.format = format;
    }
    Ok(config)
}

fn lint_file(analyzer: &Analyzer, path: &Path) -> Result<Vec<LocatedDiagnostic>, LintError> {
    let source = std::fs::read_to_string(path).map_err(|source| LintError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stream = tokenize(&source)?;
    let diagnostics = analyzer.diagnostics(&stream)?;
    debug!(path = %path.display(), count = diagnostics.len(), "linted file");
    Ok(diagnostics
        .into_iter()
        .map(|diagnostic| LocatedDiagnostic::locate(path, &stream, diagnostic))
        .collect())
}
