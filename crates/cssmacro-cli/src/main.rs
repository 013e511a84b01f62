mod cli;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cssmacro_core::expand::Severity;
use cssmacro_core::loader::{self, Source};
use cssmacro_core::{emitter, expand, parser, Diagnostic, ExpandOptions, Span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cssmacro=info,cssmacro_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Build {
            input,
            output,
            config,
            dialect,
            continue_on_error,
        } => {
            let config = config
                .as_deref()
                .map(ExpandOptions::load)
                .transpose()
                .context("failed to load options")?;
            let options = cli::resolve_options(config, dialect, continue_on_error);
            build(&input, output.as_deref(), &options)
        }
    }
}

fn build(input: &Path, output: Option<&Path>, options: &ExpandOptions) -> anyhow::Result<ExitCode> {
    tracing::info!(input = %input.display(), dialect = ?options.dialect, "building");

    let source = loader::load_with_imports(input)?;
    let stylesheet = match parser::parse(&source.text) {
        Ok(stylesheet) => stylesheet,
        Err(err) => {
            let at = location(&source, input, err.span());
            return Err(err).with_context(|| format!("failed to parse {}", at));
        }
    };

    let expansion = match expand::expand(stylesheet, options) {
        Ok(expansion) => expansion,
        Err(err) => {
            report(&source, input, err.diagnostics());
            return Err(err).with_context(|| format!("expansion of {} aborted", input.display()));
        }
    };
    report(&source, input, &expansion.diagnostics);

    let css = emitter::emit_css(&expansion.stylesheet);
    match output {
        Some(path) => fs::write(path, css)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", css),
    }

    let failed = expansion
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.severity == Severity::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn report(source: &Source, input: &Path, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", format_diagnostic(source, input, diagnostic));
    }
}

fn format_diagnostic(source: &Source, input: &Path, diagnostic: &Diagnostic) -> String {
    format!(
        "{}[{}] {}: {}",
        diagnostic.severity,
        diagnostic.kind.code(),
        location(source, input, diagnostic.location),
        diagnostic.message
    )
}

/// `file:line:column` in the file the span was read from, which may be an
/// import of `input`.
fn location(source: &Source, input: &Path, span: Span) -> String {
    match source.locate(span) {
        Some((path, span)) => format!("{}:{}", path.display(), span),
        None => format!("{}:{}", input.display(), span),
    }
}
