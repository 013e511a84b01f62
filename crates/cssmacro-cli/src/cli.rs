use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cssmacro_core::{Dialect, ErrorPolicy, ExpandOptions};

#[derive(Parser, Debug)]
#[command(name = "cssmacro")]
#[command(about = "Expands @component blocks and selector macros")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand a stylesheet, inlining its imports first.
    Build {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON options file, e.g. `{ "dialect": "web-component" }`.
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum)]
        dialect: Option<Dialect>,

        /// Skip rules whose macros fail to expand instead of aborting.
        #[arg(long)]
        continue_on_error: bool,
    },
}

/// Options from the config file (if any) with command-line flags on top.
pub fn resolve_options(
    config: Option<ExpandOptions>,
    dialect: Option<Dialect>,
    continue_on_error: bool,
) -> ExpandOptions {
    let mut options = config.unwrap_or_default();
    if let Some(dialect) = dialect {
        options.dialect = dialect;
    }
    if continue_on_error {
        options.on_error = ErrorPolicy::Continue;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_build_flags() {
        let cli = Cli::try_parse_from([
            "cssmacro",
            "build",
            "button.css",
            "--dialect",
            "web-component",
            "--continue-on-error",
            "-o",
            "out.css",
        ])
        .unwrap();

        let Commands::Build {
            input,
            output,
            dialect,
            continue_on_error,
            config,
        } = cli.command;
        assert_eq!(input, PathBuf::from("button.css"));
        assert_eq!(output, Some(PathBuf::from("out.css")));
        assert_eq!(dialect, Some(Dialect::WebComponent));
        assert!(continue_on_error);
        assert!(config.is_none());
    }

    #[test]
    fn flags_override_config() {
        let config = ExpandOptions::new(Dialect::WebComponent);
        let options = resolve_options(Some(config), Some(Dialect::Flat), true);
        assert_eq!(options, ExpandOptions::new(Dialect::Flat).continue_on_error());

        let options = resolve_options(Some(config), None, false);
        assert_eq!(options, config);

        assert_eq!(resolve_options(None, None, false), ExpandOptions::default());
    }
}
