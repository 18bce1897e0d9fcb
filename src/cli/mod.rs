pub mod format;
pub mod toml_config;

use crate::config::Severity;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stylecheck", version, about = "Style-conformance linter for CSS and SCSS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint stylesheets for style problems
    Check {
        /// Paths to lint (files or directories)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Path to a stylecheck.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,

        /// Lowest severity that makes the run fail (overrides the config file)
        #[arg(long, value_enum)]
        fail_on: Option<FailOn>,
    },

    /// List every rule with its state and severity
    Rules {
        /// Path to a stylecheck.toml config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a starter stylecheck.toml
    Init {
        /// Output file path for the generated config
        #[arg(short, long, default_value = toml_config::DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Compact,
    Github,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FailOn {
    Warning,
    Error,
}

impl From<FailOn> for Severity {
    fn from(f: FailOn) -> Self {
        match f {
            FailOn::Warning => Severity::Warning,
            FailOn::Error => Severity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_parses_options() {
        let cli = Cli::try_parse_from([
            "stylecheck",
            "check",
            "src",
            "--format",
            "json",
            "--fail-on",
            "error",
            "-c",
            "custom.toml",
        ])
        .unwrap();
        match cli.command {
            Commands::Check {
                paths,
                config,
                format,
                fail_on,
            } => {
                assert_eq!(paths, vec![PathBuf::from("src")]);
                assert_eq!(config, Some(PathBuf::from("custom.toml")));
                assert!(matches!(format, OutputFormat::Json));
                assert_eq!(fail_on.map(Severity::from), Some(Severity::Error));
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn check_requires_paths() {
        assert!(Cli::try_parse_from(["stylecheck", "check"]).is_err());
    }
}
