use clap::Parser;
use std::fs;
use std::process;
use stylecheck::cli::toml_config::{self, ConfigError};
use stylecheck::cli::{format, Cli, Commands, OutputFormat};
use stylecheck::config::{LintConfig, Severity};
use stylecheck::rules::factory::rule_info;
use stylecheck::scan;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env("STYLECHECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_or_exit(config: Option<&std::path::Path>) -> LintConfig {
    match toml_config::load_config(config) {
        Ok(c) => c,
        Err(ConfigError::Read { ref path, ref source })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            eprintln!(
                "\x1b[31merror\x1b[0m: config file '{}' not found",
                path.display()
            );
            eprintln!(
                "\x1b[90mhint\x1b[0m: run \x1b[1mstylecheck init\x1b[0m to generate a starter config"
            );
            process::exit(2);
        }
        Err(e) => {
            eprintln!("\x1b[31merror\x1b[0m: {}", e);
            process::exit(2);
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            paths,
            config,
            format: output_format,
            fail_on,
        } => {
            let lint_config = load_or_exit(config.as_deref());
            let threshold: Severity = fail_on.map_or(lint_config.fail_on, Severity::from);

            let report = match scan::run_scan(&lint_config, &paths) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("\x1b[31merror\x1b[0m: {}", e);
                    process::exit(2);
                }
            };

            match output_format {
                OutputFormat::Pretty => format::print_pretty(&report),
                OutputFormat::Json => format::print_json(&report),
                OutputFormat::Compact => format::print_compact(&report),
                OutputFormat::Github => format::print_github(&report),
            }

            process::exit(report.exit_code(threshold));
        }

        Commands::Rules { config } => {
            let lint_config = load_or_exit(config.as_deref());
            for rule in &lint_config.rules {
                let state = if rule.enabled {
                    "\x1b[32mon \x1b[0m"
                } else {
                    "\x1b[90moff\x1b[0m"
                };
                let description = rule_info(&rule.id).map_or("", |info| info.description);
                println!(
                    "  {} {:<28} {:<8} \x1b[90m{}\x1b[0m",
                    state, rule.id, rule.severity, description
                );
            }
        }

        Commands::Init { output, force } => {
            if output.exists() && !force {
                eprintln!(
                    "\x1b[31merror\x1b[0m: '{}' already exists (use --force to overwrite)",
                    output.display()
                );
                process::exit(2);
            }

            if let Err(e) = fs::write(&output, toml_config::STARTER_CONFIG) {
                eprintln!("\x1b[31merror\x1b[0m: failed to write config: {}", e);
                process::exit(2);
            }

            eprintln!("\x1b[32m✓\x1b[0m Created {}", output.display());
            eprintln!(
                "\x1b[90mhint\x1b[0m: run \x1b[1mstylecheck check .\x1b[0m to lint your stylesheets"
            );
        }
    }
}
