use crate::config::{LintConfig, QuoteStyle, RuleConfig, Severity};
use crate::rules::factory::{self, FactoryError};
use globset::Glob;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "stylecheck.toml";

/// Top-level TOML config file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub stylecheck: StylecheckSection,
    /// `[rules.<id>]` tables.
    #[serde(default)]
    pub rules: BTreeMap<String, TomlRule>,
}

/// The `[stylecheck]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylecheckSection {
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub fail_on: Option<String>,
}

/// A single `[rules.<id>]` table. Absent keys keep the rule's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlRule {
    pub enabled: Option<bool>,
    pub severity: Option<String>,
    pub width: Option<usize>,
    pub quote: Option<String>,
    pub max_declarations: Option<usize>,
    pub max_depth: Option<usize>,
    pub max_lines: Option<usize>,
    pub namespace: Option<String>,
    pub allowed_functions: Option<Vec<String>>,
    pub pattern: Option<String>,
    pub blank_lines_before: Option<usize>,
    pub blank_lines_after: Option<usize>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown rule '{0}' in config")]
    UnknownRule(String),
    #[error("{context}: invalid severity '{value}' (expected \"warning\" or \"error\")")]
    InvalidSeverity { context: String, value: String },
    #[error("rule '{rule}': invalid quote style '{value}' (expected \"double\" or \"single\")")]
    InvalidQuote { rule: String, value: String },
    #[error("rule '{rule}' does not take parameter '{key}'")]
    InvalidParameter { rule: String, key: &'static str },
    #[error("invalid exclude pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error(transparent)]
    Rule(#[from] FactoryError),
}

impl TomlRule {
    /// Parameter keys set in this table.
    fn params(&self) -> Vec<&'static str> {
        let set = [
            ("width", self.width.is_some()),
            ("quote", self.quote.is_some()),
            ("max_declarations", self.max_declarations.is_some()),
            ("max_depth", self.max_depth.is_some()),
            ("max_lines", self.max_lines.is_some()),
            ("namespace", self.namespace.is_some()),
            ("allowed_functions", self.allowed_functions.is_some()),
            ("pattern", self.pattern.is_some()),
            ("blank_lines_before", self.blank_lines_before.is_some()),
            ("blank_lines_after", self.blank_lines_after.is_some()),
        ];
        set.into_iter()
            .filter_map(|(key, present)| present.then_some(key))
            .collect()
    }

    /// Overlay the keys present in this table onto `config`. A parameter the
    /// rule does not read is an error rather than silently ignored.
    pub fn apply(&self, config: &mut RuleConfig) -> Result<(), ConfigError> {
        if let Some(info) = factory::rule_info(&config.id) {
            if let Some(key) = self.params().into_iter().find(|key| !info.accepts(key)) {
                return Err(ConfigError::InvalidParameter {
                    rule: config.id.clone(),
                    key,
                });
            }
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(ref value) = self.severity {
            config.severity =
                Severity::parse(value).ok_or_else(|| ConfigError::InvalidSeverity {
                    context: format!("rule '{}'", config.id),
                    value: value.clone(),
                })?;
        }
        if let Some(ref value) = self.quote {
            config.quote = QuoteStyle::parse(value).ok_or_else(|| ConfigError::InvalidQuote {
                rule: config.id.clone(),
                value: value.clone(),
            })?;
        }
        if let Some(width) = self.width {
            config.indent_width = width;
        }
        if let Some(n) = self.max_declarations {
            config.max_declarations = n;
        }
        if let Some(n) = self.max_depth {
            config.max_depth = n;
        }
        if let Some(n) = self.max_lines {
            config.max_lines = n;
        }
        if let Some(ref ns) = self.namespace {
            config.namespace = Some(ns.clone());
        }
        if let Some(ref allowed) = self.allowed_functions {
            config.allowed_functions = allowed.clone();
        }
        if let Some(ref pattern) = self.pattern {
            config.pattern = Some(pattern.clone());
        }
        if let Some(n) = self.blank_lines_before {
            config.blank_lines_before = n;
        }
        if let Some(n) = self.blank_lines_after {
            config.blank_lines_after = n;
        }
        Ok(())
    }
}

impl TomlConfig {
    /// Merge onto the built-in defaults and validate the result.
    pub fn into_lint_config(self) -> Result<LintConfig, ConfigError> {
        let mut config = LintConfig::default();

        if let Some(extensions) = self.stylecheck.extensions {
            config.extensions = extensions
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect();
        }
        for pattern in &self.stylecheck.exclude {
            Glob::new(pattern).map_err(|source| ConfigError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
        }
        config.exclude = self.stylecheck.exclude;
        if let Some(ref value) = self.stylecheck.fail_on {
            config.fail_on = Severity::parse(value).ok_or_else(|| ConfigError::InvalidSeverity {
                context: "fail_on".into(),
                value: value.clone(),
            })?;
        }

        for (id, table) in &self.rules {
            let rule = config
                .rule_mut(id)
                .ok_or_else(|| ConfigError::UnknownRule(id.clone()))?;
            table.apply(rule)?;
        }

        // Building the enabled rules catches bad parameters before any file is read.
        factory::build_enabled(&config)?;
        Ok(config)
    }
}

/// Parse config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<LintConfig, ConfigError> {
    let toml_config: TomlConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    toml_config.into_lint_config()
}

/// Load the config at `path`, or `stylecheck.toml` in the working directory
/// when no path is given. A missing default file means built-in defaults; a
/// missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<LintConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(LintConfig::default());
            }
            default
        }
    };

    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&text, &path)?;
    tracing::debug!(
        path = %path.display(),
        rules_enabled = config.rules.iter().filter(|r| r.enabled).count(),
        "config loaded"
    );
    Ok(config)
}

/// Config written by `stylecheck init`.
pub const STARTER_CONFIG: &str = r#"# stylecheck configuration

[stylecheck]
extensions = ["css", "scss"]
exclude = ["node_modules/**", "vendor/**", "dist/**"]
fail_on = "warning"

[rules.indentation-consistency]
width = 2

[rules.quote-style]
quote = "double"

[rules.compact-form-eligibility]
max_declarations = 3

[rules.nesting-depth]
max_depth = 1

[rules.nesting-span]
max_lines = 20

[rules.heading-comment-spacing]
blank_lines_before = 2
blank_lines_after = 1

# Require a prefix on custom Sass functions.
[rules.custom-function-namespace]
enabled = false
# namespace = "acme-"
# allowed_functions = []

# Enforce a class naming convention (BEM by default).
[rules.class-naming]
enabled = false
"#;
