use crate::config::{LintConfig, Severity};
use crate::rules::factory::{self, FactoryError};
use crate::rules::{Finding, LintContext, Rule, INTERNAL_ERROR, PARSE_ERROR};
use crate::syntax::{parse, tokenize, ParseIssue};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

/// Runs a fixed set of checks over stylesheets.
///
/// The engine holds no per-file state, so one instance can lint any number of
/// files from any number of threads.
pub struct Engine {
    rules: Vec<Box<dyn Rule>>,
}

impl Engine {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Build every rule the config enables.
    pub fn from_config(config: &LintConfig) -> Result<Self, FactoryError> {
        Ok(Self::new(factory::build_enabled(config)?))
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Tokenize, parse and check one file's text. Findings come back in rule
    /// order; sorting is left to the report.
    pub fn lint_source(&self, file_path: &Path, source: &str) -> Vec<Finding> {
        let started = Instant::now();
        let tokens = tokenize(source);
        let parsed = parse(&tokens);
        let ctx = LintContext {
            file_path,
            source,
            tokens: &tokens,
            stylesheet: &parsed.stylesheet,
        };

        let mut findings: Vec<Finding> = parsed
            .issues
            .iter()
            .map(|issue| parse_finding(&ctx, issue))
            .collect();
        findings.extend(self.evaluate(&ctx));

        tracing::debug!(
            file = %file_path.display(),
            tokens = tokens.len(),
            findings = findings.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "linted file"
        );
        findings
    }

    /// Run every check against an already parsed file.
    ///
    /// A check that panics is reported as a single `internal-error` finding;
    /// the remaining checks still run.
    pub fn evaluate(&self, ctx: &LintContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            match panic::catch_unwind(AssertUnwindSafe(|| rule.check(ctx))) {
                Ok(found) => findings.extend(dedup(found)),
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    tracing::error!(
                        rule = rule.id(),
                        file = %ctx.file_path.display(),
                        %reason,
                        "check panicked"
                    );
                    findings.push(Finding::file_level(
                        INTERNAL_ERROR,
                        Severity::Error,
                        ctx.file_path,
                        format!("check '{}' failed: {}", rule.id(), reason),
                    ));
                }
            }
        }
        findings
    }
}

/// Drop repeated reports of the same violation from one check.
fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings
        .into_iter()
        .filter(|f| seen.insert((f.line, f.column, f.message.clone())))
        .collect()
}

fn parse_finding(ctx: &LintContext, issue: &ParseIssue) -> Finding {
    let at = issue.position;
    Finding {
        rule_id: PARSE_ERROR.to_string(),
        severity: Severity::Error,
        file: ctx.file_path.to_path_buf(),
        line: Some(at.line),
        column: Some(at.column),
        message: issue.message.clone(),
        suggest: None,
        source_line: ctx.source_line(at).map(str::to_string),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
