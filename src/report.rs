use crate::config::Severity;
use crate::rules::Finding;
use serde::Serialize;

/// Finding counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn of(findings: &[Finding]) -> Self {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        Self {
            total: findings.len(),
            errors,
            warnings: findings.len() - errors,
        }
    }

    /// Number of findings at or above `threshold`.
    pub fn at_or_above(&self, threshold: Severity) -> usize {
        match threshold {
            Severity::Error => self.errors,
            Severity::Warning => self.total,
        }
    }
}

/// The outcome of a lint run: every finding in a fixed order, plus counts.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub findings: Vec<Finding>,
    pub summary: Summary,
    pub files_scanned: usize,
    pub rules_loaded: usize,
    /// The run stopped early; files that had not started are missing.
    pub cancelled: bool,
}

impl Report {
    /// Sort and count `findings`.
    pub fn new(mut findings: Vec<Finding>) -> Self {
        sort_findings(&mut findings);
        let summary = Summary::of(&findings);
        Self {
            findings,
            summary,
            files_scanned: 0,
            rules_loaded: 0,
            cancelled: false,
        }
    }

    pub fn with_counts(mut self, files_scanned: usize, rules_loaded: usize) -> Self {
        self.files_scanned = files_scanned;
        self.rules_loaded = rules_loaded;
        self
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Whether any finding is at or above `threshold`. Findings below it are
    /// still listed but do not fail the run.
    pub fn fails(&self, threshold: Severity) -> bool {
        self.summary.at_or_above(threshold) > 0
    }

    pub fn exit_code(&self, threshold: Severity) -> i32 {
        if self.fails(threshold) {
            1
        } else {
            0
        }
    }
}

/// Order by file, then line, column and rule id. File-level findings (no
/// line) come first within their file.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.column.cmp(&b.column))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then_with(|| a.message.cmp(&b.message))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn make_finding(file: &str, line: usize, col: usize, severity: Severity, rule_id: &str) -> Finding {
        Finding {
            rule_id: rule_id.to_string(),
            severity,
            file: PathBuf::from(file),
            line: Some(line),
            column: Some(col),
            message: "msg".to_string(),
            suggest: None,
            source_line: None,
        }
    }

    #[test]
    fn sorts_by_line_column_then_rule() {
        let report = Report::new(vec![
            make_finding("a.css", 3, 1, Severity::Warning, "zero-unit"),
            make_finding("a.css", 1, 5, Severity::Warning, "quote-style"),
            make_finding("a.css", 1, 5, Severity::Warning, "hex-color-case"),
            make_finding("a.css", 1, 2, Severity::Error, "brace-spacing"),
        ]);
        let order: Vec<_> = report
            .findings
            .iter()
            .map(|f| (f.line.unwrap(), f.column.unwrap(), f.rule_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (1, 2, "brace-spacing"),
                (1, 5, "hex-color-case"),
                (1, 5, "quote-style"),
                (3, 1, "zero-unit"),
            ]
        );
    }

    #[test]
    fn file_level_findings_sort_first() {
        let report = Report::new(vec![
            make_finding("a.css", 1, 1, Severity::Warning, "zero-unit"),
            Finding::file_level("io-error", Severity::Error, Path::new("a.css"), "unreadable"),
        ]);
        assert_eq!(report.findings[0].rule_id, "io-error");
    }

    #[test]
    fn summary_counts() {
        let report = Report::new(vec![
            make_finding("a.css", 1, 1, Severity::Warning, "r1"),
            make_finding("b.css", 1, 1, Severity::Error, "r2"),
            make_finding("b.css", 2, 1, Severity::Warning, "r3"),
        ]);
        assert_eq!(
            report.summary,
            Summary {
                total: 3,
                errors: 1,
                warnings: 2
            }
        );
    }

    #[test]
    fn threshold_controls_failure() {
        let warnings_only = Report::new(vec![make_finding("a.css", 1, 1, Severity::Warning, "r")]);
        assert!(warnings_only.fails(Severity::Warning));
        assert!(!warnings_only.fails(Severity::Error));
        assert_eq!(warnings_only.exit_code(Severity::Error), 0);
        assert_eq!(warnings_only.exit_code(Severity::Warning), 1);

        let clean = Report::new(Vec::new());
        assert!(clean.is_clean());
        assert_eq!(clean.exit_code(Severity::Warning), 0);
    }
}
