use crate::config::Severity;
use crate::report::Report;
use crate::rules::Finding;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Print findings grouped by file with ANSI colors.
pub fn print_pretty(report: &Report) {
    let mut out = std::io::stdout();
    write_pretty(report, &mut out);
}

fn write_pretty(report: &Report, out: &mut dyn Write) {
    if report.findings.is_empty() {
        let _ = writeln!(
            out,
            "\x1b[32m✓\x1b[0m No style problems found ({} files scanned, {} rules loaded)",
            report.files_scanned, report.rules_loaded
        );
        write_cancelled_pretty(report, out);
        return;
    }

    // Group findings by file; the report order within a file is kept.
    let mut by_file: BTreeMap<String, Vec<&Finding>> = BTreeMap::new();
    for f in &report.findings {
        by_file
            .entry(f.file.display().to_string())
            .or_default()
            .push(f);
    }

    for (file, findings) in &by_file {
        let _ = writeln!(out, "\n\x1b[4m{}\x1b[0m", file);
        for f in findings {
            let severity_str = match f.severity {
                Severity::Error => "\x1b[31merror\x1b[0m",
                Severity::Warning => "\x1b[33mwarn \x1b[0m",
            };

            let location = match (f.line, f.column) {
                (Some(l), Some(c)) => format!("{}:{}", l, c),
                (Some(l), None) => format!("{}:1", l),
                _ => "-".to_string(),
            };

            let _ = writeln!(
                out,
                "  \x1b[90m{:<8}\x1b[0m {} \x1b[90m{:<26}\x1b[0m {}",
                location, severity_str, f.rule_id, f.message
            );

            if let Some(ref source) = f.source_line {
                let _ = writeln!(out, "           \x1b[90m│\x1b[0m {}", source.trim_end());
            }

            if let Some(ref suggest) = f.suggest {
                let _ = writeln!(out, "           \x1b[90m└─\x1b[0m \x1b[36m{}\x1b[0m", suggest);
            }
        }
    }

    let errors = report.summary.errors;
    let warnings = report.summary.warnings;

    let _ = writeln!(out);
    let _ = write!(out, "\x1b[1m");
    if errors > 0 {
        let _ = write!(out, "\x1b[31m{} error{}\x1b[0m\x1b[1m", errors, plural(errors));
    }
    if errors > 0 && warnings > 0 {
        let _ = write!(out, ", ");
    }
    if warnings > 0 {
        let _ = write!(out, "\x1b[33m{} warning{}\x1b[0m\x1b[1m", warnings, plural(warnings));
    }
    let _ = writeln!(
        out,
        " ({} files scanned, {} rules loaded)\x1b[0m",
        report.files_scanned, report.rules_loaded
    );
    write_cancelled_pretty(report, out);
}

fn write_cancelled_pretty(report: &Report, out: &mut dyn Write) {
    if report.cancelled {
        let _ = writeln!(
            out,
            "\x1b[33mscan cancelled\x1b[0m: results cover only the files that were started"
        );
    }
}

/// Print findings and the summary as JSON.
pub fn print_json(report: &Report) {
    let mut out = std::io::stdout();
    write_json(report, &mut out);
}

fn write_json(report: &Report, out: &mut dyn Write) {
    let output = json!({
        "findings": report.findings,
        "summary": {
            "total": report.summary.total,
            "errors": report.summary.errors,
            "warnings": report.summary.warnings,
            "files_scanned": report.files_scanned,
            "rules_loaded": report.rules_loaded,
            "cancelled": report.cancelled,
        },
    });

    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            let _ = writeln!(out, "{}", text);
        }
        Err(e) => tracing::error!(error = %e, "failed to serialize report"),
    }
}

/// Print findings in compact one-line-per-finding format.
/// Findings go to stdout; summary goes to stderr.
pub fn print_compact(report: &Report) {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    write_compact(report, &mut stdout, &mut stderr);
}

fn write_compact(report: &Report, out: &mut dyn Write, err: &mut dyn Write) {
    for f in &report.findings {
        let line = f.line.unwrap_or(1);
        let col = f.column.unwrap_or(1);

        let _ = writeln!(
            out,
            "{}:{}:{}: {}[{}] {}",
            f.file.display(),
            line,
            col,
            f.severity,
            f.rule_id,
            f.message
        );
    }

    write_summary_stderr(report, err);
}

/// Print findings as GitHub Actions workflow commands.
/// Findings go to stdout; summary goes to stderr.
pub fn print_github(report: &Report) {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    write_github(report, &mut stdout, &mut stderr);
}

/// Workflow command data escaping.
fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

fn write_github(report: &Report, out: &mut dyn Write, err: &mut dyn Write) {
    for f in &report.findings {
        let mut props = format!("file={}", escape_property(&f.file.display().to_string()));
        if let Some(line) = f.line {
            props.push_str(&format!(",line={}", line));
        }
        if let Some(col) = f.column {
            props.push_str(&format!(",col={}", col));
        }
        props.push_str(&format!(",title={}", escape_property(&f.rule_id)));

        let _ = writeln!(out, "::{} {}::{}", f.severity, props, escape_data(&f.message));
    }

    write_summary_stderr(report, err);
}

fn write_summary_stderr(report: &Report, err: &mut dyn Write) {
    let errors = report.summary.errors;
    let warnings = report.summary.warnings;

    if errors > 0 || warnings > 0 {
        let mut parts = Vec::new();
        if errors > 0 {
            parts.push(format!("{} error{}", errors, plural(errors)));
        }
        if warnings > 0 {
            parts.push(format!("{} warning{}", warnings, plural(warnings)));
        }
        let _ = writeln!(
            err,
            "{} ({} files scanned, {} rules loaded)",
            parts.join(", "),
            report.files_scanned,
            report.rules_loaded
        );
    } else {
        let _ = writeln!(
            err,
            "No style problems found ({} files scanned, {} rules loaded)",
            report.files_scanned, report.rules_loaded
        );
    }
    if report.cancelled {
        let _ = writeln!(err, "scan cancelled: results are partial");
    }
}
