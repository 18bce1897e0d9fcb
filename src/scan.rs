use crate::config::{LintConfig, Severity};
use crate::engine::Engine;
use crate::report::Report;
use crate::rules::factory::FactoryError;
use crate::rules::{Finding, IO_ERROR};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid glob pattern: {0}")]
    GlobParse(#[from] globset::Error),
    #[error("failed to build rule: {0}")]
    RuleFactory(#[from] FactoryError),
}

/// Shared flag for stopping a run between files. Files already being linted
/// finish; files not yet started are skipped.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Run a full scan: build rules, walk files, lint each file in parallel.
pub fn run_scan(config: &LintConfig, target_paths: &[PathBuf]) -> Result<Report, ScanError> {
    run_scan_with_cancel(config, target_paths, &CancelToken::new())
}

pub fn run_scan_with_cancel(
    config: &LintConfig,
    target_paths: &[PathBuf],
    cancel: &CancelToken,
) -> Result<Report, ScanError> {
    let started = Instant::now();
    let engine = Engine::from_config(config)?;
    let exclude_set = build_glob_set(&config.exclude)?;
    let files = collect_files(target_paths, &config.extensions, &exclude_set);
    tracing::debug!(
        files = files.len(),
        rules = engine.rules().len(),
        "starting scan"
    );

    let files_scanned = AtomicUsize::new(0);
    let per_file: Vec<Vec<Finding>> = files
        .par_iter()
        .map(|path| {
            if cancel.is_cancelled() {
                return Vec::new();
            }
            files_scanned.fetch_add(1, Ordering::Relaxed);
            lint_file(&engine, path)
        })
        .collect();

    let cancelled = cancel.is_cancelled();
    let files_scanned = files_scanned.into_inner();
    if cancelled {
        tracing::info!(
            files_scanned,
            files_total = files.len(),
            "scan cancelled"
        );
    }

    let mut report = Report::new(per_file.into_iter().flatten().collect())
        .with_counts(files_scanned, engine.rules().len());
    report.cancelled = cancelled;
    tracing::debug!(
        findings = report.summary.total,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "scan finished"
    );
    Ok(report)
}

/// Read and lint one file. Unreadable or non-UTF-8 files produce a single
/// file-level `io-error` finding instead of line findings.
pub fn lint_file(engine: &Engine, path: &Path) -> Vec<Finding> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "failed to read file");
            return vec![Finding::file_level(
                IO_ERROR,
                Severity::Error,
                path,
                format!("failed to read file: {}", e),
            )];
        }
    };
    match String::from_utf8(bytes) {
        Ok(text) => {
            let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
            engine.lint_source(path, text)
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "file is not valid UTF-8");
            vec![Finding::file_level(
                IO_ERROR,
                Severity::Error,
                path,
                format!("file is not valid UTF-8: {}", e.utf8_error()),
            )]
        }
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            extensions.iter().any(|want| want.eq_ignore_ascii_case(ext))
        })
}

/// Explicit file targets are always kept; directories are walked (honouring
/// ignore files) and filtered by extension and exclude patterns.
fn collect_files(target_paths: &[PathBuf], extensions: &[String], exclude_set: &GlobSet) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for target in target_paths {
        if !target.is_dir() {
            files.push(target.clone());
            continue;
        }
        for entry in WalkBuilder::new(target).build() {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().map_or(false, |t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if !has_extension(&path, extensions) {
                continue;
            }
            let rel = path.strip_prefix(target).unwrap_or(&path);
            if exclude_set.is_match(rel) {
                continue;
            }
            files.push(path);
        }
    }
    files.sort();
    files.dedup();
    files
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{brace_spacing, hex_color};

    fn write(dir: &Path, rel: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn walks_directories_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.css", b".a{color:#FFFFFF}");
        write(dir.path(), "nested/b.scss", b".b {\n  color: #fff;\n}\n");
        write(dir.path(), "notes.txt", b".a{color:#FFFFFF}");

        let report = run_scan(&LintConfig::default(), &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(report.files_scanned, 2);
        assert_eq!(report.summary.total, 3);
        assert!(report.findings.iter().all(|f| f.file.ends_with("a.css")));
        assert!(!report.cancelled);
    }

    #[test]
    fn exclude_patterns_apply_to_walked_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "vendor/lib.css", b".a{color:#FFFFFF}");
        write(dir.path(), "app.css", b".a {\n  color: #fff;\n}\n");

        let config = LintConfig {
            exclude: vec!["vendor/**".into()],
            ..LintConfig::default()
        };
        let report = run_scan(&config, &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(report.files_scanned, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn explicit_files_ignore_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "theme.less", b".a{color:#fff;}");
        let report = run_scan(&LintConfig::default(), &[path]).unwrap();
        assert_eq!(report.files_scanned, 1);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, brace_spacing::ID);
    }

    #[test]
    fn undecodable_file_gets_one_io_finding() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.css", &[0x2e, 0x61, 0x7b, 0xff, 0xfe, 0x7d]);
        let good = write(dir.path(), "good.css", b".a {\n  color: #FFF;\n}\n");

        let report = run_scan(&LintConfig::default(), &[bad.clone(), good]).unwrap();
        let for_bad: Vec<_> = report.findings.iter().filter(|f| f.file == bad).collect();
        assert_eq!(for_bad.len(), 1);
        assert_eq!(for_bad[0].rule_id, IO_ERROR);
        assert_eq!(for_bad[0].line, None);
        assert!(report
            .findings
            .iter()
            .any(|f| f.rule_id == hex_color::ID && f.file.ends_with("good.css")));
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_scan(&LintConfig::default(), &[dir.path().join("gone.css")]).unwrap();
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule_id, IO_ERROR);
        assert!(report.fails(Severity::Error));
    }

    #[test]
    fn cancelled_before_start_lints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.css", b".a{color:#FFFFFF}");
        let cancel = CancelToken::new();
        cancel.cancel();

        let report =
            run_scan_with_cancel(&LintConfig::default(), &[dir.path().to_path_buf()], &cancel)
                .unwrap();
        assert!(report.cancelled);
        assert_eq!(report.files_scanned, 0);
        assert!(report.is_clean());
    }

    #[test]
    fn byte_order_mark_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bom.css", "\u{feff}.a {\n  color: red;\n}\n".as_bytes());
        let report = run_scan(&LintConfig::default(), &[path]).unwrap();
        assert!(report.is_clean());
    }

    #[test]
    fn bad_rule_config_fails_the_run() {
        let mut config = LintConfig::default();
        config.rule_mut("custom-function-namespace").unwrap().enabled = true;
        assert!(matches!(
            run_scan(&config, &[]),
            Err(ScanError::RuleFactory(_))
        ));
    }
}
