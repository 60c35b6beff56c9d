//! Rule-table linting for fake-ajax.
//!
//! Rule tables are only checked when a call is resolved, so a typo in a key or
//! an empty rule surfaces as a confusing failure deep inside a test. This
//! library checks rule files up front. It can be used directly or through the
//! `fake-ajax-lint` binary.
//!
//! # Example
//!
//! ```no_run
//! use fake_ajax_lint::{lint_directory, lint_file, LintOptions};
//! use std::path::Path;
//!
//! let result = lint_file(Path::new("rules.json"), &LintOptions::default());
//! let all = lint_directory(Path::new("./fixtures"), &LintOptions::default());
//!
//! if result.has_errors() || all.has_errors() {
//!     eprintln!("Found {} errors", result.errors + all.errors);
//! }
//! ```

mod types;
mod validator;

use serde_json::Value;
use std::path::{Path, PathBuf};

pub use types::{LintIssue, LintOptions, LintResult, Severity};
pub use validator::{canonical_key, validate_key, validate_rule, validate_rule_file};

/// Whether `path` looks like a rule file (`.json`, `.yaml` or `.yml`).
pub fn is_rule_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "json" | "yaml" | "yml"))
        .unwrap_or(false)
}

/// Whether `path` has a `.yaml` or `.yml` extension, in any case.
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Parse a rule document, choosing YAML or JSON by extension.
pub fn parse_rule_document(path: &Path, content: &str) -> Result<Value, String> {
    if is_yaml(path) {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}

/// Lint a single rule file.
pub fn lint_file(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_issue(LintIssue::error(
                "E001",
                format!("Failed to read file: {e}"),
                path,
            ));
            return result;
        }
    };

    match parse_rule_document(path, &content) {
        Ok(document) => validate_rule_file(path, &document, &mut result, options),
        Err(e) => result.add_issue(
            LintIssue::error("E002", format!("Invalid rule document: {e}"), path)
                .with_suggestion("Check for JSON/YAML syntax errors"),
        ),
    }
    result
}

/// Rule files directly inside `path` (or `path` itself), sorted.
pub fn collect_rule_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if path.is_file() {
        if is_rule_file(path) {
            files.push(path.to_path_buf());
        }
    } else if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            let entry_path = entry.path();
            if entry_path.is_file() && is_rule_file(&entry_path) {
                files.push(entry_path);
            }
        }
    }
    files.sort();
    files
}

/// Lint every rule file in a directory (non-recursive).
pub fn lint_directory(path: &Path, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    if let Err(e) = std::fs::read_dir(path) {
        result.add_issue(LintIssue::error(
            "E001",
            format!("Failed to read directory: {e}"),
            path,
        ));
        return result;
    }
    for file in collect_rule_files(path) {
        result.merge(lint_file(&file, options));
    }
    result
}

/// Lint a JSON string held in memory.
pub fn lint_json(json: &str, source_name: &str, options: &LintOptions) -> LintResult {
    let mut result = LintResult::new();
    result.files_checked = 1;
    let path = Path::new(source_name);

    match serde_json::from_str::<Value>(json) {
        Ok(document) => validate_rule_file(path, &document, &mut result, options),
        Err(e) => result.add_issue(LintIssue::error(
            "E002",
            format!("Invalid rule document: {e}"),
            path,
        )),
    }
    result
}

/// Rewrite keys that can never match into their canonical spelling.
///
/// Returns the number of keys renamed. Keys whose canonical spelling already
/// exists in the table are left alone.
pub fn fix_keys(document: &mut Value) -> usize {
    let Some(urls) = document.get_mut("urls").and_then(Value::as_object_mut) else {
        return 0;
    };

    let renames: Vec<(String, String)> = urls
        .keys()
        .map(|key| (key.clone(), canonical_key(key)))
        .filter(|(key, canonical)| key != canonical && !urls.contains_key(canonical))
        .collect();

    let mut fixed = 0;
    for (key, canonical) in renames {
        if urls.contains_key(&canonical) {
            continue;
        }
        if let Some(rule) = urls.remove(&key) {
            urls.insert(canonical, rule);
            fixed += 1;
        }
    }
    fixed
}
