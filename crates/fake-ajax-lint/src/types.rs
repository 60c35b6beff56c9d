//! Issue and report types produced by the linter.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The rule table fails at resolution time.
    Error,
    /// The rule table loads but will not behave as its author expects.
    Warning,
    /// Informational message.
    Info,
}

impl Severity {
    /// Lowercase name used in text reports.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// A single finding in a rule file.
#[derive(Debug, Clone, Serialize)]
pub struct LintIssue {
    /// How serious the finding is.
    pub severity: Severity,
    /// Stable code such as `E005` or `W002`.
    pub code: String,
    /// What is wrong, naming the offending key where there is one.
    pub message: String,
    /// Rule file the finding belongs to.
    #[serde(serialize_with = "serialize_path")]
    pub file: PathBuf,
    /// Path inside the document, e.g. `urls["post /a"].xhr.status`.
    pub location: Option<String>,
    /// How to fix the finding, or what happens if it is left alone.
    pub suggestion: Option<String>,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl LintIssue {
    fn new(severity: Severity, code: &str, message: String, file: &Path) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message,
            file: file.to_path_buf(),
            location: None,
            suggestion: None,
        }
    }

    /// Finding that makes resolution fail.
    pub fn error(code: &str, message: impl Into<String>, file: &Path) -> Self {
        Self::new(Severity::Error, code, message.into(), file)
    }

    /// Finding that loads but misbehaves.
    pub fn warning(code: &str, message: impl Into<String>, file: &Path) -> Self {
        Self::new(Severity::Warning, code, message.into(), file)
    }

    pub fn info(code: &str, message: impl Into<String>, file: &Path) -> Self {
        Self::new(Severity::Info, code, message.into(), file)
    }

    /// Attach the document path of the finding.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach a hint for fixing the finding.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Findings for one or more rule files.
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    /// Findings in the order they were reported.
    pub issues: Vec<LintIssue>,
    /// Rule files read, including ones that failed to parse.
    pub files_checked: usize,
    /// Findings with [`Severity::Error`].
    pub errors: usize,
    /// Findings with [`Severity::Warning`].
    pub warnings: usize,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding and bump the matching counter.
    pub fn add_issue(&mut self, issue: LintIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings > 0
    }

    /// Whether the run should fail; `strict` promotes warnings to failures.
    pub fn failed(&self, strict: bool) -> bool {
        self.has_errors() || (strict && self.has_warnings())
    }

    /// Issue codes in report order, handy for assertions.
    pub fn codes(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.code.as_str()).collect()
    }

    /// Fold the findings of another file into this one.
    pub fn merge(&mut self, other: LintResult) {
        self.issues.extend(other.issues);
        self.files_checked += other.files_checked;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

/// Options for validation.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Report unknown rule fields (W005).
    pub check_unknown_fields: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            check_unknown_fields: true,
        }
    }
}
