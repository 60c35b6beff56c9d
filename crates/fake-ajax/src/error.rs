//! Error types for the fake ajax session.

use std::path::PathBuf;

/// Fatal conditions raised while dispatching a call or querying recorded calls.
///
/// Every variant is a test misconfiguration rather than a runtime condition of
/// the code under test, so callers are expected to propagate it with `?` and
/// let the test fail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FakeAjaxError {
    #[error("Ajax success handler is not defined in system under test for url '{key}' in spec '{spec}'")]
    MissingSuccessHandler { key: String, spec: String },

    #[error("Unknown mapping value for url '{key}'. Expected either successData, errorMessage or xhr. Actual was '{rule}'")]
    InvalidRule { key: String, rule: String },

    #[error("Ajax hasn't yet been called in spec '{spec}'")]
    NoCallsRecorded { spec: String },

    #[error("Matching url was not found by partial url '{pattern}' in spec '{spec}'")]
    NoMatchingCall { pattern: String, spec: String },

    #[error("Invalid url pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed loading test data from '{}': {reason}", path.display())]
    FixtureLoad { path: PathBuf, reason: String },

    #[error("Failed loading test data by selector '{selector}' from '{}'. Whole fixture: {fixture}", path.display())]
    FixtureSelector {
        selector: String,
        path: PathBuf,
        fixture: String,
    },

    #[error("Invalid session options: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FakeAjaxError>;
