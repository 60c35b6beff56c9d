//! Synchronous fixture loading for building rule tables.
//!
//! Fixtures are read straight from disk. They never go through the
//! [`Dispatcher`](crate::Dispatcher), so loading one is not recorded and is
//! not answered from the rule table.

use crate::error::{FakeAjaxError, Result};
use crate::rule::is_yaml;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error};

/// Load the fragment of a JSON or YAML fixture addressed by `selector`.
///
/// `selector` is a JSON Pointer (`/questions/0/title`); an empty selector
/// returns the whole document.
pub fn load_test_data<P: AsRef<Path>>(path: P, selector: &str) -> Result<Value> {
    let path = path.as_ref();
    let fixture = read_fixture(path).map_err(log_error)?;

    match fixture.pointer(selector) {
        Some(found) => {
            debug!("Loaded test data '{}' from {:?}", selector, path);
            Ok(found.clone())
        }
        None => Err(log_error(FakeAjaxError::FixtureSelector {
            selector: selector.to_string(),
            path: path.to_path_buf(),
            fixture: fixture.to_string(),
        })),
    }
}

fn read_fixture(path: &Path) -> Result<Value> {
    let load_error = |reason: String| FakeAjaxError::FixtureLoad {
        path: path.to_path_buf(),
        reason,
    };
    let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&contents).map_err(|e| load_error(e.to_string()))
    } else {
        serde_json::from_str(&contents).map_err(|e| load_error(e.to_string()))
    }
}

fn log_error(err: FakeAjaxError) -> FakeAjaxError {
    error!("{}", err);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_fixture(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_by_pointer() {
        let (_dir, path) = write_fixture(
            "fixture.json",
            r#"{"questions": ["Question 1", "Question 2", "Question 3"], "answer2": "Answer 2"}"#,
        );
        assert_eq!(load_test_data(&path, "/answer2").unwrap(), json!("Answer 2"));
        assert_eq!(
            load_test_data(&path, "/questions/2").unwrap(),
            json!("Question 3")
        );
    }

    #[test]
    fn test_empty_selector_returns_whole_document() {
        let (_dir, path) = write_fixture("fixture.yaml", "name: John\nage: 30\n");
        assert_eq!(
            load_test_data(&path, "").unwrap(),
            json!({"name": "John", "age": 30})
        );
    }

    #[test]
    fn test_missing_selector_reports_whole_fixture() {
        let (_dir, path) = write_fixture("fixture.json", r#"{"a": 1}"#);
        let err = load_test_data(&path, "/missing").unwrap_err();
        assert!(matches!(err, FakeAjaxError::FixtureSelector { .. }));
        let message = err.to_string();
        assert!(message.contains("/missing"));
        assert!(message.contains(r#"{"a":1}"#));
    }

    #[test]
    fn test_unreadable_fixture() {
        let err = load_test_data("/definitely/not/here.json", "").unwrap_err();
        assert!(matches!(err, FakeAjaxError::FixtureLoad { .. }));
    }

    #[test]
    fn test_malformed_fixture() {
        let (_dir, path) = write_fixture("fixture.json", "{not json");
        assert!(matches!(
            load_test_data(&path, "").unwrap_err(),
            FakeAjaxError::FixtureLoad { .. }
        ));
    }
}
