//! Response rules and the per-test rule table.

use crate::error::{FakeAjaxError, Result};
use crate::key::CallKey;
use crate::transport::TransportOverrides;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Configured response behavior for one call key.
///
/// `success_data` wins when present. Otherwise `error_message` and/or `xhr`
/// select the error outcome. A rule with none of the three cannot be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xhr: Option<TransportOverrides>,
}

impl Rule {
    pub fn success(data: impl Into<Value>) -> Self {
        Self {
            success_data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Error rule driven purely by transport overrides.
    pub fn transport(xhr: TransportOverrides) -> Self {
        Self {
            xhr: Some(xhr),
            ..Default::default()
        }
    }

    pub fn with_xhr(mut self, xhr: TransportOverrides) -> Self {
        self.xhr = Some(xhr);
        self
    }
}

/// Mapping from call key to rule, fixed for the duration of one test.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: HashMap<String, Rule>,
}

impl RuleTable {
    /// Store the mapping verbatim. Rules are only checked when resolved.
    pub fn build(rules: HashMap<String, Rule>) -> Self {
        Self { rules }
    }

    pub fn lookup(&self, key: &CallKey) -> Option<&Rule> {
        self.rules.get(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, Rule)> for RuleTable {
    fn from_iter<I: IntoIterator<Item = (K, Rule)>>(iter: I) -> Self {
        Self::build(iter.into_iter().map(|(k, r)| (k.into(), r)).collect())
    }
}

/// Declarative options consumed by [`SessionContext::init`](crate::SessionContext::init).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Rules by call key. `None` means no rule table is configured at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<RuleTable>,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_urls(urls: RuleTable) -> Self {
        Self { urls: Some(urls) }
    }

    /// Add a single rule, creating the table if needed.
    pub fn rule(mut self, key: impl Into<String>, rule: Rule) -> Self {
        self.urls
            .get_or_insert_with(RuleTable::default)
            .rules
            .insert(key.into(), rule);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FakeAjaxError::Config(e.to_string()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| FakeAjaxError::Config(e.to_string()))
    }

    /// Load options from disk; `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FakeAjaxError::Config(format!("{}: {e}", path.display())))?;
        debug!("Loading session options from {:?}", path);
        if is_yaml(path) {
            Self::from_yaml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
