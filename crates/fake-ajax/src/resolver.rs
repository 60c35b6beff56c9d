//! Decides how an intercepted call is answered.
//!
//! | situation                                   | outcome                           |
//! |---------------------------------------------|-----------------------------------|
//! | no rule table configured                    | warn, then as "no rule"           |
//! | no rule for the key                         | warn, default success             |
//! | no rule and no success handler              | `MissingSuccessHandler`           |
//! | rule with `successData`                     | success, overrides on 200 defaults|
//! | rule with `errorMessage` and/or `xhr`       | error, overrides on 500 defaults  |
//! | rule with none of the above                 | `InvalidRule`                     |

use crate::error::{FakeAjaxError, Result};
use crate::key::CallKey;
use crate::rule::{Rule, RuleTable};
use crate::transport::{TransportResult, STATUS_TEXT_ERROR, STATUS_TEXT_SUCCESS};
use serde_json::Value;
use tracing::{error, warn};

/// Payload handed to `success` when no rule matches.
pub const DEFAULT_SUCCESS_DATA: &str = "default success data";

/// Resolved answer for one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Success {
        data: Value,
        transport: TransportResult,
    },
    Error {
        transport: TransportResult,
    },
}

impl Resolution {
    pub fn status_text(&self) -> &'static str {
        match self {
            Resolution::Success { .. } => STATUS_TEXT_SUCCESS,
            Resolution::Error { .. } => STATUS_TEXT_ERROR,
        }
    }

    pub fn transport(&self) -> &TransportResult {
        match self {
            Resolution::Success { transport, .. } | Resolution::Error { transport } => transport,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resolution::Success { .. })
    }
}

/// Resolve `key` against the active rule table.
///
/// `has_success_handler` tells whether the caller can receive the default
/// answer; `spec` labels warnings and errors with the running test.
pub fn resolve(
    rules: Option<&RuleTable>,
    key: &CallKey,
    has_success_handler: bool,
    spec: &str,
) -> Result<Resolution> {
    let rule = match rules {
        Some(table) => table.lookup(key),
        None => {
            warn!(
                "There are no ajax url mappings defined. Actual ajax url was '{}'.",
                key
            );
            None
        }
    };

    match rule {
        Some(rule) => resolve_rule(key, rule),
        None => resolve_default(key, has_success_handler, spec),
    }
}

fn resolve_default(key: &CallKey, has_success_handler: bool, spec: &str) -> Result<Resolution> {
    warn!(
        "Applying default success data for url '{}' in spec '{}'.",
        key, spec
    );
    if !has_success_handler {
        let err = FakeAjaxError::MissingSuccessHandler {
            key: key.to_string(),
            spec: spec.to_string(),
        };
        error!("{}", err);
        return Err(err);
    }
    Ok(Resolution::Success {
        data: Value::String(DEFAULT_SUCCESS_DATA.to_string()),
        transport: TransportResult::success(),
    })
}

fn resolve_rule(key: &CallKey, rule: &Rule) -> Result<Resolution> {
    if let Some(ref data) = rule.success_data {
        return Ok(Resolution::Success {
            data: data.clone(),
            transport: TransportResult::success().merged(rule.xhr.as_ref()),
        });
    }

    if rule.error_message.is_some() || rule.xhr.is_some() {
        let mut transport = TransportResult::error().merged(rule.xhr.as_ref());
        if let Some(ref message) = rule.error_message {
            transport.response_text = Some(message.clone());
        }
        return Ok(Resolution::Error { transport });
    }

    let err = FakeAjaxError::InvalidRule {
        key: key.to_string(),
        rule: serde_json::to_string(rule).unwrap_or_default(),
    };
    error!("{}", err);
    Err(err)
}
