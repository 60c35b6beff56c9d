//! Validation of rule-table documents.

use crate::types::{LintIssue, LintOptions, LintResult};
use fake_ajax::{CallKey, TransportOverrides};
use serde_json::Value;
use std::path::Path;

const RULE_FIELDS: [&str; 3] = ["successData", "errorMessage", "xhr"];

/// Validate a complete rule file (`{ "urls": { key: rule } }`).
pub fn validate_rule_file(
    file: &Path,
    document: &Value,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let Some(root) = document.as_object() else {
        result.add_issue(
            LintIssue::error("E003", "Rule file must be a mapping with a 'urls' field", file)
                .with_suggestion("Wrap the rules in {\"urls\": { ... }}"),
        );
        return;
    };

    let Some(urls) = root.get("urls").filter(|v| !v.is_null()) else {
        result.add_issue(
            LintIssue::warning(
                "W001",
                "No 'urls' mapping: every call will fall back to default success data",
                file,
            )
            .with_suggestion("Add a \"urls\" mapping from call key to rule"),
        );
        return;
    };

    let Some(urls) = urls.as_object() else {
        result.add_issue(
            LintIssue::error("E003", "'urls' must be a mapping from call key to rule", file)
                .with_location("urls"),
        );
        return;
    };

    if urls.is_empty() {
        result.add_issue(
            LintIssue::info("I001", "'urls' is empty", file).with_location("urls"),
        );
    }

    for (key, rule) in urls {
        validate_key(file, key, result);
        validate_rule(file, key, rule, result, options);
    }
}

/// Canonical spelling of a configured key, as the dispatcher would compute it.
pub fn canonical_key(key: &str) -> String {
    let (method, url) = CallKey::split(key);
    CallKey::for_call(method, url).into()
}

/// Check that a key can ever be produced by the dispatcher.
pub fn validate_key(file: &Path, key: &str, result: &mut LintResult) {
    let (method, url) = CallKey::split(key);
    let Some(method) = method else {
        return;
    };
    let location = format!("urls[\"{key}\"]");

    if method.eq_ignore_ascii_case(fake_ajax::DEFAULT_METHOD) {
        result.add_issue(
            LintIssue::warning(
                "W003",
                format!("Key '{key}' never matches: GET calls are keyed by the bare URL"),
                file,
            )
            .with_location(location)
            .with_suggestion(format!("Use \"{url}\"")),
        );
    } else if method != method.to_lowercase() {
        result.add_issue(
            LintIssue::warning(
                "W002",
                format!("Key '{key}' never matches: method prefixes are lowercase"),
                file,
            )
            .with_location(location)
            .with_suggestion(format!("Use \"{}\"", canonical_key(key))),
        );
    }
}

/// Check a single rule against the resolution outcomes it can produce.
pub fn validate_rule(
    file: &Path,
    key: &str,
    rule: &Value,
    result: &mut LintResult,
    options: &LintOptions,
) {
    let location = format!("urls[\"{key}\"]");
    let Some(fields) = rule.as_object() else {
        result.add_issue(
            LintIssue::error("E004", format!("Rule for '{key}' must be an object"), file)
                .with_location(location),
        );
        return;
    };

    let present = |name: &str| fields.get(name).filter(|v| !v.is_null());
    let success_data = present("successData");
    let error_message = present("errorMessage");
    let xhr = present("xhr");

    if success_data.is_none() && error_message.is_none() && xhr.is_none() {
        result.add_issue(
            LintIssue::error(
                "E005",
                format!("Rule for '{key}' has none of successData, errorMessage or xhr"),
                file,
            )
            .with_location(location.clone())
            .with_suggestion("Calls to this key fail with an invalid rule error"),
        );
    }

    if let Some(message) = error_message {
        if !message.is_string() {
            result.add_issue(
                LintIssue::error("E006", "errorMessage must be a string", file)
                    .with_location(format!("{location}.errorMessage")),
            );
        }
    }

    if let Some(xhr) = xhr {
        validate_xhr(file, &location, xhr, result);
    }

    if success_data.is_some() && error_message.is_some() {
        result.add_issue(
            LintIssue::warning(
                "W004",
                format!("Rule for '{key}' has both successData and errorMessage"),
                file,
            )
            .with_location(location.clone())
            .with_suggestion("successData wins; errorMessage is ignored"),
        );
    }

    if options.check_unknown_fields {
        for name in fields.keys() {
            if !RULE_FIELDS.contains(&name.as_str()) {
                result.add_issue(
                    LintIssue::warning("W005", format!("Unknown rule field '{name}'"), file)
                        .with_location(format!("{location}.{name}"))
                        .with_suggestion("Recognized fields: successData, errorMessage, xhr"),
                );
            }
        }
    }
}

fn validate_xhr(file: &Path, location: &str, xhr: &Value, result: &mut LintResult) {
    let location = format!("{location}.xhr");
    if !xhr.is_object() {
        result.add_issue(
            LintIssue::error("E007", "xhr must be an object", file).with_location(location),
        );
        return;
    }
    if let Err(e) = serde_json::from_value::<TransportOverrides>(xhr.clone()) {
        result.add_issue(
            LintIssue::error("E007", format!("Invalid xhr override: {e}"), file)
                .with_location(location)
                .with_suggestion("status must be a number or numeric string, readyState a small number"),
        );
    }
}
