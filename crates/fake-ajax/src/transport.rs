//! Synthesized transport objects handed to callbacks in place of a real
//! network response.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ready state of a finished request.
pub const READY_STATE_DONE: u8 = 4;

/// Status text passed alongside a successful outcome.
pub const STATUS_TEXT_SUCCESS: &str = "success";

/// Status text passed alongside an error outcome.
pub const STATUS_TEXT_ERROR: &str = "error";

/// Stand-in for the transport object of a completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportResult {
    pub ready_state: u8,
    pub status: u16,
    pub status_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    /// Fields carried over from rule overrides that have no dedicated slot
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl TransportResult {
    /// Defaults for a successful outcome: `{4, 200, "OK"}`
    pub fn success() -> Self {
        Self {
            ready_state: READY_STATE_DONE,
            status: 200,
            status_text: "OK".to_string(),
            response_text: None,
            extra: BTreeMap::new(),
        }
    }

    /// Defaults for an error outcome: `{4, 500, "Internal Server Error"}`
    pub fn error() -> Self {
        Self {
            ready_state: READY_STATE_DONE,
            status: 500,
            status_text: "Internal Server Error".to_string(),
            response_text: None,
            extra: BTreeMap::new(),
        }
    }

    /// Shallow merge: every field set in `overrides` replaces the current one.
    pub fn merged(mut self, overrides: Option<&TransportOverrides>) -> Self {
        let Some(overrides) = overrides else {
            return self;
        };
        if let Some(ready_state) = overrides.ready_state {
            self.ready_state = ready_state;
        }
        if let Some(status) = overrides.status {
            self.status = status;
        }
        if let Some(ref status_text) = overrides.status_text {
            self.status_text = status_text.clone();
        }
        if let Some(ref response_text) = overrides.response_text {
            self.response_text = Some(response_text.clone());
        }
        for (k, v) in &overrides.extra {
            self.extra.insert(k.clone(), v.clone());
        }
        self
    }
}

/// Partial transport configured on a rule (the `xhr` field).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_state: Option<u8>,
    #[serde(
        default,
        deserialize_with = "deserialize_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl TransportOverrides {
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn response_text(text: impl Into<String>) -> Self {
        Self {
            response_text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Accept `status` as either a number or a numeric string.
fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u16::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom("invalid status number")),
        Some(Value::String(s)) => s
            .parse::<u16>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid status string: {s}"))),
        Some(_) => Err(D::Error::custom("status must be a number or string")),
    }
}
