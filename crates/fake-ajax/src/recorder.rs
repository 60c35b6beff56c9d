//! Append-only log of intercepted calls.

use crate::error::{FakeAjaxError, Result};
use crate::options::AjaxOptions;
use regex::Regex;
use std::borrow::Cow;
use std::sync::Arc;

/// Every call seen by the dispatcher, in issue order.
///
/// Entries are the caller's own options, shared rather than copied. Query
/// helpers hand back a copy whose URL is percent-decoded for readability; the
/// stored entry keeps the raw URL.
#[derive(Debug, Default)]
pub struct CallRecorder {
    calls: Vec<Arc<AjaxOptions>>,
}

impl CallRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, call: Arc<AjaxOptions>) {
        self.calls.push(call);
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Raw recorded calls, oldest first.
    pub fn calls(&self) -> &[Arc<AjaxOptions>] {
        &self.calls
    }

    /// Most recent call with its URL decoded.
    ///
    /// `spec` names the running test in the error.
    pub fn last(&self, spec: &str) -> Result<AjaxOptions> {
        self.calls
            .last()
            .map(|call| with_url_decoded(call))
            .ok_or_else(|| FakeAjaxError::NoCallsRecorded {
                spec: spec.to_string(),
            })
    }

    /// Most recent call whose raw URL matches `pattern`, with its URL decoded.
    ///
    /// The pattern is a regular expression searched anywhere in the URL, so a
    /// plain fragment such as `"first"` works as a substring match.
    pub fn last_matching(&self, pattern: &str, spec: &str) -> Result<AjaxOptions> {
        let regex = compile(pattern)?;
        self.calls
            .iter()
            .rev()
            .find(|call| regex.is_match(&call.url))
            .map(|call| with_url_decoded(call))
            .ok_or_else(|| FakeAjaxError::NoMatchingCall {
                pattern: pattern.to_string(),
                spec: spec.to_string(),
            })
    }

    /// All calls whose raw URL matches `pattern`, oldest first, URLs decoded.
    pub fn calls_matching(&self, pattern: &str) -> Result<Vec<AjaxOptions>> {
        let regex = compile(pattern)?;
        Ok(self
            .calls
            .iter()
            .filter(|call| regex.is_match(&call.url))
            .map(|call| with_url_decoded(call))
            .collect())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| FakeAjaxError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn with_url_decoded(call: &AjaxOptions) -> AjaxOptions {
    let mut copy = call.clone();
    copy.url = decode_url(&call.url).into_owned();
    copy
}

/// Percent-decode a URL. `+` is kept as is; invalid UTF-8 is replaced lossily.
pub fn decode_url(url: &str) -> Cow<'_, str> {
    match urlencoding::decode(url) {
        Ok(decoded) => decoded,
        Err(_) => {
            let bytes = urlencoding::decode_binary(url.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}
