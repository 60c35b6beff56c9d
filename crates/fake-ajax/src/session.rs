//! Per-test session state: the active rule table and the call recorder.
//!
//! A session is an explicit handle owned by the test. It is cheap to clone;
//! clones share the same state, so a handler can capture one and issue nested
//! calls. Call [`SessionContext::reset`] (or `init`) at the start of every test
//! so no rules or recorded calls leak from the previous one.

use crate::error::{FakeAjaxError, Result};
use crate::options::AjaxOptions;
use crate::recorder::CallRecorder;
use crate::rule::{RuleTable, SessionOptions};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

const UNNAMED_SPEC: &str = "<unnamed spec>";

#[derive(Debug, Default)]
struct SessionState {
    rules: Option<Arc<RuleTable>>,
    recorder: CallRecorder,
    label: Option<String>,
    /// Dispatches currently on the stack.
    depth: usize,
    /// First fatal error raised by a dispatch nested inside a handler.
    nested_error: Option<FakeAjaxError>,
}

/// Marks one dispatch as running. Closing the outermost scope hands back the
/// first fatal error raised by a nested dispatch.
pub(crate) struct DispatchScope {
    session: SessionContext,
    open: bool,
}

impl DispatchScope {
    pub(crate) fn close(mut self, error: Option<&FakeAjaxError>) -> Option<FakeAjaxError> {
        self.open = false;
        self.session.leave(error)
    }
}

impl Drop for DispatchScope {
    fn drop(&mut self) {
        if self.open {
            self.session.leave(None);
        }
    }
}

/// Shared handle to the state of the running test.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    /// Fresh session with no rule table and an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the rules from `options` and start a brand-new recorder.
    pub fn init(&self, options: SessionOptions) {
        self.install(None, options);
    }

    /// Like [`init`](Self::init), labelling diagnostics with `spec`.
    pub fn init_for(&self, spec: impl Into<String>, options: SessionOptions) {
        self.install(Some(spec.into()), options);
    }

    /// Drop all rules and recorded calls.
    pub fn reset(&self) {
        self.init(SessionOptions::default());
    }

    fn install(&self, label: Option<String>, options: SessionOptions) {
        let rule_count = options.urls.as_ref().map(RuleTable::len);
        *self.state.write() = SessionState {
            rules: options.urls.map(Arc::new),
            recorder: CallRecorder::new(),
            label,
            depth: 0,
            nested_error: None,
        };
        debug!("Session initialized (rules={:?})", rule_count);
    }

    /// Name of the running test used in warnings and errors.
    ///
    /// Falls back to the current thread name, which the Rust test harness sets
    /// to the test's path.
    pub fn spec_label(&self) -> String {
        if let Some(ref label) = self.state.read().label {
            return label.clone();
        }
        std::thread::current()
            .name()
            .unwrap_or(UNNAMED_SPEC)
            .to_string()
    }

    pub fn has_rules(&self) -> bool {
        self.state.read().rules.is_some()
    }

    pub(crate) fn rules(&self) -> Option<Arc<RuleTable>> {
        self.state.read().rules.clone()
    }

    pub(crate) fn record(&self, call: Arc<AjaxOptions>) {
        self.state.write().recorder.record(call);
    }

    pub(crate) fn enter(&self) -> DispatchScope {
        self.state.write().depth += 1;
        DispatchScope {
            session: self.clone(),
            open: true,
        }
    }

    fn leave(&self, error: Option<&FakeAjaxError>) -> Option<FakeAjaxError> {
        let mut state = self.state.write();
        state.depth = state.depth.saturating_sub(1);
        if state.depth > 0 {
            if state.nested_error.is_none() {
                state.nested_error = error.cloned();
            }
            None
        } else {
            state.nested_error.take()
        }
    }

    /// Most recent recorded call, URL decoded.
    pub fn last(&self) -> Result<AjaxOptions> {
        let spec = self.spec_label();
        self.state.read().recorder.last(&spec)
    }

    /// Most recent recorded call whose URL matches `pattern`, URL decoded.
    pub fn last_matching(&self, pattern: &str) -> Result<AjaxOptions> {
        let spec = self.spec_label();
        self.state.read().recorder.last_matching(pattern, &spec)
    }

    /// All recorded calls whose URL matches `pattern`, URL decoded.
    pub fn calls_matching(&self, pattern: &str) -> Result<Vec<AjaxOptions>> {
        self.state.read().recorder.calls_matching(pattern)
    }

    /// Snapshot of every recorded call, oldest first, URLs as issued.
    pub fn calls(&self) -> Vec<Arc<AjaxOptions>> {
        self.state.read().recorder.calls().to_vec()
    }

    pub fn call_count(&self) -> usize {
        self.state.read().recorder.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;

    #[test]
    fn test_new_session_has_no_rules() {
        let session = SessionContext::new();
        assert!(!session.has_rules());
        assert_eq!(session.call_count(), 0);
    }

    #[test]
    fn test_init_installs_rules_and_clears_calls() {
        let session = SessionContext::new();
        session.record(Arc::new(AjaxOptions::new("/old")));

        session.init(SessionOptions::new().rule("/a", Rule::success("y")));
        assert!(session.has_rules());
        assert_eq!(session.call_count(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let session = SessionContext::new();
        session.init(SessionOptions::new().rule("/a", Rule::success("y")));
        session.record(Arc::new(AjaxOptions::new("/a")));

        session.reset();
        assert!(!session.has_rules());
        assert!(matches!(
            session.last(),
            Err(FakeAjaxError::NoCallsRecorded { .. })
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionContext::new();
        let clone = session.clone();
        clone.record(Arc::new(AjaxOptions::new("/shared")));
        assert_eq!(session.last().unwrap().url, "/shared");
    }

    #[test]
    fn test_spec_label_defaults_to_thread_name() {
        let session = SessionContext::new();
        let worker = session.clone();
        let label = std::thread::Builder::new()
            .name("clicking question".to_string())
            .spawn(move || worker.spec_label())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(label, "clicking question");

        session.init_for("showing questions", SessionOptions::default());
        assert_eq!(session.spec_label(), "showing questions");
        let err = session.last().unwrap_err();
        assert!(err.to_string().contains("showing questions"));
    }
}
