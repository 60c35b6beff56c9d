//! The intercepting call entry point.
//!
//! Order of a dispatched call, all inline:
//! record -> `beforeSend` -> resolve -> `success` or `error` -> `complete`.

use crate::error::Result;
use crate::options::AjaxOptions;
use crate::resolver::{resolve, Resolution};
use crate::session::SessionContext;
use std::sync::Arc;
use tracing::{debug, error};

/// Seam between code under test and the call-issuing function.
///
/// Production code issues calls through this trait; tests hand it a
/// [`Dispatcher`] instead of the real transport.
pub trait AjaxTransport {
    fn ajax(&self, options: AjaxOptions) -> Result<()>;
}

/// Recording, rule-matching replacement for the real call-issuing function.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    session: SessionContext,
}

impl Dispatcher {
    pub fn new(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Issue a call against the session's rule table.
    ///
    /// The call is recorded before anything else runs. A fatal resolution
    /// error is returned before any of `success`, `error` or `complete` fire.
    /// No lock is held while handlers run, so they may dispatch nested calls.
    /// A fatal error from a nested call cannot leave the handler that issued
    /// it, so the outermost dispatch returns the first one instead of `Ok`.
    pub fn dispatch(&self, options: AjaxOptions) -> Result<Resolution> {
        let scope = self.session.enter();
        let result = self.run(options);
        match scope.close(result.as_ref().err()) {
            Some(nested) if result.is_ok() => {
                error!("Nested ajax call failed: {}", nested);
                Err(nested)
            }
            _ => result,
        }
    }

    fn run(&self, options: AjaxOptions) -> Result<Resolution> {
        let call = Arc::new(options);
        self.session.record(Arc::clone(&call));

        if let Some(ref before_send) = call.before_send {
            before_send();
        }

        let key = call.key();
        let spec = self.session.spec_label();
        let rules = self.session.rules();
        let resolution = resolve(rules.as_deref(), &key, call.success.is_some(), &spec)?;

        let binding = call.binding();
        let status_text = resolution.status_text();
        match resolution {
            Resolution::Success {
                ref data,
                ref transport,
            } => match call.success {
                Some(ref success) => success(&binding, data, status_text, transport),
                None => debug!("No success handler for '{}', skipping", key),
            },
            Resolution::Error { ref transport } => match call.error {
                Some(ref error) => error(&binding, transport, status_text),
                None => debug!("No error handler for '{}', skipping", key),
            },
        }

        if let Some(ref complete) = call.complete {
            complete(&binding, resolution.transport(), status_text);
        }

        debug!(
            "Dispatched '{}' -> {} ({})",
            key,
            status_text,
            resolution.transport().status
        );
        Ok(resolution)
    }
}

impl AjaxTransport for Dispatcher {
    fn ajax(&self, options: AjaxOptions) -> Result<()> {
        self.dispatch(options).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FakeAjaxError;
    use crate::rule::{Rule, SessionOptions};
    use parking_lot::Mutex;
    use serde_json::json;

    fn dispatcher_with(options: SessionOptions) -> Dispatcher {
        let dispatcher = Dispatcher::default();
        dispatcher.session().init(options);
        dispatcher
    }

    #[test]
    fn test_callbacks_fire_in_order() {
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/example", Rule::success("yay")));
        let events = Arc::new(Mutex::new(Vec::new()));

        let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());
        let recorder = dispatcher.session().clone();
        let e0 = events.clone();
        dispatcher
            .dispatch(
                AjaxOptions::new("/example")
                    .before_send(move || {
                        e0.lock().push(format!("beforeSend:{}", recorder.call_count()));
                    })
                    .on_success(move |_, data, ts, _| {
                        e1.lock().push(format!("success:{}:{ts}", data.as_str().unwrap_or("")));
                    })
                    .on_error(move |_, _, _| e2.lock().push("error".to_string()))
                    .on_complete(move |_, xhr, ts| {
                        e3.lock().push(format!("complete:{}:{ts}", xhr.status));
                    }),
            )
            .unwrap();

        assert_eq!(
            *events.lock(),
            vec![
                "beforeSend:1".to_string(),
                "success:yay:success".to_string(),
                "complete:200:success".to_string(),
            ]
        );
    }

    #[test]
    fn test_error_outcome_fires_error_then_complete() {
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/fails", Rule::error("argh")));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (s1, s2) = (seen.clone(), seen.clone());

        let resolution = dispatcher
            .dispatch(
                AjaxOptions::new("/fails")
                    .on_success(|_, _, _, _| panic!("success must not fire"))
                    .on_error(move |_, xhr, ts| {
                        s1.lock()
                            .push(format!("{ts}:{}", xhr.response_text.clone().unwrap_or_default()));
                    })
                    .on_complete(move |_, xhr, ts| s2.lock().push(format!("{ts}:{}", xhr.status))),
            )
            .unwrap();

        assert!(!resolution.is_success());
        assert_eq!(*seen.lock(), vec!["error:argh", "error:500"]);
    }

    #[test]
    fn test_fatal_error_records_once_and_skips_handlers() {
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/bad", Rule::default()));
        let completed = Arc::new(Mutex::new(false));
        let flag = completed.clone();

        let err = dispatcher
            .dispatch(
                AjaxOptions::new("/bad")
                    .on_success(|_, _, _, _| panic!("success must not fire"))
                    .on_complete(move |_, _, _| *flag.lock() = true),
            )
            .unwrap_err();

        assert!(matches!(err, FakeAjaxError::InvalidRule { .. }));
        assert!(!*completed.lock());
        assert_eq!(dispatcher.session().call_count(), 1);
    }

    #[test]
    fn test_missing_success_handler_without_rule() {
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/a", Rule::success("y")));
        let err = dispatcher.dispatch(AjaxOptions::new("/unknown")).unwrap_err();
        assert!(matches!(err, FakeAjaxError::MissingSuccessHandler { ref key, .. } if key == "/unknown"));
        assert_eq!(dispatcher.session().call_count(), 1);
    }

    #[test]
    fn test_matched_rule_without_handler_still_completes() {
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/a", Rule::success("y")));
        let completed = Arc::new(Mutex::new(0));
        let count = completed.clone();
        dispatcher
            .dispatch(AjaxOptions::new("/a").on_complete(move |_, _, _| *count.lock() += 1))
            .unwrap();
        assert_eq!(*completed.lock(), 1);
    }

    #[test]
    fn test_handlers_bound_to_context_or_options() {
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/test", Rule::success("hi")));
        let bound = Arc::new(Mutex::new(Vec::new()));

        let b = bound.clone();
        dispatcher
            .dispatch(
                AjaxOptions::new("/test")
                    .context(json!({"context_data": "I'm the context"}))
                    .on_success(move |this, _, _, _| {
                        b.lock().push(this.get("context_data").cloned());
                    }),
            )
            .unwrap();

        let b = bound.clone();
        dispatcher
            .dispatch(AjaxOptions::new("/test").data(json!({"k": 1})).on_success(
                move |this, _, _, _| {
                    assert_eq!(this.options().and_then(|o| o.data.clone()), Some(json!({"k": 1})));
                    b.lock().push(this.get("context_data").cloned());
                },
            ))
            .unwrap();

        assert_eq!(*bound.lock(), vec![Some(json!("I'm the context")), None]);
    }

    #[test]
    fn test_transport_trait_hides_resolution() {
        fn issue(transport: &impl AjaxTransport) -> Result<()> {
            transport.ajax(AjaxOptions::new("/a").on_success(|_, _, _, _| {}))
        }
        let dispatcher = dispatcher_with(SessionOptions::new().rule("/a", Rule::success("y")));
        issue(&dispatcher).unwrap();
        assert_eq!(dispatcher.session().last().unwrap().url, "/a");
    }

    #[test]
    fn test_nested_fatal_error_reaches_outer_caller() {
        let dispatcher = dispatcher_with(
            SessionOptions::new()
                .rule("/outer", Rule::success("y"))
                .rule("/bad", Rule::default()),
        );
        let inner = dispatcher.clone();
        let nested = Arc::new(Mutex::new(None));
        let seen = nested.clone();

        let err = dispatcher
            .dispatch(AjaxOptions::new("/outer").on_success(move |_, _, _, _| {
                let result = inner.dispatch(AjaxOptions::new("/bad").on_success(|_, _, _, _| {}));
                *seen.lock() = Some(result.is_err());
            }))
            .unwrap_err();

        assert!(matches!(err, FakeAjaxError::InvalidRule { ref key, .. } if key == "/bad"));
        assert_eq!(*nested.lock(), Some(true));
        assert_eq!(dispatcher.session().call_count(), 2);
    }

    #[test]
    fn test_first_nested_error_wins_across_levels() {
        let dispatcher = dispatcher_with(
            SessionOptions::new()
                .rule("/outer", Rule::success("y"))
                .rule("/middle", Rule::error("nope"))
                .rule("/bad", Rule::default()),
        );
        let middle = dispatcher.clone();
        let err = dispatcher
            .dispatch(AjaxOptions::new("/outer").on_success(move |_, _, _, _| {
                let deepest = middle.clone();
                let _ = middle.dispatch(AjaxOptions::new("/middle").on_error(move |_, _, _| {
                    let _ = deepest.dispatch(AjaxOptions::new("/unhandled"));
                    let _ = deepest.dispatch(AjaxOptions::new("/bad").on_success(|_, _, _, _| {}));
                }));
            }))
            .unwrap_err();

        assert!(
            matches!(err, FakeAjaxError::MissingSuccessHandler { ref key, .. } if key == "/unhandled")
        );
        assert_eq!(dispatcher.session().call_count(), 4);
    }

    #[test]
    fn test_nested_error_does_not_leak_into_next_call() {
        let dispatcher = dispatcher_with(
            SessionOptions::new()
                .rule("/outer", Rule::success("y"))
                .rule("/bad", Rule::default()),
        );
        let inner = dispatcher.clone();
        let outer = AjaxOptions::new("/outer").on_success(move |_, _, _, _| {
            let _ = inner.dispatch(AjaxOptions::new("/bad").on_success(|_, _, _, _| {}));
        });

        assert!(dispatcher.dispatch(outer).is_err());
        assert!(dispatcher
            .dispatch(AjaxOptions::new("/outer").on_success(|_, _, _, _| {}))
            .is_ok());
    }
}
