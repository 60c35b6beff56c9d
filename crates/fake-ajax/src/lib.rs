//! In-process replacement for an ajax-style call entry point.
//!
//! Code under test issues calls through [`AjaxTransport`]. In tests a
//! [`Dispatcher`] stands in for the real transport: it records every call and
//! answers it synchronously from the rule table of the current
//! [`SessionContext`], invoking `success`/`error`/`complete` exactly like the
//! real call would.
//!
//! # Example
//!
//! ```
//! use fake_ajax::{AjaxOptions, Dispatcher, Rule, SessionOptions};
//! use std::sync::{Arc, Mutex};
//!
//! let dispatcher = Dispatcher::default();
//! dispatcher
//!     .session()
//!     .init(SessionOptions::new().rule("/simple", Rule::success("y")));
//!
//! let result = Arc::new(Mutex::new(String::from("x")));
//! let sink = result.clone();
//! dispatcher
//!     .dispatch(AjaxOptions::get("/simple", move |_, data, _, _| {
//!         *sink.lock().unwrap() = data.as_str().unwrap_or_default().to_string();
//!     }))
//!     .unwrap();
//!
//! assert_eq!(*result.lock().unwrap(), "y");
//! assert_eq!(dispatcher.session().last().unwrap().url, "/simple");
//! ```
//!
//! ## Module Structure
//!
//! - `key`: canonical method + URL keys
//! - `rule`: rules, rule tables and session options
//! - `transport`: synthesized transport results and overrides
//! - `options`: call options and handler bindings
//! - `recorder`: the call log and its queries
//! - `resolver`: outcome resolution
//! - `session`: per-test state
//! - `dispatcher`: the intercepting entry point
//! - `fixture`: fixture loading that bypasses the dispatcher

mod dispatcher;
mod error;
mod fixture;
mod key;
mod options;
mod recorder;
mod resolver;
mod rule;
mod session;
mod transport;

pub use dispatcher::{AjaxTransport, Dispatcher};
pub use error::{FakeAjaxError, Result};
pub use fixture::load_test_data;
pub use key::{CallKey, DEFAULT_METHOD};
pub use options::{AjaxOptions, BeforeSendHandler, CallContext, SuccessHandler, TransportHandler};
pub use recorder::{decode_url, CallRecorder};
pub use resolver::{resolve, Resolution, DEFAULT_SUCCESS_DATA};
pub use rule::{Rule, RuleTable, SessionOptions};
pub use session::SessionContext;
pub use transport::{
    TransportOverrides, TransportResult, READY_STATE_DONE, STATUS_TEXT_ERROR, STATUS_TEXT_SUCCESS,
};
