//! Call options accepted by the dispatcher and the binding handed to callbacks.

use crate::key::CallKey;
use crate::transport::TransportResult;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// `success(data, statusText, transport)`
pub type SuccessHandler =
    Arc<dyn Fn(&CallContext<'_>, &Value, &str, &TransportResult) + Send + Sync>;

/// `error(transport, statusText)` and `complete(transport, statusText)`
pub type TransportHandler = Arc<dyn Fn(&CallContext<'_>, &TransportResult, &str) + Send + Sync>;

/// `beforeSend()`, invoked without a binding
pub type BeforeSendHandler = Arc<dyn Fn() + Send + Sync>;

/// Options of a single call, as issued by the code under test.
///
/// Handlers are reference-counted so the recorder keeps the very same handler
/// objects the caller passed in.
#[derive(Clone, Default)]
pub struct AjaxOptions {
    pub url: String,
    /// HTTP method (the `type` option of the real call). `None` means `GET`.
    pub method: Option<String>,
    pub data: Option<Value>,
    /// Binding target for handlers. When absent handlers are bound to the
    /// options themselves.
    pub context: Option<Value>,
    pub before_send: Option<BeforeSendHandler>,
    pub success: Option<SuccessHandler>,
    pub error: Option<TransportHandler>,
    pub complete: Option<TransportHandler>,
}

impl AjaxOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Shorthand for a `GET` with only a success handler.
    pub fn get<F>(url: impl Into<String>, success: F) -> Self
    where
        F: Fn(&CallContext<'_>, &Value, &str, &TransportResult) + Send + Sync + 'static,
    {
        Self::new(url).on_success(success)
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn context(mut self, context: impl Into<Value>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn before_send<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(f));
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &Value, &str, &TransportResult) + Send + Sync + 'static,
    {
        self.success = Some(Arc::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &TransportResult, &str) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(f));
        self
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(&CallContext<'_>, &TransportResult, &str) + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(f));
        self
    }

    /// Rule-table key for this call.
    pub fn key(&self) -> CallKey {
        CallKey::for_call(self.method.as_deref(), &self.url)
    }

    /// Binding used for `success`, `error` and `complete`.
    pub fn binding(&self) -> CallContext<'_> {
        match self.context {
            Some(ref context) => CallContext::Context(context),
            None => CallContext::Options(self),
        }
    }
}

impl fmt::Debug for AjaxOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AjaxOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("context", &self.context)
            .field("before_send", &self.before_send.is_some())
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("complete", &self.complete.is_some())
            .finish()
    }
}

/// Object a handler is bound to while it runs.
#[derive(Debug, Clone, Copy)]
pub enum CallContext<'a> {
    /// The explicit `context` supplied with the call
    Context(&'a Value),
    /// No context was supplied: the call options themselves
    Options(&'a AjaxOptions),
}

impl<'a> CallContext<'a> {
    pub fn context(&self) -> Option<&'a Value> {
        match *self {
            CallContext::Context(value) => Some(value),
            CallContext::Options(_) => None,
        }
    }

    pub fn options(&self) -> Option<&'a AjaxOptions> {
        match *self {
            CallContext::Options(options) => Some(options),
            CallContext::Context(_) => None,
        }
    }

    /// Field lookup on an explicit context object.
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.context().and_then(|c| c.get(field))
    }
}
