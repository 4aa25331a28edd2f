//! Declared views and the translation of dispatch into HTTP responses.
//!
//! An [`XrossView`] pairs a view name with the operations it exposes. Serving
//! a request binds a fresh [`DispatchContext`], runs the view body, and turns
//! any [`Interrupt`] the body propagates into a response:
//!
//! - a ready reply becomes the response itself;
//! - a handler failure becomes `400 Bad Request`;
//! - an empty reply under the legacy policy becomes `404 Not Found`;
//! - an operation error is returned to the caller untouched.
//!
//! Client error bodies carry the failure message only in debug mode.
//!
//! ```ignore
//! let view = XrossView::new("article_list", [greet]).with_config(&config);
//! let response = view.serve(&request, |xross| {
//!     xross.listen(Attributes::new().with("articles", articles))?;
//!     Ok(render_list_page())
//! })?;
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::Response;
use tracing::debug;
use xross_config::Config;

use crate::dispatch::{DispatchContext, HandlerMethods, Interrupt, OperationError};
use crate::operation::Operation;
use crate::registry::Registry;
use crate::reply::{bad_request, not_found};
use crate::request::{HttpMethod, Request};

const VIEW_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::view");

/// A view that exposes operations to AJAX sub-requests.
pub struct XrossView<R> {
    name: String,
    registry: Registry<R>,
    instance: Option<Arc<dyn Any + Send + Sync>>,
    handler: Option<Arc<dyn HandlerMethods<R>>>,
    debug: bool,
    http_method: HttpMethod,
    empty_replies_not_found: bool,
}

impl<R> XrossView<R> {
    /// Declares the operations served alongside the view called `name`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        operations: impl IntoIterator<Item = Operation<R>>,
    ) -> Self {
        Self {
            name: name.into(),
            registry: Registry::register(operations),
            instance: None,
            handler: None,
            debug: false,
            http_method: HttpMethod::default(),
            empty_replies_not_found: false,
        }
    }

    /// Captures the object passed to operations whose first parameter is
    /// `self`.
    #[must_use]
    pub fn bound_to<T: Any + Send + Sync>(mut self, instance: Arc<T>) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Adds operations owned by the handler. They are looked up before the
    /// declared operations.
    #[must_use]
    pub fn with_handler(mut self, handler: impl HandlerMethods<R> + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Applies the view-related settings from `config`.
    #[must_use]
    pub const fn with_config(self, config: &Config) -> Self {
        self.debug(config.debug())
            .reading(config.http_method())
            .empty_replies_not_found(config.legacy_empty_not_found())
    }

    /// Reveals failure messages in client error bodies.
    #[must_use]
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Reads request data from `method`.
    #[must_use]
    pub const fn reading(mut self, method: HttpMethod) -> Self {
        self.http_method = method;
        self
    }

    /// Answers empty operation replies with Not Found.
    #[must_use]
    pub const fn empty_replies_not_found(mut self, enabled: bool) -> Self {
        self.empty_replies_not_found = enabled;
        self
    }

    /// View name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared operations.
    #[must_use]
    pub const fn registry(&self) -> &Registry<R> {
        &self.registry
    }

    /// Whether client errors carry diagnostic bodies.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Binds a dispatch context for `request` with this view's settings.
    #[must_use]
    pub fn bind<'r>(&self, request: &'r R) -> DispatchContext<'r, R> {
        DispatchContext::bind(request, self.name.as_str(), self.registry.clone())
            .with_handler(self.handler.clone())
            .with_instance(self.instance.clone())
            .with_http_method(self.http_method)
            .with_empty_replies_not_found(self.empty_replies_not_found)
    }
}

impl<R: Request> XrossView<R> {
    /// Serves `request` by running `body` with a fresh dispatch context.
    ///
    /// # Errors
    ///
    /// Returns the error of an operation that failed while the body listened.
    pub fn serve<F>(&self, request: &R, body: F) -> Result<Response<String>, OperationError>
    where
        F: FnOnce(&mut DispatchContext<'_, R>) -> Result<Response<String>, Interrupt>,
    {
        let mut context = self.bind(request);
        self.respond(body(&mut context))
    }

    /// Serves a request already bound by an outer view.
    ///
    /// This view's operations, handler and instance are stacked onto
    /// `context`, so they take precedence over the outer view's operations with
    /// the same lookup key. While `body` runs, this view's request method and
    /// empty reply policy apply; the outer settings are restored afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`serve`](Self::serve).
    pub fn serve_stacked<F>(
        &self,
        context: &mut DispatchContext<'_, R>,
        body: F,
    ) -> Result<Response<String>, OperationError>
    where
        F: FnOnce(&mut DispatchContext<'_, R>) -> Result<Response<String>, Interrupt>,
    {
        context.stack(
            self.name.as_str(),
            self.registry.clone(),
            self.handler.clone(),
            self.instance.clone(),
        );
        debug!(
            target: VIEW_TARGET,
            view = %self.name,
            depth = context.depth(),
            operations = context.operation_keys().len(),
            "stacked view operations"
        );

        let method = context.http_method();
        let empty_replies_not_found = context.empty_replies_not_found();
        context.set_http_method(self.http_method);
        context.set_empty_replies_not_found(self.empty_replies_not_found);
        let outcome = body(context);
        context.set_http_method(method);
        context.set_empty_replies_not_found(empty_replies_not_found);
        self.respond(outcome)
    }

    fn respond(
        &self,
        outcome: Result<Response<String>, Interrupt>,
    ) -> Result<Response<String>, OperationError> {
        match outcome {
            Ok(response) => Ok(response),
            Err(Interrupt::Ready(reply)) => Ok(reply.into_response()),
            Err(Interrupt::Empty { operation }) => Ok(not_found(
                self.detail(format_args!("operation `{operation}` returned an empty reply")),
            )),
            Err(Interrupt::Failed(error)) => Ok(bad_request(self.detail(&error))),
            Err(Interrupt::Errored(error)) => Err(error),
        }
    }

    fn detail(&self, message: impl fmt::Display) -> Option<String> {
        self.debug.then(|| message.to_string())
    }
}

impl<R> Clone for XrossView<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            registry: self.registry.clone(),
            instance: self.instance.clone(),
            handler: self.handler.clone(),
            debug: self.debug,
            http_method: self.http_method,
            empty_replies_not_found: self.empty_replies_not_found,
        }
    }
}

impl<R> fmt::Debug for XrossView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XrossView")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("has_instance", &self.instance.is_some())
            .field("has_handler", &self.handler.is_some())
            .field("debug", &self.debug)
            .field("http_method", &self.http_method)
            .field("empty_replies_not_found", &self.empty_replies_not_found)
            .finish()
    }
}
