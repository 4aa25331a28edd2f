//! Operation dispatch for AJAX sub-requests of server-rendered views.
//!
//! A view declares a set of named [`Operation`]s. When the browser sends an
//! asynchronous request carrying an `op` field, the dispatcher picks the
//! matching operation, fills its declared parameters from the request data
//! and answers with whatever the operation returns. Ordinary page requests,
//! and AJAX requests that do not name an operation, pass through to the view
//! body untouched.
//!
//! ## Argument binding
//!
//! Operations declare their parameters explicitly. Request fields arrive as
//! strings and are coerced: `null`, `true` and `false` (any case) become
//! their typed counterparts, plain digit strings become integers, and
//! everything else stays text. The names `self`, `request` and `xross` are
//! reserved for the bound view instance, the request, and the dispatch
//! context respectively. See [`DispatchContext::bind_arguments`].
//!
//! ## Responses
//!
//! [`XrossView::serve`] turns operation replies into [`http::Response`]s and
//! handler failures into client errors. Operation errors are never swallowed;
//! they are returned to the caller as [`OperationError`].
//!
//! Configuration lives in [`xross_config`]; [`telemetry::initialise`] installs
//! a `tracing` subscriber honouring it. Dispatch events use the
//! [`DISPATCH_TARGET`] target, whose verbosity can be set on its own.

mod coerce;
pub mod dispatch;
mod operation;
mod registry;
mod reply;
mod request;
pub mod telemetry;
mod view;

pub use coerce::{Value, coerce};
pub use dispatch::{
    Argument, Attributes, BoundCall, DISPATCH_TARGET, DispatchContext, DispatchOutcome,
    HandlerError, HandlerMethods, Interrupt, OperationError,
};
pub use operation::{Operation, OperationFn, ParameterDescriptor, ParameterKind};
pub use registry::{LOOKUP_PREFIX, Registry, lookup_key};
pub use reply::{JSON_CONTENT_TYPE, Reply, TEXT_CONTENT_TYPE, bad_request, not_found};
pub use request::{HttpMethod, REQUESTED_WITH_HEADER, Request, RequestData, XML_HTTP_REQUEST};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use view::XrossView;

#[cfg(test)]
mod tests;
