//! Operation dispatch for AJAX sub-requests.
//!
//! A [`DispatchContext`] is bound to each request a declared view serves. When
//! the request is asynchronous and names an operation through its `op` field,
//! the dispatcher resolves the operation, binds its declared parameters from
//! the request data and runs it.
//!
//! ## Resolution
//!
//! The requested name is prefixed with `op_` to form the lookup key. Each view
//! serving the request contributes a layer; stacked views sit above the view
//! that bound the context. Layers are searched innermost first, and within a
//! layer handler methods are consulted before the declared operations.
//!
//! ## Outcomes
//!
//! Dispatch yields a [`DispatchOutcome`]: nothing to do, a resolved reply, or
//! a [`HandlerError`] the view answers with a client error. Operation bodies
//! report their own failures as [`OperationError`], which the dispatcher never
//! swallows. Inside a view body, [`DispatchContext::listen`] turns the outcome
//! into an [`Interrupt`] so that `?` leaves the body once an operation has
//! answered.

mod binding;
mod context;
mod dispatcher;
mod errors;
mod outcome;

/// Tracing target for dispatch events.
///
/// Operation selection and binding are logged at `debug`; handler failures at
/// `warn`.
pub const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

pub use self::binding::{Argument, BoundCall, CONTEXT_PARAMETER, REQUEST_PARAMETER, SELF_PARAMETER};
pub use self::context::{Attributes, DispatchContext, HandlerMethods};
pub use self::dispatcher::{OPERATION_FIELD, Selection};
pub use self::errors::{HandlerError, OperationError};
pub use self::outcome::{DispatchOutcome, Interrupt};
