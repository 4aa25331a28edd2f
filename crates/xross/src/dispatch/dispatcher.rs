//! Operation selection and invocation.

use std::fmt;

use tracing::{debug, warn};

use crate::operation::Operation;
use crate::registry::lookup_key;
use crate::request::{HttpMethod, Request, RequestData};

use super::DISPATCH_TARGET;
use super::context::{Attributes, DispatchContext};
use super::errors::{HandlerError, OperationError};
use super::outcome::{DispatchOutcome, Interrupt};

/// Request field naming the operation to run.
pub const OPERATION_FIELD: &str = "op";

/// An operation chosen for the current request, with the data it binds from.
pub struct Selection<R> {
    /// The resolved operation.
    pub operation: Operation<R>,
    /// Request data read for the configured method.
    pub data: RequestData,
}

impl<R> fmt::Debug for Selection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("operation", &self.operation)
            .field("data", &self.data)
            .finish()
    }
}

impl<R: Request> DispatchContext<'_, R> {
    /// Picks the operation the request asks for.
    ///
    /// Returns `Ok(None)` for ordinary requests and for AJAX requests that do
    /// not name an operation, so unrelated asynchronous calls pass through.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::OperationUnimplemented`] when no layer's
    /// handler or registry provides the requested operation.
    pub fn select_operation(&self) -> Result<Option<Selection<R>>, HandlerError> {
        if !self.request.is_ajax() {
            debug!(
                target: DISPATCH_TARGET,
                view = %self.view(),
                "request is not asynchronous, dispatch skipped"
            );
            return Ok(None);
        }

        let data = self.request.data(self.http_method);
        let Some(name) = data.get(OPERATION_FIELD) else {
            debug!(
                target: DISPATCH_TARGET,
                view = %self.view(),
                method = %self.http_method,
                "no operation requested"
            );
            return Ok(None);
        };
        let key = lookup_key(name);

        let (layer, operation) = self
            .resolve(&key)
            .ok_or_else(|| HandlerError::unimplemented(key.as_str(), self.view()))?;

        debug!(
            target: DISPATCH_TARGET,
            view = %layer.view,
            operation = %key,
            "selected operation"
        );
        Ok(Some(Selection { operation, data }))
    }

    /// Selects, binds and runs the requested operation.
    ///
    /// Handler failures are reported as [`DispatchOutcome::Failed`].
    ///
    /// # Errors
    ///
    /// Returns the operation's own error unchanged.
    pub fn dispatch(&self) -> Result<DispatchOutcome, OperationError> {
        let selection = match self.select_operation() {
            Ok(Some(selection)) => selection,
            Ok(None) => return Ok(DispatchOutcome::NoOp),
            Err(error) => return Ok(self.failed(error)),
        };

        let call = match self.bind_arguments(&selection.operation, &selection.data) {
            Ok(call) => call,
            Err(error) => return Ok(self.failed(error)),
        };

        let reply = selection.operation.invoke(&call)?;
        Ok(DispatchOutcome::Resolved {
            operation: call.operation().to_owned(),
            reply,
        })
    }

    /// Sets the attributes and dispatches now.
    ///
    /// Returns `Ok(())` when there is nothing to do, so the view body carries
    /// on. Any other outcome comes back as an [`Interrupt`] for `?` to
    /// propagate out of the body.
    ///
    /// # Errors
    ///
    /// Returns an [`Interrupt`] whenever dispatch produced a response or
    /// failed.
    pub fn listen(&mut self, attributes: Attributes) -> Result<(), Interrupt> {
        self.set_attributes(attributes);
        match self.dispatch()? {
            DispatchOutcome::NoOp => Ok(()),
            DispatchOutcome::Resolved { operation, reply }
                if self.empty_replies_not_found && reply.is_empty() =>
            {
                debug!(
                    target: DISPATCH_TARGET,
                    view = %self.view(),
                    operation = %operation,
                    "operation returned an empty reply"
                );
                Err(Interrupt::Empty { operation })
            }
            DispatchOutcome::Resolved { reply, .. } => Err(Interrupt::Ready(reply)),
            DispatchOutcome::Failed(error) => Err(Interrupt::Failed(error)),
        }
    }

    /// Like [`listen`](Self::listen), reading request data from `method`.
    ///
    /// # Errors
    ///
    /// Same as [`listen`](Self::listen).
    pub fn listen_reading(
        &mut self,
        attributes: Attributes,
        method: HttpMethod,
    ) -> Result<(), Interrupt> {
        self.set_http_method(method);
        self.listen(attributes)
    }

    fn failed(&self, error: HandlerError) -> DispatchOutcome {
        warn!(
            target: DISPATCH_TARGET,
            view = %self.view(),
            error = %error,
            "operation dispatch failed"
        );
        DispatchOutcome::Failed(error)
    }
}
