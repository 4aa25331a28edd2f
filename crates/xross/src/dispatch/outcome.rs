//! Terminal states of a dispatch.

use crate::reply::Reply;

use super::errors::{HandlerError, OperationError};

/// Result of one dispatch attempt.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not an AJAX request, or no operation requested. The view continues.
    NoOp,
    /// An operation ran and produced a reply.
    Resolved {
        /// Lookup key of the operation that ran.
        operation: String,
        /// The operation's reply.
        reply: Reply,
    },
    /// The dispatcher could not resolve or bind the requested operation.
    Failed(HandlerError),
}

/// Short-circuits a view body once dispatch has produced a response.
///
/// Returned as the error side of [`DispatchContext::listen`] so that `?`
/// leaves the view body as soon as an operation has answered.
///
/// [`DispatchContext::listen`]: super::DispatchContext::listen
#[derive(Debug)]
pub enum Interrupt {
    /// Send the reply to the client.
    Ready(Reply),
    /// The operation answered with an empty reply and the view maps those to
    /// Not Found.
    Empty {
        /// Lookup key of the operation that ran.
        operation: String,
    },
    /// The dispatcher rejected the request.
    Failed(HandlerError),
    /// The operation itself failed.
    Errored(OperationError),
}

impl From<HandlerError> for Interrupt {
    fn from(error: HandlerError) -> Self {
        Self::Failed(error)
    }
}

impl From<OperationError> for Interrupt {
    fn from(error: OperationError) -> Self {
        Self::Errored(error)
    }
}
