//! Error types for operation dispatch.
//!
//! [`HandlerError`] covers the failures the dispatcher itself detects while
//! resolving and binding an operation; the view layer answers them with a
//! client error. [`OperationError`] is what operation bodies return; the
//! dispatcher never handles it and passes it up unchanged.

use std::error::Error as StdError;

use thiserror::Error;

/// Failures detected by the dispatcher before an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// No handler method or registered operation matches the requested name.
    #[error("requested `{operation}` operation is not implemented by the xross handler for `{view}`")]
    OperationUnimplemented {
        /// Lookup key that failed to resolve.
        operation: String,
        /// View that received the request.
        view: String,
    },

    /// Required parameters could not be filled from the request.
    #[error("missing `{}` argument(s) for `{operation}` operation", .missing.join(", "))]
    MissingOperationArgument {
        /// Lookup key of the operation.
        operation: String,
        /// Unfilled parameters, in declaration order.
        missing: Vec<String>,
    },
}

impl HandlerError {
    /// Creates an unimplemented operation error.
    #[must_use]
    pub fn unimplemented(operation: impl Into<String>, view: impl Into<String>) -> Self {
        Self::OperationUnimplemented {
            operation: operation.into(),
            view: view.into(),
        }
    }

    /// Creates a missing argument error.
    #[must_use]
    pub fn missing_arguments(operation: impl Into<String>, missing: Vec<String>) -> Self {
        Self::MissingOperationArgument {
            operation: operation.into(),
            missing,
        }
    }
}

/// Errors raised by operation bodies.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation could not complete.
    #[error("{message}")]
    Failed {
        /// Human-readable failure description.
        message: String,
    },

    /// A bound argument has a different shape than the operation expects.
    #[error("argument `{name}` must be {expected}, got {found}")]
    InvalidArgument {
        /// Parameter name.
        name: String,
        /// Expected value kind.
        expected: &'static str,
        /// Kind that was bound.
        found: &'static str,
    },

    /// The operation read an argument that was not bound.
    #[error("argument `{name}` was not bound")]
    UnboundArgument {
        /// Parameter name.
        name: String,
    },

    /// A mapping reply was built from a value that is not an object.
    #[error("mapping reply must serialise to an object, got {found}")]
    NotAMapping {
        /// JSON kind of the value.
        found: &'static str,
    },

    /// Serialising a reply failed.
    #[error("failed to serialise reply: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other error raised by application code.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>),
}

impl OperationError {
    /// Creates a generic failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    /// Creates an argument shape error.
    #[must_use]
    pub fn invalid_argument(
        name: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            expected,
            found,
        }
    }

    /// Creates an unbound argument error.
    #[must_use]
    pub fn unbound(name: impl Into<String>) -> Self {
        Self::UnboundArgument { name: name.into() }
    }

    /// Creates a non-object mapping error.
    #[must_use]
    pub const fn not_a_mapping(found: &'static str) -> Self {
        Self::NotAMapping { found }
    }

    /// Wraps an application error.
    #[must_use]
    pub fn other(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }
}
