//! Operations and their declared parameters.
//!
//! An operation is an ordinary closure plus the list of parameters it
//! expects. The dispatcher never looks inside the closure: it reads the
//! declared parameters to decide which request fields to coerce and pass in,
//! then hands the result over as a [`BoundCall`].

use std::fmt;
use std::sync::Arc;

use crate::dispatch::{BoundCall, OperationError};
use crate::registry::lookup_key;
use crate::reply::Reply;

/// How a parameter may be supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Positional only. Always a required input, even with a default.
    PositionalOnly,
    /// Positional or by name. Required unless it has a default.
    PositionalOrKeyword,
    /// By name only. Required unless it has a default.
    KeywordOnly,
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    name: String,
    kind: ParameterKind,
    has_default: bool,
}

impl ParameterDescriptor {
    /// Builds a descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterKind, has_default: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            has_default,
        }
    }

    /// A positional-or-keyword parameter without a default.
    #[must_use]
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword, false)
    }

    /// A positional-or-keyword parameter with a default.
    #[must_use]
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PositionalOrKeyword, true)
    }

    /// A positional-only parameter.
    #[must_use]
    pub fn positional_only(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::PositionalOnly, false)
    }

    /// A keyword-only parameter.
    #[must_use]
    pub fn keyword_only(name: impl Into<String>, has_default: bool) -> Self {
        Self::new(name, ParameterKind::KeywordOnly, has_default)
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How the parameter may be supplied.
    #[must_use]
    pub const fn kind(&self) -> ParameterKind {
        self.kind
    }

    /// Whether the parameter declares a default value.
    #[must_use]
    pub const fn has_default(&self) -> bool {
        self.has_default
    }

    /// Whether dispatch must fill this parameter before invoking.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        match self.kind {
            ParameterKind::PositionalOnly => true,
            ParameterKind::PositionalOrKeyword | ParameterKind::KeywordOnly => !self.has_default,
        }
    }
}

/// Signature shared by every operation body.
pub type OperationFn<R> =
    dyn Fn(&BoundCall<'_, R>) -> Result<Reply, OperationError> + Send + Sync;

/// A named callable handling one client-requested action.
///
/// ```ignore
/// let greet = Operation::new("greet", |call| {
///     Ok(Reply::text(format!("hi {}", call.text("name")?)))
/// })
/// .required("request")
/// .required("name")
/// .optional("xross");
/// ```
pub struct Operation<R> {
    name: String,
    parameters: Vec<ParameterDescriptor>,
    body: Arc<OperationFn<R>>,
}

impl<R> Operation<R> {
    /// Creates an operation with no declared parameters.
    #[must_use]
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&BoundCall<'_, R>) -> Result<Reply, OperationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// Appends a declared parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Appends a required positional-or-keyword parameter.
    #[must_use]
    pub fn required(self, name: impl Into<String>) -> Self {
        self.with_parameter(ParameterDescriptor::required(name))
    }

    /// Appends a positional-or-keyword parameter with a default.
    #[must_use]
    pub fn optional(self, name: impl Into<String>) -> Self {
        self.with_parameter(ParameterDescriptor::optional(name))
    }

    /// Appends a positional-only parameter.
    #[must_use]
    pub fn positional_only(self, name: impl Into<String>) -> Self {
        self.with_parameter(ParameterDescriptor::positional_only(name))
    }

    /// Appends a keyword-only parameter.
    #[must_use]
    pub fn keyword_only(self, name: impl Into<String>, has_default: bool) -> Self {
        self.with_parameter(ParameterDescriptor::keyword_only(name, has_default))
    }

    /// Operation name as requested by clients.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameters, in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// Registry key for this operation.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        lookup_key(&self.name)
    }

    /// Invokes the operation body with already bound arguments.
    ///
    /// # Errors
    ///
    /// Returns whatever error the body produces.
    pub fn invoke(&self, call: &BoundCall<'_, R>) -> Result<Reply, OperationError> {
        (self.body)(call)
    }
}

impl<R> Clone for Operation<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            parameters: self.parameters.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<R> fmt::Debug for Operation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
