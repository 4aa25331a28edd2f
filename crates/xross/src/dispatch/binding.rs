//! Argument binding from declared parameters.
//!
//! Required parameters are filled in declaration order. Three names are
//! reserved: a leading `self` receives the view instance (or the dispatch
//! context when the view captured none), `request` in the first or second
//! required slot receives the request, and `xross` always receives the
//! dispatch context. Every other parameter is looked up in the request data
//! and coerced. A required field that is missing, or that coerces to `null`,
//! leaves its parameter unfilled and dispatch fails with the full list of
//! unfilled names.

use std::any::Any;

use tracing::debug;

use crate::coerce::{Value, coerce};
use crate::operation::{Operation, ParameterDescriptor};
use crate::request::RequestData;

use super::context::{Attributes, DispatchContext};
use super::errors::{HandlerError, OperationError};
use super::DISPATCH_TARGET;

/// Parameter name receiving the view instance.
pub const SELF_PARAMETER: &str = "self";

/// Parameter name receiving the request.
pub const REQUEST_PARAMETER: &str = "request";

/// Parameter name receiving the dispatch context.
pub const CONTEXT_PARAMETER: &str = "xross";

/// What was bound to a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// The view instance captured when the view was declared.
    Instance,
    /// The dispatch context.
    Context,
    /// The request being served.
    Request,
    /// A coerced request field.
    Value(Value),
}

impl Argument {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Instance => "view instance",
            Self::Context => "dispatch context",
            Self::Request => "request",
            Self::Value(value) => value.kind(),
        }
    }
}

/// Arguments bound for one operation call.
///
/// `args` holds the required parameters in declaration order; `kwargs` holds
/// the optional parameters that could be filled.
pub struct BoundCall<'a, R> {
    context: &'a DispatchContext<'a, R>,
    instance: Option<&'a (dyn Any + Send + Sync)>,
    operation: String,
    args: Vec<(String, Argument)>,
    kwargs: Vec<(String, Argument)>,
}

impl<'a, R> BoundCall<'a, R> {
    /// Lookup key of the operation being called.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Required arguments, in declaration order.
    #[must_use]
    pub fn args(&self) -> &[(String, Argument)] {
        &self.args
    }

    /// Optional arguments that were filled, in declaration order.
    #[must_use]
    pub fn kwargs(&self) -> &[(String, Argument)] {
        &self.kwargs
    }

    /// Returns the argument bound to `name`.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.args
            .iter()
            .chain(&self.kwargs)
            .find(|(bound, _)| bound == name)
            .map(|(_, argument)| argument)
    }

    /// Returns the coerced request field bound to `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.argument(name) {
            Some(Argument::Value(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a text argument.
    ///
    /// # Errors
    ///
    /// Fails when `name` is unbound or was not coerced to text.
    pub fn text(&self, name: &str) -> Result<&str, OperationError> {
        self.typed(name, "string", Value::as_str)
    }

    /// Returns an integer argument.
    ///
    /// # Errors
    ///
    /// Fails when `name` is unbound or was not coerced to an integer.
    pub fn integer(&self, name: &str) -> Result<i64, OperationError> {
        self.typed(name, "integer", Value::as_i64)
    }

    /// Returns a boolean argument.
    ///
    /// # Errors
    ///
    /// Fails when `name` is unbound or was not coerced to a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool, OperationError> {
        self.typed(name, "boolean", Value::as_bool)
    }

    fn typed<'v, T>(
        &'v self,
        name: &str,
        expected: &'static str,
        extract: impl FnOnce(&'v Value) -> Option<T>,
    ) -> Result<T, OperationError> {
        let argument = self
            .argument(name)
            .ok_or_else(|| OperationError::unbound(name))?;
        let extracted = match argument {
            Argument::Value(value) => extract(value),
            _ => None,
        };
        extracted.ok_or_else(|| OperationError::invalid_argument(name, expected, argument.kind()))
    }

    /// The request being served.
    #[must_use]
    pub const fn request(&self) -> &'a R {
        self.context.request()
    }

    /// The dispatch context.
    #[must_use]
    pub const fn context(&self) -> &'a DispatchContext<'a, R> {
        self.context
    }

    /// Attributes the view set before dispatch.
    #[must_use]
    pub const fn attributes(&self) -> &'a Attributes {
        self.context.attributes()
    }

    /// The instance of the view declaring the operation, if one was captured
    /// and has type `T`.
    #[must_use]
    pub fn instance<T: Any>(&self) -> Option<&'a T> {
        self.instance.and_then(|instance| instance.downcast_ref())
    }
}

impl<R> std::fmt::Debug for BoundCall<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundCall")
            .field("operation", &self.operation)
            .field("args", &self.args)
            .field("kwargs", &self.kwargs)
            .finish()
    }
}

impl<'r, R> DispatchContext<'r, R> {
    /// Binds request data to an operation's declared parameters.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::MissingOperationArgument`] naming every
    /// required parameter that could not be filled.
    pub fn bind_arguments<'a>(
        &'a self,
        operation: &Operation<R>,
        data: &RequestData,
    ) -> Result<BoundCall<'a, R>, HandlerError> {
        let key = operation.lookup_key();
        let instance = self.instance_for(&key);
        let (required, optional): (Vec<&ParameterDescriptor>, Vec<&ParameterDescriptor>) =
            operation
                .parameters()
                .iter()
                .partition(|parameter| parameter.is_required());

        let mut args = Vec::with_capacity(required.len());
        let mut missing = Vec::new();
        for (index, parameter) in required.into_iter().enumerate() {
            let name = parameter.name();
            match required_argument(index, name, data, instance.is_some()) {
                Some(argument) => args.push((name.to_owned(), argument)),
                None => missing.push(name.to_owned()),
            }
        }
        if !missing.is_empty() {
            return Err(HandlerError::missing_arguments(key, missing));
        }

        let kwargs: Vec<(String, Argument)> = optional
            .into_iter()
            .filter_map(|parameter| {
                let name = parameter.name();
                optional_argument(name, data).map(|argument| (name.to_owned(), argument))
            })
            .collect();

        debug!(
            target: DISPATCH_TARGET,
            operation = %key,
            args = args.len(),
            kwargs = kwargs.len(),
            "bound operation arguments"
        );

        Ok(BoundCall {
            context: self,
            instance,
            operation: key,
            args,
            kwargs,
        })
    }
}

fn required_argument(
    index: usize,
    name: &str,
    data: &RequestData,
    has_instance: bool,
) -> Option<Argument> {
    match (index, name) {
        (0, SELF_PARAMETER) if has_instance => Some(Argument::Instance),
        (0, SELF_PARAMETER) | (_, CONTEXT_PARAMETER) => Some(Argument::Context),
        (0 | 1, REQUEST_PARAMETER) => Some(Argument::Request),
        _ => data
            .get(name)
            .map(coerce)
            .filter(|value| !value.is_null())
            .map(Argument::Value),
    }
}

fn optional_argument(name: &str, data: &RequestData) -> Option<Argument> {
    if name == CONTEXT_PARAMETER {
        return Some(Argument::Context);
    }
    data.get(name).map(|raw| Argument::Value(coerce(raw)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::registry::Registry;
    use crate::reply::Reply;

    type TestRequest = http::Request<String>;
    type TestOperation = Operation<TestRequest>;

    struct ArticleView {
        title: &'static str,
    }

    #[fixture]
    fn request() -> TestRequest {
        http::Request::get("/").body(String::new()).expect("build request")
    }

    fn data(pairs: &[(&str, &str)]) -> RequestData {
        pairs.iter().copied().collect()
    }

    fn noop(name: &str) -> TestOperation {
        Operation::new(name, |_call| Ok(Reply::None))
    }

    #[rstest]
    fn binds_request_and_coerced_fields(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("move").required("request").required("x").required("y");
        let call = context
            .bind_arguments(&operation, &data(&[("x", "10"), ("y", "abc")]))
            .expect("bind");

        assert_eq!(call.operation(), "op_move");
        assert_eq!(call.argument("request"), Some(&Argument::Request));
        assert_eq!(call.integer("x").expect("x"), 10);
        assert_eq!(call.text("y").expect("y"), "abc");
        assert!(call.kwargs().is_empty());
    }

    #[rstest]
    fn reports_every_missing_parameter_in_order(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("move").required("x").required("y").required("z");
        let error = context
            .bind_arguments(&operation, &data(&[("y", "1")]))
            .expect_err("x and z are missing");
        assert_eq!(
            error,
            HandlerError::missing_arguments("op_move", vec!["x".to_owned(), "z".to_owned()])
        );
    }

    #[rstest]
    fn null_field_leaves_required_parameter_unfilled(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("pick").required("choice");
        let result = context.bind_arguments(&operation, &data(&[("choice", "NULL")]));
        assert!(matches!(
            result,
            Err(HandlerError::MissingOperationArgument { .. })
        ));
    }

    #[rstest]
    fn null_field_is_kept_for_optional_parameter(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("pick").optional("choice");
        let call = context
            .bind_arguments(&operation, &data(&[("choice", "null")]))
            .expect("bind");
        assert_eq!(call.value("choice"), Some(&Value::Null));
    }

    #[rstest]
    fn request_is_reserved_only_in_the_first_two_slots(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("late").required("a").required("b").required("request");
        let error = context
            .bind_arguments(&operation, &data(&[("a", "1"), ("b", "2")]))
            .expect_err("third slot reads request data");
        assert_eq!(
            error,
            HandlerError::missing_arguments("op_late", vec!["request".to_owned()])
        );
    }

    #[rstest]
    fn second_slot_request_is_supplied(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("method").required("self").required("request");
        let call = context.bind_arguments(&operation, &RequestData::new()).expect("bind");
        assert_eq!(call.argument("self"), Some(&Argument::Context));
        assert_eq!(call.argument("request"), Some(&Argument::Request));
    }

    #[rstest]
    fn self_binds_to_captured_instance(request: TestRequest) {
        let instance: Arc<dyn Any + Send + Sync> = Arc::new(ArticleView { title: "Intro" });
        let context = DispatchContext::bind(&request, "detail", Registry::new())
            .with_instance(Some(instance));
        let operation = noop("title").required("self");
        let call = context.bind_arguments(&operation, &RequestData::new()).expect("bind");

        assert_eq!(call.argument("self"), Some(&Argument::Instance));
        assert_eq!(
            call.instance::<ArticleView>().map(|view| view.title),
            Some("Intro")
        );
    }

    #[rstest]
    fn self_binds_to_the_declaring_views_instance(request: TestRequest) {
        let outer: Arc<dyn Any + Send + Sync> = Arc::new(ArticleView { title: "Page" });
        let inner: Arc<dyn Any + Send + Sync> = Arc::new(ArticleView { title: "Sidebar" });
        let mut context = DispatchContext::bind(
            &request,
            "page",
            Registry::register([noop("heading").required("self")]),
        )
        .with_instance(Some(outer));
        context.stack(
            "sidebar",
            Registry::register([noop("vote").required("self")]),
            None,
            Some(inner),
        );

        let title = |name: &str| {
            let operation = noop(name).required("self");
            let call = context.bind_arguments(&operation, &RequestData::new()).expect("bind");
            call.instance::<ArticleView>().map(|view| view.title)
        };
        assert_eq!(title("heading"), Some("Page"));
        assert_eq!(title("vote"), Some("Sidebar"));
    }

    #[rstest]
    fn self_is_only_reserved_in_the_first_slot(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("odd").required("request").required("self");
        let result = context.bind_arguments(&operation, &RequestData::new());
        assert!(result.is_err());
    }

    #[rstest]
    #[case::optional(ParameterDescriptor::optional(CONTEXT_PARAMETER))]
    #[case::required(ParameterDescriptor::required(CONTEXT_PARAMETER))]
    fn xross_always_receives_the_context(
        request: TestRequest,
        #[case] parameter: ParameterDescriptor,
    ) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("ctx").with_parameter(parameter);
        let call = context
            .bind_arguments(&operation, &data(&[("xross", "spoofed")]))
            .expect("bind");
        assert_eq!(call.argument("xross"), Some(&Argument::Context));
        assert_eq!(call.value("xross"), None);
    }

    #[rstest]
    fn optional_parameters_are_filled_when_present(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("list").optional("page").optional("sort");
        let call = context
            .bind_arguments(&operation, &data(&[("page", "2")]))
            .expect("bind");
        assert_eq!(call.kwargs().len(), 1);
        assert_eq!(call.integer("page").expect("page"), 2);
        assert!(call.argument("sort").is_none());
    }

    #[rstest]
    fn keyword_only_parameters_bind_by_name(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("toggle")
            .keyword_only("flag", false)
            .keyword_only("label", true);
        let call = context
            .bind_arguments(&operation, &data(&[("flag", "TRUE"), ("label", "on")]))
            .expect("bind");
        assert!(call.boolean("flag").expect("flag"));
        assert_eq!(call.kwargs()[0].0, "label");
    }

    #[rstest]
    fn typed_accessors_report_shape_mismatches(request: TestRequest) {
        let context = DispatchContext::bind(&request, "detail", Registry::new());
        let operation = noop("show").required("request").optional("page");
        let call = context
            .bind_arguments(&operation, &data(&[("page", "3.5")]))
            .expect("bind");

        let error = call.integer("page").expect_err("3.5 stays text");
        assert!(matches!(error, OperationError::InvalidArgument { found: "string", .. }));
        let error = call.text("request").expect_err("request is not text");
        assert!(matches!(error, OperationError::InvalidArgument { found: "request", .. }));
        let error = call.text("missing").expect_err("unbound");
        assert!(matches!(error, OperationError::UnboundArgument { .. }));
    }
}
