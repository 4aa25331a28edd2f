//! Per-request dispatch state.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::operation::Operation;
use crate::registry::Registry;
use crate::request::HttpMethod;

/// Operations a handler object provides itself.
///
/// These are consulted before the registry, so a handler can shadow a
/// registered operation of the same lookup key.
pub trait HandlerMethods<R>: Send + Sync {
    /// Returns the operation stored under `key` (for example `op_greet`).
    fn method(&self, key: &str) -> Option<Operation<R>>;
}

impl<R> HandlerMethods<R> for Registry<R> {
    fn method(&self, key: &str) -> Option<Operation<R>> {
        self.get(key).cloned()
    }
}

/// Free-form values the view hands to its operations.
#[derive(Default)]
pub struct Attributes {
    values: HashMap<String, Box<dyn Any>>,
}

impl Attributes {
    /// Creates an empty attribute set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    #[must_use]
    pub fn with<T: Any>(mut self, name: impl Into<String>, value: T) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a value, replacing any earlier one under the same name.
    pub fn insert<T: Any>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Box::new(value));
    }

    /// Returns the value under `name` if it has type `T`.
    #[must_use]
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values.get(name).and_then(|value| value.downcast_ref())
    }

    /// Returns `true` when a value is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort_unstable();
        f.debug_struct("Attributes").field("names", &names).finish()
    }
}

/// Operations and bindings contributed by one declared view.
///
/// The first layer belongs to the view that bound the context; every stacked
/// view pushes another on top of it.
pub(super) struct Layer<R> {
    pub(super) view: String,
    registry: Registry<R>,
    handler: Option<Arc<dyn HandlerMethods<R>>>,
    instance: Option<Arc<dyn Any + Send + Sync>>,
}

impl<R> Layer<R> {
    const fn new(view: String, registry: Registry<R>) -> Self {
        Self {
            view,
            registry,
            handler: None,
            instance: None,
        }
    }

    /// Handler methods shadow the layer's registry.
    fn resolve(&self, key: &str) -> Option<Operation<R>> {
        self.handler
            .as_ref()
            .and_then(|handler| handler.method(key))
            .or_else(|| self.registry.get(key).cloned())
    }
}

/// State coordinating operation dispatch for one request.
///
/// A context is bound to a request when a declared view starts serving it.
/// Stacked views add a layer to it instead of creating a new context; the
/// innermost layer providing an operation wins, and that layer's instance is
/// the one passed to `self`.
pub struct DispatchContext<'r, R> {
    pub(super) request: &'r R,
    base: Layer<R>,
    stacked: Vec<Layer<R>>,
    pub(super) attributes: Attributes,
    pub(super) http_method: HttpMethod,
    pub(super) empty_replies_not_found: bool,
}

impl<'r, R> DispatchContext<'r, R> {
    /// Binds a context to a request. Performs no I/O.
    #[must_use]
    pub fn bind(request: &'r R, view: impl Into<String>, registry: Registry<R>) -> Self {
        Self {
            request,
            base: Layer::new(view.into(), registry),
            stacked: Vec::new(),
            attributes: Attributes::new(),
            http_method: HttpMethod::default(),
            empty_replies_not_found: false,
        }
    }

    /// Sets operations owned by the handler of the innermost view.
    #[must_use]
    pub fn with_handler(mut self, handler: Option<Arc<dyn HandlerMethods<R>>>) -> Self {
        self.innermost_mut().handler = handler;
        self
    }

    /// Sets the object passed to operations of the innermost view declaring
    /// `self`.
    #[must_use]
    pub fn with_instance(mut self, instance: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        self.innermost_mut().instance = instance;
        self
    }

    /// Sets the request data source.
    #[must_use]
    pub const fn with_http_method(mut self, method: HttpMethod) -> Self {
        self.http_method = method;
        self
    }

    /// Answers empty replies with Not Found instead of a successful response.
    #[must_use]
    pub const fn with_empty_replies_not_found(mut self, enabled: bool) -> Self {
        self.empty_replies_not_found = enabled;
        self
    }

    /// The request being served.
    #[must_use]
    pub const fn request(&self) -> &'r R {
        self.request
    }

    /// Name of the innermost view serving the request.
    #[must_use]
    pub fn view(&self) -> &str {
        &self.innermost().view
    }

    /// Lookup keys registered by every layer, sorted and deduplicated.
    ///
    /// Handler methods are not listed.
    #[must_use]
    pub fn operation_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .layers()
            .flat_map(|layer| layer.registry.keys())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Merges operations into the innermost layer, replacing any with the
    /// same lookup key.
    pub fn extend(&mut self, registry: &Registry<R>) {
        self.innermost_mut().registry.merge(registry);
    }

    /// Pushes the operations, handler and instance of a stacked view.
    pub fn stack(
        &mut self,
        view: impl Into<String>,
        registry: Registry<R>,
        handler: Option<Arc<dyn HandlerMethods<R>>>,
        instance: Option<Arc<dyn Any + Send + Sync>>,
    ) {
        self.stacked.push(Layer {
            view: view.into(),
            registry,
            handler,
            instance,
        });
    }

    /// Number of stacked views on top of the binding view.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.stacked.len()
    }

    /// Values set by the view before dispatch.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Replaces the attribute set wholesale.
    pub fn set_attributes(&mut self, attributes: Attributes) {
        self.attributes = attributes;
    }

    /// Request data source consulted by dispatch.
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        self.http_method
    }

    /// Overrides the request data source.
    pub const fn set_http_method(&mut self, method: HttpMethod) {
        self.http_method = method;
    }

    /// Whether empty replies are answered with Not Found.
    #[must_use]
    pub const fn empty_replies_not_found(&self) -> bool {
        self.empty_replies_not_found
    }

    /// Overrides the empty reply policy.
    pub const fn set_empty_replies_not_found(&mut self, enabled: bool) {
        self.empty_replies_not_found = enabled;
    }

    /// Returns the innermost view's instance if it has type `T`.
    #[must_use]
    pub fn instance<T: Any>(&self) -> Option<&T> {
        self.innermost()
            .instance
            .as_deref()
            .and_then(|instance| instance.downcast_ref())
    }

    /// Whether the innermost view captured an instance.
    #[must_use]
    pub fn has_instance(&self) -> bool {
        self.innermost().instance.is_some()
    }

    /// Finds the operation stored under `key`, innermost layer first.
    pub(super) fn resolve(&self, key: &str) -> Option<(&Layer<R>, Operation<R>)> {
        self.layers()
            .find_map(|layer| layer.resolve(key).map(|operation| (layer, operation)))
    }

    /// Instance of the layer providing `key`, or of the innermost layer when
    /// no layer does.
    pub(super) fn instance_for(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        let layer = self
            .resolve(key)
            .map_or_else(|| self.innermost(), |(layer, _)| layer);
        layer.instance.as_deref()
    }

    fn layers(&self) -> impl Iterator<Item = &Layer<R>> {
        self.stacked.iter().rev().chain(std::iter::once(&self.base))
    }

    fn innermost(&self) -> &Layer<R> {
        self.stacked.last().unwrap_or(&self.base)
    }

    fn innermost_mut(&mut self) -> &mut Layer<R> {
        self.stacked.last_mut().unwrap_or(&mut self.base)
    }
}

impl<R> fmt::Debug for DispatchContext<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("view", &self.view())
            .field("operations", &self.operation_keys())
            .field("depth", &self.depth())
            .field("has_instance", &self.has_instance())
            .field("attributes", &self.attributes)
            .field("http_method", &self.http_method)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestRequest = http::Request<String>;

    #[derive(Debug, PartialEq)]
    struct Article {
        slug: &'static str,
    }

    fn request() -> TestRequest {
        http::Request::get("/").body(String::new()).expect("build request")
    }

    #[test]
    fn attributes_are_typed() {
        let attributes = Attributes::new()
            .with("article", Article { slug: "intro" })
            .with("page", 3_u32);
        assert_eq!(
            attributes.get::<Article>("article"),
            Some(&Article { slug: "intro" })
        );
        assert_eq!(attributes.get::<u32>("page"), Some(&3));
        assert_eq!(attributes.get::<String>("page"), None);
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn set_attributes_replaces_wholesale() {
        let request = request();
        let mut context = DispatchContext::bind(&request, "detail", Registry::<TestRequest>::new());
        context.set_attributes(Attributes::new().with("a", 1_i32).with("b", 2_i32));
        context.set_attributes(Attributes::new().with("c", 3_i32));
        assert!(!context.attributes().contains("a"));
        assert!(context.attributes().contains("c"));
    }

    #[test]
    fn binds_with_defaults() {
        let request = request();
        let context = DispatchContext::bind(&request, "detail", Registry::<TestRequest>::new());
        assert_eq!(context.view(), "detail");
        assert_eq!(context.http_method(), HttpMethod::Get);
        assert!(context.attributes().is_empty());
        assert!(!context.has_instance());
    }

    #[test]
    fn downcasts_instance() {
        let request = request();
        let instance: Arc<dyn Any + Send + Sync> = Arc::new(Article { slug: "intro" });
        let context = DispatchContext::bind(&request, "detail", Registry::<TestRequest>::new())
            .with_instance(Some(instance));
        assert_eq!(
            context.instance::<Article>().map(|article| article.slug),
            Some("intro")
        );
        assert!(context.instance::<String>().is_none());
    }

    fn named(name: &str, reply: &'static str) -> Operation<TestRequest> {
        Operation::new(name, move |_call| Ok(crate::reply::Reply::text(reply)))
    }

    #[test]
    fn stacked_layers_resolve_innermost_first() {
        let request = request();
        let mut context =
            DispatchContext::bind(&request, "page", Registry::register([named("greet", "outer")]));
        let instance: Arc<dyn Any + Send + Sync> = Arc::new(Article { slug: "sidebar" });
        context.stack(
            "sidebar",
            Registry::register([named("greet", "inner"), named("vote", "inner")]),
            None,
            Some(instance),
        );

        assert_eq!(context.view(), "sidebar");
        assert_eq!(context.depth(), 1);
        assert_eq!(context.operation_keys(), vec!["op_greet", "op_vote"]);
        let (layer, operation) = context.resolve("op_greet").expect("greet resolves");
        assert_eq!(layer.view, "sidebar");
        assert_eq!(operation.name(), "greet");
        assert_eq!(
            context.instance::<Article>().map(|article| article.slug),
            Some("sidebar")
        );
    }

    #[test]
    fn outer_layers_still_serve_their_operations() {
        let request = request();
        let mut context =
            DispatchContext::bind(&request, "page", Registry::register([named("greet", "outer")]));
        context.stack("sidebar", Registry::new(), None, None);
        let (layer, _) = context.resolve("op_greet").expect("greet resolves");
        assert_eq!(layer.view, "page");
        assert!(context.resolve("op_vote").is_none());
    }

    #[test]
    fn extend_merges_into_the_innermost_layer() {
        let request = request();
        let mut context = DispatchContext::bind(&request, "page", Registry::new());
        context.stack("sidebar", Registry::new(), None, None);
        context.extend(&Registry::register([named("vote", "inner")]));
        let (layer, _) = context.resolve("op_vote").expect("vote resolves");
        assert_eq!(layer.view, "sidebar");
    }
}
