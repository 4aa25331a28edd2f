//! Behavioural tests for operation dispatch through a declared view.

use std::cell::RefCell;

use http::{Response, StatusCode};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{
    Attributes, Operation, OperationError, REQUESTED_WITH_HEADER, Reply, XML_HTTP_REQUEST,
    XrossView,
};

type TestRequest = http::Request<String>;

const PAGE: &str = "<html>articles</html>";

struct DispatchWorld {
    view: Option<XrossView<TestRequest>>,
    response: Option<Result<Response<String>, OperationError>>,
}

impl DispatchWorld {
    fn new() -> Self {
        Self {
            view: None,
            response: None,
        }
    }

    fn configure(
        &mut self,
        adjust: impl FnOnce(XrossView<TestRequest>) -> XrossView<TestRequest>,
    ) {
        let view = self.view.take().expect("view declared");
        self.view = Some(adjust(view));
    }

    fn send(&mut self, request: &TestRequest) {
        let view = self.view.as_ref().expect("view declared");
        self.response = Some(view.serve(request, |xross| {
            xross.listen(Attributes::new())?;
            Ok(Response::new(PAGE.to_owned()))
        }));
    }

    fn response(&self) -> &Response<String> {
        match &self.response {
            Some(Ok(response)) => response,
            Some(Err(error)) => panic!("operation failed: {error}"),
            None => panic!("no request was sent"),
        }
    }
}

#[fixture]
fn world() -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::new())
}

#[given("a view declaring greet and clear operations")]
fn given_view(world: &RefCell<DispatchWorld>) {
    let greet = Operation::<TestRequest>::new("greet", |call| {
        Ok(Reply::text(format!("hi {}", call.text("name")?)))
    })
    .required("request")
    .required("name")
    .optional("xross");
    let clear = Operation::<TestRequest>::new("clear", |_call| Ok(Reply::None));
    world.borrow_mut().view = Some(XrossView::new("article_list", [greet, clear]));
}

#[given("the view runs in debug mode")]
fn given_debug(world: &RefCell<DispatchWorld>) {
    world.borrow_mut().configure(|view| view.debug(true));
}

#[given("the view maps empty replies to not found")]
fn given_legacy_empty(world: &RefCell<DispatchWorld>) {
    world
        .borrow_mut()
        .configure(|view| view.empty_replies_not_found(true));
}

#[when("an AJAX request is sent to {uri}")]
fn when_ajax_request(world: &RefCell<DispatchWorld>, uri: String) {
    let request = http::Request::get(uri.as_str())
        .header(REQUESTED_WITH_HEADER, XML_HTTP_REQUEST)
        .body(String::new())
        .expect("build request");
    world.borrow_mut().send(&request);
}

#[when("a plain request is sent to {uri}")]
fn when_plain_request(world: &RefCell<DispatchWorld>, uri: String) {
    let request = http::Request::get(uri.as_str())
        .body(String::new())
        .expect("build request");
    world.borrow_mut().send(&request);
}

#[then("the response status is {status}")]
fn then_status(world: &RefCell<DispatchWorld>, status: u16) {
    let world = world.borrow();
    let expected = StatusCode::from_u16(status).expect("valid status");
    assert_eq!(world.response().status(), expected);
}

#[then("the response body is {body}")]
fn then_body(world: &RefCell<DispatchWorld>, body: String) {
    assert_eq!(world.borrow().response().body(), &body);
}

#[then("the response body mentions {text}")]
fn then_body_mentions(world: &RefCell<DispatchWorld>, text: String) {
    let world = world.borrow();
    let body = world.response().body();
    assert!(body.contains(&text), "expected `{text}` in body, got: {body}");
}

#[then("the page is rendered")]
fn then_page(world: &RefCell<DispatchWorld>) {
    assert_eq!(world.borrow().response().body(), PAGE);
}

#[scenario(path = "tests/features/operation_reply.feature")]
fn operation_reply(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/unimplemented_operation.feature")]
fn unimplemented_operation(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/missing_argument.feature")]
fn missing_argument(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/page_passthrough.feature")]
fn page_passthrough(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/empty_reply.feature")]
fn empty_reply(#[from(world)] world: RefCell<DispatchWorld>) {
    drop(world);
}
