//! Operation replies and their conversion into HTTP responses.
//!
//! Operations may answer with nothing, with text, with a mapping that is sent
//! as JSON, or with a response they built themselves. The view layer turns
//! the reply into an [`http::Response`] once dispatch completes.

use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::dispatch::OperationError;

/// Content type of text replies.
pub const TEXT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Content type of mapping replies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Value returned by an operation.
#[derive(Debug)]
pub enum Reply {
    /// No content.
    None,
    /// Text sent as the response body.
    Text(String),
    /// Mapping sent as a JSON object.
    Mapping(Map<String, JsonValue>),
    /// A complete response, sent as is.
    Response(Response<String>),
}

impl Reply {
    /// Builds a text reply.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text(body.into())
    }

    /// Builds a mapping reply from any value serialising to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Serialize`] when serialisation fails and
    /// [`OperationError::NotAMapping`] when the value is not an object.
    pub fn mapping<T: Serialize + ?Sized>(value: &T) -> Result<Self, OperationError> {
        match serde_json::to_value(value)? {
            JsonValue::Object(map) => Ok(Self::Mapping(map)),
            other => Err(OperationError::not_a_mapping(json_kind(&other))),
        }
    }

    /// Returns `true` for replies that carry nothing: no content, empty text
    /// or an empty mapping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(text) => text.is_empty(),
            Self::Mapping(map) => map.is_empty(),
            Self::Response(_) => false,
        }
    }

    /// Converts the reply into a response.
    #[must_use]
    pub fn into_response(self) -> Response<String> {
        match self {
            Self::None => Response::new(String::new()),
            Self::Text(text) => with_content_type(Response::new(text), TEXT_CONTENT_TYPE),
            Self::Mapping(map) => with_content_type(
                Response::new(JsonValue::Object(map).to_string()),
                JSON_CONTENT_TYPE,
            ),
            Self::Response(response) => response,
        }
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Map<String, JsonValue>> for Reply {
    fn from(value: Map<String, JsonValue>) -> Self {
        Self::Mapping(value)
    }
}

impl From<Response<String>> for Reply {
    fn from(value: Response<String>) -> Self {
        Self::Response(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Builds a 400 response, with `detail` as body when given.
#[must_use]
pub fn bad_request(detail: Option<String>) -> Response<String> {
    with_status(detail, StatusCode::BAD_REQUEST)
}

/// Builds a 404 response, with `detail` as body when given.
#[must_use]
pub fn not_found(detail: Option<String>) -> Response<String> {
    with_status(detail, StatusCode::NOT_FOUND)
}

fn with_status(detail: Option<String>, status: StatusCode) -> Response<String> {
    let mut response = Response::new(detail.unwrap_or_default());
    *response.status_mut() = status;
    if !response.body().is_empty() {
        response = with_content_type(response, TEXT_CONTENT_TYPE);
    }
    response
}

fn with_content_type(
    mut response: Response<String>,
    content_type: &'static str,
) -> Response<String> {
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
