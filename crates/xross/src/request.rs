//! The request boundary consumed by the dispatcher.
//!
//! The dispatcher needs two things from a request: whether it is an
//! asynchronous sub-request, and the string fields submitted with it. Both are
//! expressed by the [`Request`] trait so any web stack can plug in. An
//! implementation for [`http::Request`] is provided, following the usual
//! browser conventions: the `X-Requested-With: XMLHttpRequest` header flags
//! AJAX calls, the query string carries `GET` data and URL-encoded form bodies
//! carry `POST` data.

use std::collections::HashMap;

use http::header::CONTENT_TYPE;
use url::form_urlencoded;

pub use xross_config::HttpMethod;

/// Header set by browser AJAX helpers.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Value of [`REQUESTED_WITH_HEADER`] identifying asynchronous requests.
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Read access to an inbound request.
pub trait Request {
    /// Returns `true` when the request is an asynchronous sub-request.
    fn is_ajax(&self) -> bool;

    /// Returns the string fields submitted through the given source.
    fn data(&self, method: HttpMethod) -> RequestData;
}

impl<T: Request + ?Sized> Request for &T {
    fn is_ajax(&self) -> bool {
        (**self).is_ajax()
    }

    fn data(&self, method: HttpMethod) -> RequestData {
        (**self).data(method)
    }
}

impl<B: AsRef<[u8]>> Request for http::Request<B> {
    fn is_ajax(&self) -> bool {
        self.headers()
            .get(REQUESTED_WITH_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case(XML_HTTP_REQUEST))
    }

    fn data(&self, method: HttpMethod) -> RequestData {
        match method {
            HttpMethod::Get => query_data(self),
            HttpMethod::Post => form_data(self),
            HttpMethod::Request => {
                let mut merged = query_data(self);
                merged.extend(form_data(self));
                merged
            }
        }
    }
}

fn query_data<B>(request: &http::Request<B>) -> RequestData {
    request
        .uri()
        .query()
        .map(|query| RequestData::from_urlencoded(query.as_bytes()))
        .unwrap_or_default()
}

fn form_data<B: AsRef<[u8]>>(request: &http::Request<B>) -> RequestData {
    if request.method() != http::Method::POST || !has_form_content_type(request) {
        return RequestData::new();
    }
    RequestData::from_urlencoded(request.body().as_ref())
}

fn has_form_content_type<B>(request: &http::Request<B>) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// String fields submitted with a request.
///
/// When a field is repeated, the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
    fields: HashMap<String, String>,
}

impl RequestData {
    /// Creates an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` payload.
    #[must_use]
    pub fn from_urlencoded(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Returns the raw value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns `true` when the field was submitted.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a field, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Copies every field of `other` into `self`, replacing duplicates.
    pub fn extend(&mut self, other: Self) {
        self.fields.extend(other.fields);
    }

    /// Number of distinct fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no field was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.insert(name, value);
        }
        data
    }
}
