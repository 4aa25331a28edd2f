//! Selects which part of a request supplies operation data.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Request data source consulted by the dispatcher.
///
/// `Get` and `Post` read the query string and the form body respectively.
/// `Request` merges both, with form fields shadowing query fields of the same
/// name.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    /// Query string parameters.
    #[default]
    Get,
    /// URL-encoded form body.
    Post,
    /// Query string and form body combined.
    Request,
}

/// Errors encountered while parsing an [`HttpMethod`] from text.
pub type HttpMethodParseError = strum::ParseError;
