//
//  graph-client
//  api/response.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Response Decoder
//!
//! Turns a raw [`HttpResponse`] into the value a call asked for.
//!
//! ## Decoding Steps
//!
//! 1. Classify the status and body with [`ErrorChecker`]; any error stops here
//! 2. Run the call's [`ResponseCheck`] against the decoded body, if it has one
//! 3. Return the requested [`HttpComponent`], or the decoded body by default
//!
//! The service sometimes answers with a bare literal such as `true` or `42`.
//! [`decode_body`] accepts those by parsing the body as the single element of
//! a JSON array.
//!
//! ```rust
//! use graph_client::api::decode_body;
//! use serde_json::json;
//!
//! assert_eq!(decode_body("true").unwrap(), json!(true));
//! assert_eq!(decode_body("42").unwrap(), json!(42));
//! assert_eq!(decode_body("").unwrap(), json!(null));
//! ```

use std::collections::HashMap;

use serde_json::{json, Value};

use super::common::{ApiError, ErrorChecker, ErrorDetails, GraphCollection};
use super::request::HttpComponent;

/// Validation hook run against a decoded body before it is returned.
///
/// Returning `Some` aborts the call (or fails the batch slot) with that error.
pub type ResponseCheck = fn(&Value) -> Option<ApiError>;

/// One HTTP round-trip, as reported by a transport.
///
/// Created once per response and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body text.
    pub body: String,
    /// Response headers as reported by the transport.
    pub headers: HashMap<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Looks up a header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The result of one call.
///
/// Which variant comes back depends on the call's [`HttpComponent`] and on
/// the shape of the body.
#[derive(Debug, Clone)]
pub enum GraphResult {
    /// A decoded body that is not list-shaped, or a post-processed value.
    Value(Value),
    /// A list-shaped body with paging support.
    Collection(GraphCollection),
    /// The HTTP status, when [`HttpComponent::Status`] was requested.
    Status(u16),
    /// The response headers, when [`HttpComponent::Headers`] was requested.
    Headers(HashMap<String, String>),
    /// The whole response, when [`HttpComponent::Response`] was requested.
    Response(HttpResponse),
}

impl GraphResult {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&GraphCollection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<GraphCollection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }

    /// Looks up a key in a decoded object body.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Value(value) => value.get(key),
            Self::Collection(collection) => collection.raw_response().get(key),
            _ => None,
        }
    }

    /// Renders the result as JSON.
    ///
    /// Collections render as their full raw response, so paging metadata is
    /// kept.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Collection(collection) => collection.raw_response().clone(),
            Self::Status(status) => json!(status),
            Self::Headers(headers) => json!(headers),
            Self::Response(response) => json!({
                "status": response.status,
                "headers": response.headers,
                "body": response.body,
            }),
        }
    }

    /// Consumes the result, returning the JSON rendering.
    pub fn into_json(self) -> Value {
        match self {
            Self::Value(value) => value,
            other => other.to_json(),
        }
    }
}

impl From<Value> for GraphResult {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Decodes a body, tolerating bare JSON literals.
///
/// An empty body decodes to `null`.
pub fn decode_body(body: &str) -> Result<Value, serde_json::Error> {
    let wrapped: Vec<Value> = serde_json::from_str(&format!("[{body}]"))?;
    Ok(wrapped.into_iter().next().unwrap_or(Value::Null))
}

/// Classifies and decodes one response.
///
/// Errors are detected before the body is decoded, so non-JSON error pages
/// never reach the JSON parser. An undecodable success body is reported as
/// [`ApiError::BadResponse`]. List-shaped bodies come back as
/// [`GraphResult::Value`]; wrapping them as collections is up to the caller,
/// which owns the client the collection pages through.
pub fn decode_response(
    response: HttpResponse,
    component: Option<HttpComponent>,
    check: Option<ResponseCheck>,
) -> Result<GraphResult, ApiError> {
    if let Some(error) =
        ErrorChecker::new(response.status, &response.body, &response.headers).error_if_appropriate()
    {
        return Err(error);
    }

    let decoded = decode_body(&response.body);

    if let Some(check) = check {
        if let Some(error) = decoded.as_ref().ok().and_then(check) {
            tracing::warn!(status = response.status, "{}", error);
            return Err(error);
        }
    }

    match component {
        Some(HttpComponent::Status) => Ok(GraphResult::Status(response.status)),
        Some(HttpComponent::Headers) => Ok(GraphResult::Headers(response.headers)),
        Some(HttpComponent::Response) => Ok(GraphResult::Response(response)),
        None => decoded.map(GraphResult::Value).map_err(|e| {
            let message = format!("Could not decode response body: {e}");
            tracing::warn!(status = response.status, "{}", message);
            ApiError::BadResponse(ErrorDetails::new(
                Some(response.status),
                response.body,
                super::common::ErrorInfo {
                    message: Some(message),
                    ..Default::default()
                },
            ))
        }),
    }
}

pub(crate) fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
