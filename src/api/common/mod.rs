//
//  graph-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Graph Client
//!
//! This module provides the error taxonomy shared by every layer of the
//! request pipeline, together with the error classifier and the paginated
//! collection wrapper.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`ErrorDetails`] - Status, raw body and structured fields behind an error
//! - [`ErrorInfo`] - The structured error descriptor decoded from a response
//! - [`ErrorChecker`] - Decides whether a response is an error and which kind
//! - [`GraphCollection`] - One page of a list-valued response (re-exported from [`pagination`])
//!
//! # Example
//!
//! ```rust
//! use graph_client::api::common::ApiError;
//!
//! fn handle<T>(result: Result<T, ApiError>) {
//!     match result {
//!         Ok(_) => println!("Success!"),
//!         Err(ApiError::Authentication(details)) => {
//!             println!("Token problem: {}", details.message());
//!         }
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Notes
//!
//! - Remote errors keep their type, code, subcode and HTTP status so callers
//!   can branch on them programmatically
//! - Nothing in this crate retries a failed call

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod error_checker;
mod pagination;

pub use error_checker::*;
pub use pagination::*;

/// Unified error type for all Graph API operations.
///
/// `ApiError` covers both errors reported by the remote service and errors
/// detected locally before any request is sent. It implements the standard
/// `Error` trait via `thiserror`.
///
/// # Variants
///
/// | Variant | Description | HTTP Status |
/// |---------|-------------|-------------|
/// | `Authentication` | Missing, invalid or expired access token | 4xx or none |
/// | `Client` | Any other rejected request | 4xx |
/// | `Server` | Remote failure | 5xx |
/// | `BadResponse` | Empty or unparseable body | any |
/// | `BatchInProgress` | A second batch scope was opened on one client | N/A |
/// | `Network` | Connectivity failure inside the reqwest transport | N/A |
/// | `Transport` | Any other transport adapter failure | N/A |
/// | `Io` | Reading an upload from disk failed | N/A |
/// | `Config` | Invalid endpoint configuration | N/A |
///
/// # Example
///
/// ```rust
/// use graph_client::api::common::{ApiError, ErrorDetails};
///
/// let err = ApiError::Authentication(ErrorDetails::local(
///     "Write operations require an access token",
/// ));
/// assert!(err.is_authentication());
/// assert_eq!(err.http_status(), None);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// The access token is missing, invalid or expired.
    ///
    /// Raised remotely when the service reports an OAuth exception with a
    /// token-related code, or locally when a write is attempted without a
    /// token (in which case `http_status` is `None`).
    #[error("{0}")]
    Authentication(ErrorDetails),

    /// The service rejected the request (HTTP 4xx that is not an
    /// authentication problem).
    #[error("{0}")]
    Client(ErrorDetails),

    /// The service failed while handling the request (HTTP 5xx).
    #[error("{0}")]
    Server(ErrorDetails),

    /// The service returned a body that could not be decoded.
    ///
    /// This is treated as a server-side failure: the request may or may not
    /// have been applied.
    #[error("{0}")]
    BadResponse(ErrorDetails),

    /// A batch scope is already open on this client.
    #[error("A batch is already being queued on this client")]
    BatchInProgress,

    /// A network-level error occurred inside the reqwest transport.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The transport adapter failed for a reason other than the network.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Reading a file for upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The endpoint configuration is invalid (for example a bad host matcher).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Returns the details for remote or classified errors.
    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            Self::Authentication(d) | Self::Client(d) | Self::Server(d) | Self::BadResponse(d) => {
                Some(d)
            }
            _ => None,
        }
    }

    /// Returns the HTTP status the error was raised for, if any.
    ///
    /// `None` means the error was detected before any network call.
    pub fn http_status(&self) -> Option<u16> {
        self.details().and_then(|d| d.http_status)
    }

    /// Returns the raw response body the error was raised for.
    pub fn response_body(&self) -> Option<&str> {
        self.details().map(|d| d.response_body.as_str())
    }

    /// Returns the structured error descriptor.
    pub fn info(&self) -> Option<&ErrorInfo> {
        self.details().map(|d| &d.info)
    }

    /// Returns `true` for authentication errors, local or remote.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Returns `true` for server-side failures, including bad responses.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server(_) | Self::BadResponse(_))
    }
}

/// The status, body and decoded descriptor behind a classified error.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `http_status` | `Option<u16>` | Status of the failed response, `None` for local errors |
/// | `response_body` | `String` | Raw body, kept verbatim |
/// | `info` | [`ErrorInfo`] | Fields extracted from the body |
///
/// The human-readable message is computed once at construction; see
/// [`ErrorDetails::message`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    /// HTTP status of the response, or `None` when no request was made.
    pub http_status: Option<u16>,

    /// The raw response body, unmodified.
    pub response_body: String,

    /// Structured fields decoded from the body.
    pub info: ErrorInfo,

    message: String,
}

impl ErrorDetails {
    /// Builds details for a response, deriving the message from `info`.
    ///
    /// Present fields are joined as `key: value` pairs; when none are present
    /// the trimmed body is used instead. Either way the message ends with
    /// ` [HTTP <status>]` when the status is known.
    pub fn new(http_status: Option<u16>, response_body: impl Into<String>, info: ErrorInfo) -> Self {
        let response_body = response_body.into();
        let fields = info.fields();

        let mut message = if fields.is_empty() {
            response_body.trim().to_string()
        } else {
            fields
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join(", ")
        };

        if let Some(status) = http_status {
            if message.is_empty() {
                message = format!("[HTTP {status}]");
            } else {
                message.push_str(&format!(" [HTTP {status}]"));
            }
        }

        Self {
            http_status,
            response_body,
            info,
            message,
        }
    }

    /// Builds details for an error detected before any network call.
    pub fn local(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            http_status: None,
            response_body: String::new(),
            info: ErrorInfo {
                message: Some(message.clone()),
                ..Default::default()
            },
            message,
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Structured error descriptor decoded from an error response.
///
/// Two body shapes populate this type:
///
/// ```json
/// {"error": {"type": "OAuthException", "code": 190, "error_subcode": 460, "message": "..."}}
/// ```
///
/// and the legacy REST shape:
///
/// ```json
/// {"error_code": 100, "error_description": "..."}
/// ```
///
/// Every field is optional; an unparseable body yields the default (empty)
/// descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error type, e.g. `OAuthException`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Numeric error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    /// Numeric error subcode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_subcode: Option<i64>,

    /// Developer-facing error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Title suitable for showing to an end user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_user_title: Option<String>,

    /// Message suitable for showing to an end user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_user_msg: Option<String>,

    /// Trace identifier for support requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
}

impl ErrorInfo {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Present fields as `(key, value)` pairs in message order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(v) = &self.error_type {
            fields.push(("type", v.clone()));
        }
        if let Some(v) = self.code {
            fields.push(("code", v.to_string()));
        }
        if let Some(v) = self.error_subcode {
            fields.push(("error_subcode", v.to_string()));
        }
        if let Some(v) = &self.message {
            fields.push(("message", v.clone()));
        }
        if let Some(v) = &self.error_user_title {
            fields.push(("error_user_title", v.clone()));
        }
        if let Some(v) = &self.error_user_msg {
            fields.push(("error_user_msg", v.clone()));
        }
        if let Some(v) = &self.fbtrace_id {
            fields.push(("x-fb-trace-id", v.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_joins_present_fields() {
        let info = ErrorInfo {
            error_type: Some("OAuthException".to_string()),
            code: Some(190),
            error_subcode: Some(460),
            message: Some("Session expired".to_string()),
            ..Default::default()
        };
        let details = ErrorDetails::new(Some(400), "{}", info);
        assert_eq!(
            details.message(),
            "type: OAuthException, code: 190, error_subcode: 460, message: Session expired [HTTP 400]"
        );
    }

    #[test]
    fn test_message_falls_back_to_trimmed_body() {
        let details = ErrorDetails::new(Some(502), "  Bad Gateway\n", ErrorInfo::default());
        assert_eq!(details.message(), "Bad Gateway [HTTP 502]");
        assert_eq!(details.response_body, "  Bad Gateway\n");
    }

    #[test]
    fn test_local_error_has_no_status() {
        let err = ApiError::Authentication(ErrorDetails::local("no token"));
        assert_eq!(err.http_status(), None);
        assert_eq!(err.to_string(), "no token");
        assert_eq!(err.response_body(), Some(""));
    }
}
