//
//  graph-client
//  api/common/error_checker.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Error classification for Graph API responses.
//!
//! [`ErrorChecker`] looks at an HTTP status, body and headers and decides
//! whether they describe an error, and if so which [`ApiError`] variant it is.
//! The same checker is used for single calls and for every slot of a batch.
//!
//! # Classification Rules
//!
//! | Condition | Result |
//! |-----------|--------|
//! | status < 400 | no error |
//! | status >= 500 | [`ApiError::Server`] |
//! | `type == "OAuthException"` and code absent or token-related | [`ApiError::Authentication`] |
//! | any other status >= 400 | [`ApiError::Client`] |

use std::collections::HashMap;

use serde_json::Value;

use super::{ApiError, ErrorDetails, ErrorInfo};

/// Error type the service uses for OAuth failures.
pub const OAUTH_EXCEPTION: &str = "OAuthException";

/// Codes that mean the access token itself is invalid or expired.
///
/// An `OAuthException` with any other code (for example a permissions
/// problem) is a client error, not an authentication error.
pub const AUTHENTICATION_ERROR_CODES: [i64; 5] = [102, 190, 450, 452, 2500];

/// Header carrying the trace id for an error response.
const TRACE_ID_HEADER: &str = "x-fb-trace-id";

/// Classifies one response as an error or not.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use graph_client::api::common::ErrorChecker;
///
/// let headers = HashMap::new();
/// let body = r#"{"error": {"type": "OAuthException", "code": 190, "message": "Expired"}}"#;
/// let error = ErrorChecker::new(400, body, &headers).error_if_appropriate();
/// assert!(error.is_some_and(|e| e.is_authentication()));
///
/// assert!(ErrorChecker::new(200, "{}", &headers).error_if_appropriate().is_none());
/// ```
#[derive(Debug)]
pub struct ErrorChecker<'a> {
    status: u16,
    body: &'a str,
    headers: &'a HashMap<String, String>,
}

impl<'a> ErrorChecker<'a> {
    /// Creates a checker for the given response parts.
    pub fn new(status: u16, body: &'a str, headers: &'a HashMap<String, String>) -> Self {
        Self {
            status,
            body,
            headers,
        }
    }

    /// Returns the classified error, or `None` when the status is below 400.
    pub fn error_if_appropriate(&self) -> Option<ApiError> {
        if self.status < 400 {
            return None;
        }

        let info = self.error_info();
        let details = ErrorDetails::new(Some(self.status), self.body, info);

        let error = if self.status >= 500 {
            ApiError::Server(details)
        } else if is_auth_error(&details.info) {
            ApiError::Authentication(details)
        } else {
            ApiError::Client(details)
        };

        tracing::warn!(status = self.status, "{}", error);
        Some(error)
    }

    /// Extracts the error descriptor from the body, plus the trace header.
    ///
    /// Bodies that are not JSON, or JSON without a recognisable error shape,
    /// produce an empty descriptor.
    pub fn error_info(&self) -> ErrorInfo {
        let mut info = serde_json::from_str::<Value>(self.body)
            .ok()
            .map(|json| parse_error_info(&json))
            .unwrap_or_default();

        if info.fbtrace_id.is_none() {
            info.fbtrace_id = self
                .headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(TRACE_ID_HEADER))
                .map(|(_, value)| value.clone());
        }

        info
    }
}

/// Extracts an [`ErrorInfo`] from a decoded body of either known shape.
///
/// Returns the default descriptor when the body carries no error.
pub fn parse_error_info(json: &Value) -> ErrorInfo {
    // Current format: {"error": {"type", "code", "error_subcode", "message"}}
    if let Some(error) = json.get("error").filter(|e| e.is_object()) {
        let text = |key: &str| error.get(key).and_then(Value::as_str).map(String::from);
        return ErrorInfo {
            error_type: text("type"),
            code: error.get("code").and_then(as_code),
            error_subcode: error.get("error_subcode").and_then(as_code),
            message: text("message"),
            error_user_title: text("error_user_title"),
            error_user_msg: text("error_user_msg"),
            fbtrace_id: text("fbtrace_id"),
        };
    }

    // Legacy format: {"error_code": 100, "error_description": "..."}
    let code = json.get("error_code").and_then(as_code);
    let description = json
        .get("error_description")
        .or_else(|| json.get("error_msg"))
        .and_then(Value::as_str);

    if code.is_none() && description.is_none() {
        return ErrorInfo::default();
    }

    ErrorInfo {
        // {"error": "invalid_request", "error_description": "..."}
        error_type: json.get("error").and_then(Value::as_str).map(String::from),
        code,
        message: description.map(String::from),
        ..Default::default()
    }
}

/// True when the descriptor describes a bad or expired token.
pub fn is_auth_error(info: &ErrorInfo) -> bool {
    info.error_type.as_deref() == Some(OAUTH_EXCEPTION)
        && info
            .code
            .map_or(true, |code| AUTHENTICATION_ERROR_CODES.contains(&code))
}

/// Some deployments send numeric codes as strings.
fn as_code(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: u16, body: &str) -> Option<ApiError> {
        ErrorChecker::new(status, body, &HashMap::new()).error_if_appropriate()
    }

    #[test]
    fn test_no_error_below_400() {
        assert!(check(200, r#"{"error": {"type": "OAuthException"}}"#).is_none());
        assert!(check(304, "").is_none());
    }

    #[test]
    fn test_oauth_exception_with_token_code_is_authentication() {
        let body = r#"{"error": {"type": "OAuthException", "code": 190, "message": "Expired"}}"#;
        let err = check(400, body).unwrap();
        assert!(err.is_authentication());
        assert_eq!(err.info().unwrap().code, Some(190));
    }

    #[test]
    fn test_oauth_exception_without_code_is_authentication() {
        let body = r#"{"error": {"type": "OAuthException", "message": "Bad token"}}"#;
        assert!(check(401, body).unwrap().is_authentication());
    }

    #[test]
    fn test_mistyped_field_keeps_the_others() {
        let body = r#"{"error": {"type": "OAuthException", "code": "190", "message": {"text": "Expired"}}}"#;
        let err = check(400, body).unwrap();
        assert!(err.is_authentication());

        let info = err.info().unwrap();
        assert_eq!(info.error_type.as_deref(), Some("OAuthException"));
        assert_eq!(info.code, Some(190));
        assert_eq!(info.message, None);
    }

    #[test]
    fn test_oauth_exception_with_other_code_is_client() {
        let body = r#"{"error": {"type": "OAuthException", "code": 10, "message": "Permission"}}"#;
        assert!(matches!(check(403, body), Some(ApiError::Client(_))));
    }

    #[test]
    fn test_404_without_type_is_client() {
        let err = check(404, r#"{"error": {"message": "Not here"}}"#).unwrap();
        assert!(matches!(err, ApiError::Client(_)));
        assert_eq!(err.http_status(), Some(404));
    }

    #[test]
    fn test_500_with_unparseable_body_is_server() {
        let err = check(500, "").unwrap();
        assert!(matches!(err, ApiError::Server(_)));
        assert_eq!(err.response_body(), Some(""));
        assert!(err.info().unwrap().is_empty());
    }

    #[test]
    fn test_legacy_error_shape() {
        let info = parse_error_info(&serde_json::json!({
            "error_code": 100,
            "error_description": "Invalid parameter"
        }));
        assert_eq!(info.code, Some(100));
        assert_eq!(info.message.as_deref(), Some("Invalid parameter"));
        assert_eq!(info.error_type, None);
    }

    #[test]
    fn test_string_codes_are_normalized() {
        let info = parse_error_info(&serde_json::json!({
            "error": {"type": "OAuthException", "code": "190", "error_subcode": "463"}
        }));
        assert_eq!(info.code, Some(190));
        assert_eq!(info.error_subcode, Some(463));
    }

    #[test]
    fn test_trace_header_is_captured() {
        let mut headers = HashMap::new();
        headers.insert("X-FB-Trace-ID".to_string(), "abc123".to_string());
        let err = ErrorChecker::new(400, r#"{"error": {"message": "x"}}"#, &headers)
            .error_if_appropriate()
            .unwrap();
        assert_eq!(err.info().unwrap().fbtrace_id.as_deref(), Some("abc123"));
        assert!(err.to_string().ends_with("x-fb-trace-id: abc123 [HTTP 400]"));
    }
}
