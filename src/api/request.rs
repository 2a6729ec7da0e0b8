//
//  graph-client
//  api/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Encoder
//!
//! Turns a logical call `(path, params, verb, options)` into a transport-ready
//! [`GraphRequest`]. No network activity happens here.
//!
//! ## Encoding Steps
//!
//! 1. Inject the access token under `access_token` (a token passed in the
//!    call options wins over the client's own token)
//! 2. Join scalar arrays with commas (unless `preserve_form_arguments`)
//! 3. Ensure the path starts with `/` and carries the API version prefix
//! 4. Tunnel verbs other than GET/POST as a POST with a `method` parameter
//! 5. Split file parameters out for multipart delivery
//! 6. Resolve the server (graph, REST, beta or video host)
//!
//! ## Example
//!
//! ```rust
//! use graph_client::api::{encode_request, HttpVerb, Params, RequestOptions};
//! use graph_client::config::{Endpoints, ServerConfig};
//!
//! let endpoints = Endpoints::from_config(&ServerConfig::default()).unwrap();
//! let request = encode_request(
//!     &endpoints,
//!     "me/feed",
//!     Params::new().with("message", "hi"),
//!     HttpVerb::Delete,
//!     &RequestOptions::default(),
//!     Some("token"),
//! );
//!
//! assert_eq!(request.method, HttpVerb::Post);
//! assert_eq!(request.url, "https://graph.facebook.com/me/feed");
//! assert_eq!(request.encoded_params(), "access_token=token&message=hi&method=delete");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use super::params::{encode_wire, Params, UploadFile, ACCESS_TOKEN_KEY};
use crate::config::Endpoints;

/// HTTP verb of a logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpVerb {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// Lowercase name, as used for tunneling and in batch envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }

    /// Parses a verb name case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// GET and DELETE carry their arguments in the URL inside a batch.
    pub fn args_in_url(&self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which part of the response a call wants back.
///
/// When unset the decoded body is returned (wrapped in a
/// [`GraphCollection`](super::common::GraphCollection) when pageable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpComponent {
    /// The HTTP status code.
    Status,
    /// The response headers.
    Headers,
    /// The whole [`HttpResponse`](super::response::HttpResponse).
    Response,
}

/// Per-operation arguments understood by the batch endpoint.
///
/// These are passed through verbatim; dependency resolution between named
/// operations is done by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchArgs {
    /// Symbolic name other operations can reference.
    pub name: Option<String>,
    /// Name of an operation that must run first.
    pub depends_on: Option<String>,
    /// Ask the service to drop the body when the operation succeeds.
    pub omit_response_on_success: Option<bool>,
}

/// Options that shape how a single call is encoded and decoded.
///
/// # Fields
///
/// | Field | Description |
/// |-------|-------------|
/// | `access_token` | Token for this call only, overriding the client's |
/// | `http_component` | Return status/headers/response instead of the body |
/// | `api_version` | Version prefix for this call, overriding the config |
/// | `beta` | Route to the beta host |
/// | `video` | Route to the video upload host |
/// | `rest_api` | Route to the legacy REST host (no version prefix) |
/// | `preserve_form_arguments` | Send arrays as JSON instead of joining them |
/// | `batch` | Batch-only pass-through arguments |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub access_token: Option<String>,
    pub http_component: Option<HttpComponent>,
    pub api_version: Option<String>,
    pub beta: bool,
    pub video: bool,
    pub rest_api: bool,
    pub preserve_form_arguments: bool,
    pub batch: BatchArgs,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_component(mut self, component: HttpComponent) -> Self {
        self.http_component = Some(component);
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn beta(mut self) -> Self {
        self.beta = true;
        self
    }

    pub fn video(mut self) -> Self {
        self.video = true;
        self
    }

    pub fn rest_api(mut self) -> Self {
        self.rest_api = true;
        self
    }

    /// Names this operation inside a batch.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.batch.name = Some(name.into());
        self
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.batch.depends_on = Some(name.into());
        self
    }

    pub fn omit_response_on_success(mut self, omit: bool) -> Self {
        self.batch.omit_response_on_success = Some(omit);
        self
    }
}

/// A fully encoded request, ready for a [`Transport`](super::transport::Transport).
///
/// `method` is always GET or POST; other verbs have already been tunneled
/// through a `method` parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    /// GET or POST.
    pub method: HttpVerb,
    /// Scheme, host and path, without the query string.
    pub url: String,
    /// The path component (leading slash, version prefix included).
    pub path: String,
    /// Stringified parameters in key order.
    pub params: BTreeMap<String, String>,
    /// File parameters for multipart delivery.
    pub files: BTreeMap<String, UploadFile>,
}

impl GraphRequest {
    /// The URL-encoded parameter string, keys sorted.
    pub fn encoded_params(&self) -> String {
        encode_wire(&self.params)
    }

    /// The URL to request: GET requests get the parameters as a query string.
    pub fn full_url(&self) -> String {
        let query = self.encoded_params();
        if self.method == HttpVerb::Get && !query.is_empty() {
            let separator = if self.url.contains('?') { '&' } else { '?' };
            format!("{}{}{}", self.url, separator, query)
        } else {
            self.url.clone()
        }
    }

    /// Returns a parameter value by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty()
    }
}

/// Encodes one logical call into a [`GraphRequest`].
///
/// # Parameters
///
/// * `endpoints` - Compiled server configuration
/// * `path` - Relative path, with or without a leading slash
/// * `params` - Call parameters
/// * `verb` - Logical verb
/// * `options` - Per-call options
/// * `default_token` - The client's own access token, if it has one
pub fn encode_request(
    endpoints: &Endpoints,
    path: &str,
    mut params: Params,
    verb: HttpVerb,
    options: &RequestOptions,
    default_token: Option<&str>,
) -> GraphRequest {
    if let Some(token) = options.access_token.as_deref() {
        params.insert(ACCESS_TOKEN_KEY, token);
    } else if let Some(token) = default_token {
        params.insert_if_absent(ACCESS_TOKEN_KEY, token);
    }

    if !options.preserve_form_arguments {
        params = params.sanitize();
    }

    let path = endpoints.versioned_path(&normalize_path(path), options);

    let method = match verb {
        HttpVerb::Get | HttpVerb::Post => verb,
        HttpVerb::Put | HttpVerb::Delete => {
            params.insert("method", verb.as_str());
            HttpVerb::Post
        }
    };

    let files = params.take_files();
    let url = format!("{}{}", endpoints.server(options), path);

    tracing::debug!(
        verb = %verb,
        path = %path,
        params = ?params.keys().collect::<Vec<_>>(),
        files = files.len(),
        "Encoded request"
    );

    GraphRequest {
        method,
        url,
        path,
        params: params.to_wire(),
        files,
    }
}

/// Ensures the path starts with `/`.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn endpoints() -> Endpoints {
        Endpoints::from_config(&ServerConfig::default()).unwrap()
    }

    #[test]
    fn test_leading_slash_is_added() {
        let req = encode_request(&endpoints(), "me", Params::new(), HttpVerb::Get, &RequestOptions::default(), None);
        assert_eq!(req.path, "/me");
        assert_eq!(req.full_url(), "https://graph.facebook.com/me");
    }

    #[test]
    fn test_client_token_is_injected() {
        let req = encode_request(&endpoints(), "/me", Params::new(), HttpVerb::Get, &RequestOptions::default(), Some("abc"));
        assert_eq!(req.param("access_token"), Some("abc"));
        assert_eq!(req.full_url(), "https://graph.facebook.com/me?access_token=abc");
    }

    #[test]
    fn test_option_token_overrides_client_token() {
        let options = RequestOptions::new().with_access_token("op-token");
        let params = Params::new().with("access_token", "param-token");
        let req = encode_request(&endpoints(), "me", params, HttpVerb::Get, &options, Some("client"));
        assert_eq!(req.param("access_token"), Some("op-token"));
    }

    #[test]
    fn test_explicit_param_token_is_kept() {
        let params = Params::new().with("access_token", "param-token");
        let req = encode_request(&endpoints(), "me", params, HttpVerb::Get, &RequestOptions::default(), Some("client"));
        assert_eq!(req.param("access_token"), Some("param-token"));
    }

    #[test]
    fn test_post_stays_post() {
        let req = encode_request(&endpoints(), "me/feed", Params::new(), HttpVerb::Post, &RequestOptions::default(), None);
        assert_eq!(req.method, HttpVerb::Post);
        assert_eq!(req.param("method"), None);
    }

    #[test]
    fn test_put_is_tunneled() {
        let req = encode_request(&endpoints(), "123", Params::new(), HttpVerb::Put, &RequestOptions::default(), None);
        assert_eq!(req.method, HttpVerb::Post);
        assert_eq!(req.param("method"), Some("put"));
    }

    #[test]
    fn test_post_url_has_no_query() {
        let params = Params::new().with("message", "hi");
        let req = encode_request(&endpoints(), "me/feed", params, HttpVerb::Post, &RequestOptions::default(), None);
        assert_eq!(req.full_url(), "https://graph.facebook.com/me/feed");
        assert_eq!(req.encoded_params(), "message=hi");
    }

    #[test]
    fn test_files_are_split_out() {
        let params = Params::new()
            .with("message", "caption")
            .with("source", UploadFile::new("cat.jpg", vec![1]));
        let req = encode_request(&endpoints(), "me/photos", params, HttpVerb::Post, &RequestOptions::default(), None);
        assert!(req.is_multipart());
        assert!(req.files.contains_key("source"));
        assert_eq!(req.encoded_params(), "message=caption");
    }
}
