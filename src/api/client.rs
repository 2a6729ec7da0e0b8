//
//  graph-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph API Client
//!
//! [`GraphClient`] runs the single-call pipeline:
//!
//! ```text
//! GraphCall -> encode_request -> Transport::send -> decode_response
//!           -> GraphCollection::evaluate -> post-process -> GraphResult
//! ```
//!
//! ## Features
//!
//! - Explicit transport injection (no default adapter is picked implicitly)
//! - Token injection, with per-call overrides
//! - Configurable hosts and API version via [`Endpoints`]
//! - Batch scopes through [`GraphClient::batch`]
//!
//! The client is cheap to clone. Clones share the transport, the endpoint
//! configuration and the batch flag, so a batch opened on one clone blocks
//! batches on the others.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::batch::BatchScope;
use super::common::{ApiError, ErrorChecker, GraphCollection};
use super::graph::{GraphApi, GraphCall};
use super::params::Params;
use super::request::{encode_request, HttpVerb, RequestOptions};
use super::response::{decode_response, GraphResult, HttpResponse};
use super::transport::{ReqwestTransport, Transport};
use crate::config::{Config, Endpoints};

/// The Graph API client.
///
/// # Creating a Client
///
/// ```rust,no_run
/// use graph_client::api::{GraphClient, ReqwestTransport};
/// use graph_client::config::Config;
///
/// // Explicit transport, default hosts
/// let client = GraphClient::new(ReqwestTransport::new()?).with_access_token("token");
///
/// // Hosts, version and timeout from the config file
/// let client = GraphClient::from_config(&Config::load()?)?.with_access_token("token");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Clone)]
pub struct GraphClient {
    /// Delivers encoded requests
    transport: Arc<dyn Transport>,
    /// Compiled host configuration
    endpoints: Arc<Endpoints>,
    /// Token injected into every call that does not bring its own
    access_token: Option<String>,
    /// Set while a batch scope is open
    batch_active: Arc<AtomicBool>,
}

impl GraphClient {
    /// Creates a client for the default hosts.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Creates a client around a shared transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoints: Arc::new(Endpoints::default()),
            access_token: None,
            batch_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a client with a [`ReqwestTransport`] and the hosts of `config`.
    ///
    /// # Errors
    ///
    /// Fails when the host matcher does not compile or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::from_config(&config.defaults)?;
        Ok(Self::new(transport).with_endpoints(Endpoints::from_config(&config.server)?))
    }

    /// Sets the access token. An empty token counts as no token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.access_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Replaces the endpoint configuration.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Arc::new(endpoints);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Sends one call and returns the raw response.
    ///
    /// Statuses of 500 and above fail here, before the body is looked at.
    /// Other statuses are returned as-is for the caller to classify.
    pub async fn api(
        &self,
        path: &str,
        params: Params,
        verb: HttpVerb,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = encode_request(
            &self.endpoints,
            path,
            params,
            verb,
            options,
            self.access_token.as_deref(),
        );
        let request_path = request.path.clone();

        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status, path = %request_path, "Graph API response");

        if response.status >= 500 {
            if let Some(error) =
                ErrorChecker::new(response.status, &response.body, &response.headers).error_if_appropriate()
            {
                return Err(error);
            }
        }
        Ok(response)
    }

    /// Runs one call through the full pipeline.
    pub async fn graph_call(&self, call: GraphCall) -> Result<GraphResult, ApiError> {
        let GraphCall {
            path,
            params,
            verb,
            options,
            check,
            post_process,
        } = call;

        let response = self.api(&path, params, verb, &options).await?;
        let result = decode_response(response, options.http_component, check)?;
        let result = GraphCollection::evaluate(result, self);

        match post_process {
            Some(post_process) => post_process(result),
            None => Ok(result),
        }
    }

    /// Opens a batch scope.
    ///
    /// Calls made on the scope are queued and sent as one request by
    /// [`BatchScope::execute`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BatchInProgress`] if a scope is already open on
    /// this client or one of its clones.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use graph_client::api::{GraphApi, GraphClient, Params, ReqwestTransport, RequestOptions};
    ///
    /// # async fn run() -> Result<(), graph_client::api::common::ApiError> {
    /// let client = GraphClient::new(ReqwestTransport::new()?).with_access_token("token");
    ///
    /// let batch = client.batch()?;
    /// batch.get_object("me", Params::new(), RequestOptions::default()).await?;
    /// batch.get_connections("me", "friends", Params::new(), RequestOptions::default()).await?;
    ///
    /// for result in batch.execute().await? {
    ///     match result {
    ///         Ok(value) => println!("{}", value.to_json()),
    ///         Err(e) => eprintln!("{e}"),
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn batch(&self) -> Result<BatchScope<'_>, ApiError> {
        BatchScope::open(self)
    }

    pub(crate) fn batch_flag(&self) -> &AtomicBool {
        &self.batch_active
    }
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient")
            .field("transport", &self.transport)
            .field("endpoints", &self.endpoints)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    type Output = GraphResult;

    async fn dispatch(&self, call: GraphCall) -> Result<GraphResult, ApiError> {
        self.graph_call(call).await
    }

    fn empty(&self) -> GraphResult {
        GraphResult::Value(json!({}))
    }

    fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FakeTransport, HttpComponent};
    use crate::config::ServerConfig;

    #[tokio::test]
    async fn test_server_error_short_circuits() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(500, "<html>oops</html>"));
        let client = GraphClient::new(fake.clone());

        let err = client
            .get_object("me", Params::new(), RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Server(_)));
        assert_eq!(err.http_status(), Some(500));
        assert_eq!(err.response_body(), Some("<html>oops</html>"));
    }

    #[tokio::test]
    async fn test_client_error_is_raised() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(
            400,
            r#"{"error": {"type": "OAuthException", "code": 190, "message": "Error validating access token"}}"#,
        ));
        let client = GraphClient::new(fake).with_access_token("expired");

        let err = client
            .get_object("me", Params::new(), RequestOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.http_status(), Some(400));
    }

    #[tokio::test]
    async fn test_pageable_body_becomes_collection() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"data": [{"id": "1"}], "paging": {}}));
        let client = GraphClient::new(fake);

        let result = client
            .get_connections("me", "friends", Params::new(), RequestOptions::default())
            .await
            .unwrap();
        let collection = result.as_collection().unwrap();
        assert_eq!(collection.len(), 1);
        assert_eq!(collection[0]["id"], "1");
    }

    #[tokio::test]
    async fn test_status_component() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(204, ""));
        let client = GraphClient::new(fake);

        let result = client
            .get_object("me", Params::new(), RequestOptions::new().with_component(HttpComponent::Status))
            .await
            .unwrap();
        assert!(matches!(result, GraphResult::Status(204)));
    }

    #[tokio::test]
    async fn test_api_version_from_config() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"id": "1"}));
        let endpoints = Endpoints::from_config(&ServerConfig {
            api_version: Some("v2.8".to_string()),
            ..Default::default()
        })
        .unwrap();
        let client = GraphClient::new(fake.clone()).with_endpoints(endpoints);

        client
            .get_object("me", Params::new(), RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(fake.requests()[0].url, "https://graph.facebook.com/v2.8/me");
    }

    #[test]
    fn test_empty_token_is_no_token() {
        let client = GraphClient::new(FakeTransport::new()).with_access_token("");
        assert_eq!(GraphApi::access_token(&client), None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = GraphClient::new(FakeTransport::new()).with_access_token("secret");
        assert!(!format!("{client:?}").contains("secret"));
    }
}
