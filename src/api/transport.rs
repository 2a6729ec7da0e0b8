//
//  graph-client
//  api/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Transport Adapters
//!
//! A [`Transport`] delivers an encoded [`GraphRequest`] and reports the raw
//! [`HttpResponse`]. The client is constructed with one explicitly; nothing
//! in the crate picks a transport on its own.
//!
//! | Adapter | Use |
//! |---------|-----|
//! | [`ReqwestTransport`] | Real network delivery over HTTPS |
//! | [`FakeTransport`] | Scripted responses for tests and dry runs |
//!
//! Timeouts belong to the adapter. Neither adapter retries.
//!
//! ## Example
//!
//! ```rust
//! use graph_client::api::{FakeTransport, GraphApi, GraphClient, HttpResponse, Params, RequestOptions};
//!
//! # tokio_test::block_on(async {
//! let transport = FakeTransport::new();
//! transport.push(HttpResponse::new(200, r#"{"id": "4", "name": "Mark"}"#));
//!
//! let client = GraphClient::new(transport.clone());
//! let user = client.get_object("4", Params::new(), RequestOptions::default()).await.unwrap();
//!
//! assert_eq!(user.get("name").unwrap(), "Mark");
//! assert_eq!(transport.requests()[0].url, "https://graph.facebook.com/4");
//! # });
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::Client;

use super::common::ApiError;
use super::request::{GraphRequest, HttpVerb};
use super::response::HttpResponse;
use crate::config::DefaultsConfig;

/// Delivers encoded requests.
///
/// Implementations only move bytes; classification and decoding happen in
/// the client.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends one request and returns the raw response.
    ///
    /// An `Err` means no usable response was received at all. HTTP error
    /// statuses are returned as `Ok` responses.
    async fn send(&self, request: GraphRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: GraphRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request).await
    }
}

/// Network transport backed by `reqwest`.
///
/// Redirects are not followed: picture lookups read the `Location` header of
/// the redirect itself.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a transport with the default timeout.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    /// Creates a transport with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(format!("graph-client/{}", crate::VERSION))
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { http })
    }

    /// Creates a transport from the `[defaults]` configuration section.
    pub fn from_config(defaults: &DefaultsConfig) -> Result<Self, ApiError> {
        Self::with_timeout(Duration::from_secs(defaults.timeout_secs))
    }

    fn multipart(request: GraphRequest) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (key, value) in request.params {
            form = form.text(key, value);
        }
        for (key, file) in request.files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(key, part);
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: GraphRequest) -> Result<HttpResponse, ApiError> {
        let builder = match request.method {
            HttpVerb::Get => self.http.get(request.full_url()),
            _ if request.is_multipart() => {
                let url = request.url.clone();
                self.http.post(url).multipart(Self::multipart(request)?)
            }
            _ => self.http.post(&request.url).form(&request.params),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else { continue };
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response.text().await?;
        tracing::debug!(status, bytes = body.len(), "Received response");

        Ok(HttpResponse {
            status,
            body,
            headers,
        })
    }
}

/// In-memory transport that replays scripted responses.
///
/// Responses are returned in the order they were pushed. Every request is
/// recorded, so callers can assert on what would have gone over the wire.
/// Clones share the same script and log.
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Debug, Default)]
struct FakeState {
    responses: VecDeque<HttpResponse>,
    requests: Vec<GraphRequest>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push(&self, response: HttpResponse) -> &Self {
        self.lock().responses.push_back(response);
        self
    }

    /// Queues a `200` response with a JSON body.
    pub fn push_json(&self, body: serde_json::Value) -> &Self {
        self.push(HttpResponse::new(200, body.to_string()))
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<GraphRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of scripted responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.lock().responses.len()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: GraphRequest) -> Result<HttpResponse, ApiError> {
        let mut state = self.lock();
        let url = request.full_url();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .ok_or_else(|| ApiError::Transport(format!("No scripted response for {url}")))
    }
}
