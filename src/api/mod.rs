//
//  graph-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! This module implements the request pipeline for the Graph API: encoding
//! calls, delivering them through a pluggable transport, decoding and
//! classifying responses, paging through collections, and batching.
//!
//! ## Architecture
//!
//! | Module | Role |
//! |--------|------|
//! | [`params`] | Ordered call parameters and file uploads |
//! | [`request`] | Request encoder, verbs and per-call options |
//! | [`transport`] | The [`Transport`] trait, reqwest and fake adapters |
//! | [`response`] | Response decoder and [`GraphResult`] |
//! | [`client`] | [`GraphClient`], the single-call pipeline |
//! | [`graph`] | [`GraphApi`], the operation surface |
//! | [`batch`] | [`BatchScope`], queued multi-call requests |
//! | [`common`] | Errors, error classification and [`GraphCollection`] |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use graph_client::api::{GraphApi, GraphClient, Params, ReqwestTransport, RequestOptions};
//!
//! # async fn run() -> Result<(), graph_client::api::common::ApiError> {
//! let client = GraphClient::new(ReqwestTransport::new()?).with_access_token("token");
//! let me = client
//!     .get_object("me", Params::new().with("fields", "id,name"), RequestOptions::default())
//!     .await?;
//! println!("{}", me.to_json());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`ApiError`](common::ApiError):
//!
//! - `Authentication`: bad or missing token (remote or local)
//! - `Client`: any other 4xx
//! - `Server`: 5xx
//! - `BadResponse`: a body that could not be decoded

pub mod batch;
pub mod client;
pub mod common;
pub mod graph;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use batch::{BatchOperation, BatchResult, BatchScope};
pub use client::GraphClient;
pub use common::{ApiError, GraphCollection};
pub use graph::{connection_path, GraphApi, GraphCall, PostProcess};
pub use params::{ParamValue, Params, UploadFile};
pub use request::{
    encode_request, BatchArgs, GraphRequest, HttpComponent, HttpVerb, RequestOptions,
};
pub use response::{decode_body, decode_response, GraphResult, HttpResponse, ResponseCheck};
pub use transport::{FakeTransport, ReqwestTransport, Transport};
