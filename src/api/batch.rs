//
//  graph-client
//  api/batch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Batch Requests
//!
//! A [`BatchScope`] captures calls instead of sending them, then sends them
//! all as one request to the batch endpoint and splits the compound response
//! back into one result per call.
//!
//! ## Lifecycle
//!
//! | State | How |
//! |-------|-----|
//! | Idle | no scope open on the client |
//! | Queuing | [`GraphClient::batch`] returned a scope; calls on it are queued |
//! | Idle | [`BatchScope::execute`] consumed the scope (or it was dropped) |
//!
//! Only one scope can be open per client. Operations run in queue order and
//! results come back in the same order.
//!
//! ## Failure Isolation
//!
//! - A failing operation only fails its own slot: its result is an `Err`,
//!   its siblings are unaffected
//! - A failure of the compound request itself (network error, 5xx, an
//!   outer 4xx, a body that is not a JSON array) fails the whole batch
//!
//! ## Wire Format
//!
//! The request is a POST to `/` with a `batch` parameter holding a JSON array:
//!
//! ```json
//! [
//!   {"method": "get", "relative_url": "me?fields=name"},
//!   {"method": "post", "relative_url": "me/feed", "body": "message=hi", "name": "post"},
//!   {"method": "post", "relative_url": "me/photos", "attached_files": "op2_file0"}
//! ]
//! ```
//!
//! The response is an array of `{"code", "headers": [{"name", "value"}], "body"}`
//! (or `null` for operations that asked to omit their response).
//!
//! ## Example
//!
//! ```rust
//! use graph_client::api::{FakeTransport, GraphApi, GraphClient, HttpResponse, Params, RequestOptions};
//!
//! # tokio_test::block_on(async {
//! let transport = FakeTransport::new();
//! transport.push(HttpResponse::new(200, r#"[
//!     {"code": 200, "headers": [], "body": "{\"id\": \"1\"}"},
//!     {"code": 404, "headers": [], "body": "{\"error\": {\"message\": \"Unknown\"}}"}
//! ]"#));
//!
//! let client = GraphClient::new(transport.clone()).with_access_token("token");
//! let batch = client.batch().unwrap();
//! batch.get_object("1", Params::new(), RequestOptions::default()).await.unwrap();
//! batch.get_object("missing", Params::new(), RequestOptions::default()).await.unwrap();
//!
//! let results = batch.execute().await.unwrap();
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! assert_eq!(transport.call_count(), 1);
//! # });
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::Ordering;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::common::{ApiError, ErrorChecker, ErrorDetails, ErrorInfo, GraphCollection};
use super::graph::{GraphApi, GraphCall, PostProcess};
use super::params::{ParamValue, Params, UploadFile, ACCESS_TOKEN_KEY};
use super::request::{HttpComponent, HttpVerb, RequestOptions};
use super::response::{decode_body, decode_response, GraphResult, HttpResponse, ResponseCheck};
use super::GraphClient;

/// Result of one batch slot.
pub type BatchResult = Result<GraphResult, ApiError>;

/// A queued call.
///
/// Built when a call is made on a [`BatchScope`]; consumed once when the
/// batch executes.
pub struct BatchOperation {
    path: String,
    params: Params,
    verb: HttpVerb,
    options: RequestOptions,
    access_token: String,
    check: Option<ResponseCheck>,
    post_process: Option<PostProcess>,
}

/// What is needed to turn a slot back into a result.
struct SlotHandler {
    component: Option<HttpComponent>,
    check: Option<ResponseCheck>,
    post_process: Option<PostProcess>,
}

impl BatchOperation {
    /// Captures a call.
    ///
    /// # Errors
    ///
    /// Every operation needs a token, either from its options or from the
    /// client; without one this fails with a local
    /// [`ApiError::Authentication`].
    pub fn new(call: GraphCall, default_token: Option<&str>) -> Result<Self, ApiError> {
        let access_token = call
            .options
            .access_token
            .as_deref()
            .or(default_token)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                ApiError::Authentication(ErrorDetails::local(
                    "Batch operations require an access token",
                ))
            })?;

        Ok(Self {
            path: call.path,
            params: call.params,
            verb: call.verb,
            options: call.options,
            access_token,
            check: call.check,
            post_process: call.post_process,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn verb(&self) -> HttpVerb {
        self.verb
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Serializes the operation as envelope entry number `index`.
    ///
    /// The token is only written out when it differs from the envelope's.
    /// File parameters are renamed `op<index>_file<n>` and returned
    /// separately for the multipart body.
    fn into_parts(
        self,
        index: usize,
        envelope_token: &str,
    ) -> (Value, BTreeMap<String, UploadFile>, SlotHandler) {
        let mut params = self.params;
        if self.access_token != envelope_token {
            params.insert(ACCESS_TOKEN_KEY, self.access_token);
        }
        if !self.options.preserve_form_arguments {
            params = params.sanitize();
        }

        let mut files = BTreeMap::new();
        for (n, (_, file)) in params.take_files().into_iter().enumerate() {
            files.insert(format!("op{index}_file{n}"), file);
        }

        let encoded = params.encode();
        let mut relative_url = self.path.trim_start_matches('/').to_string();
        if let Some(version) = self.options.api_version.as_deref().filter(|v| !v.is_empty()) {
            relative_url = format!("{version}/{relative_url}");
        }

        let mut entry = Map::new();
        entry.insert("method".into(), self.verb.as_str().into());

        if self.verb.args_in_url() {
            if !encoded.is_empty() {
                let separator = if relative_url.contains('?') { '&' } else { '?' };
                relative_url = format!("{relative_url}{separator}{encoded}");
            }
        } else if !encoded.is_empty() {
            entry.insert("body".into(), encoded.into());
        }
        entry.insert("relative_url".into(), relative_url.into());

        let batch = &self.options.batch;
        if let Some(name) = &batch.name {
            entry.insert("name".into(), name.clone().into());
        }
        if let Some(depends_on) = &batch.depends_on {
            entry.insert("depends_on".into(), depends_on.clone().into());
        }
        if let Some(omit) = batch.omit_response_on_success {
            entry.insert("omit_response_on_success".into(), omit.into());
        }
        if !files.is_empty() {
            let names: Vec<&str> = files.keys().map(String::as_str).collect();
            entry.insert("attached_files".into(), names.join(",").into());
        }

        let handler = SlotHandler {
            component: self.options.http_component,
            check: self.check,
            post_process: self.post_process,
        };
        (Value::Object(entry), files, handler)
    }
}

impl std::fmt::Debug for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOperation")
            .field("path", &self.path)
            .field("verb", &self.verb)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("batch", &self.options.batch)
            .finish_non_exhaustive()
    }
}

/// An open batch on a [`GraphClient`].
///
/// Implements [`GraphApi`], so every operation can be queued on it. Queued
/// calls return `Ok(())`; their results come from [`execute`](Self::execute).
/// Dropping the scope without executing discards the queue.
#[derive(Debug)]
pub struct BatchScope<'a> {
    client: &'a GraphClient,
    queue: Mutex<Vec<BatchOperation>>,
}

impl<'a> BatchScope<'a> {
    pub(crate) fn open(client: &'a GraphClient) -> Result<Self, ApiError> {
        client
            .batch_flag()
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::BatchInProgress)?;

        Ok(Self {
            client,
            queue: Mutex::new(Vec::new()),
        })
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sends the queue as one request and returns one result per operation.
    pub async fn execute(self) -> Result<Vec<BatchResult>, ApiError> {
        self.execute_with(RequestOptions::default()).await
    }

    /// Like [`execute`](Self::execute), with options for the compound request
    /// (for example an API version for the batch endpoint).
    ///
    /// An empty queue returns an empty list without a request. The compound
    /// request uses the first operation's token unless `options` carries one.
    pub async fn execute_with(mut self, options: RequestOptions) -> Result<Vec<BatchResult>, ApiError> {
        let operations = std::mem::take(
            self.queue
                .get_mut()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        let Some(first) = operations.first() else {
            tracing::debug!("Batch is empty, nothing to send");
            return Ok(Vec::new());
        };
        let envelope_token = first.access_token.clone();
        tracing::info!(operations = operations.len(), "Executing batch");

        let mut envelope = Vec::with_capacity(operations.len());
        let mut handlers = Vec::with_capacity(operations.len());
        let mut files = BTreeMap::new();

        for (index, operation) in operations.into_iter().enumerate() {
            let (entry, op_files, handler) = operation.into_parts(index, &envelope_token);
            envelope.push(entry);
            files.extend(op_files);
            handlers.push(handler);
        }

        let mut params = Params::new().with("batch", ParamValue::Text(Value::Array(envelope).to_string()));
        for (name, file) in files {
            params.insert(name, file);
        }

        let mut options = options;
        options.http_component = None;
        if options.access_token.is_none() {
            options.access_token = Some(envelope_token);
        }

        let response = self.client.api("/", params, HttpVerb::Post, &options).await?;
        let slots = batch_slots(response, handlers.len())?;

        Ok(slots
            .into_iter()
            .zip(handlers)
            .map(|(slot, handler)| demultiplex(self.client, slot, handler))
            .collect())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<BatchOperation>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        self.client.batch_flag().store(false, Ordering::Release);
    }
}

#[async_trait]
impl GraphApi for BatchScope<'_> {
    type Output = ();

    async fn dispatch(&self, call: GraphCall) -> Result<(), ApiError> {
        let operation = BatchOperation::new(call, GraphApi::access_token(self.client))?;
        tracing::debug!(verb = %operation.verb, path = %operation.path, "Queued batch operation");
        self.lock().push(operation);
        Ok(())
    }

    fn empty(&self) {}

    fn access_token(&self) -> Option<&str> {
        GraphApi::access_token(self.client)
    }
}

/// Validates the compound response and returns its slots.
fn batch_slots(response: HttpResponse, expected: usize) -> Result<Vec<Value>, ApiError> {
    if let Some(error) =
        ErrorChecker::new(response.status, &response.body, &response.headers).error_if_appropriate()
    {
        return Err(error);
    }

    let message = match decode_body(&response.body) {
        Ok(Value::Array(slots)) if slots.len() == expected => return Ok(slots),
        Ok(Value::Array(slots)) => format!(
            "Batch response has {} results for {} operations",
            slots.len(),
            expected
        ),
        _ => "Batch response is not a JSON array".to_string(),
    };

    tracing::warn!(status = response.status, "{}", message);
    Err(ApiError::BadResponse(ErrorDetails::new(
        Some(response.status),
        response.body,
        ErrorInfo {
            message: Some(message),
            ..Default::default()
        },
    )))
}

/// Turns one slot into that operation's result.
fn demultiplex(client: &GraphClient, slot: Value, handler: SlotHandler) -> BatchResult {
    if slot.is_null() {
        return Ok(GraphResult::Value(Value::Null));
    }

    let result = decode_response(slot_response(&slot), handler.component, handler.check)?;
    let result = GraphCollection::evaluate(result, client);

    match handler.post_process {
        Some(post_process) => post_process(result),
        None => Ok(result),
    }
}

/// Reads `{"code", "headers": [{"name", "value"}], "body"}`.
fn slot_response(slot: &Value) -> HttpResponse {
    let status = slot
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .unwrap_or(200);

    let body = match slot.get("body") {
        Some(Value::String(body)) => body.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let headers: HashMap<String, String> = slot
        .get("headers")
        .and_then(Value::as_array)
        .map(|headers| {
            headers
                .iter()
                .filter_map(|h| {
                    let name = h.get("name")?.as_str()?;
                    let value = h.get("value")?.as_str()?;
                    Some((name.to_string(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    HttpResponse {
        status,
        body,
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FakeTransport;
    use serde_json::json;

    fn client(fake: &FakeTransport) -> GraphClient {
        GraphClient::new(fake.clone()).with_access_token("token")
    }

    fn slot(code: u16, body: Value) -> Value {
        json!({"code": code, "headers": [], "body": body.to_string()})
    }

    fn sent_envelope(fake: &FakeTransport) -> Vec<Value> {
        let request = fake.requests().pop().unwrap();
        serde_json::from_str(request.param("batch").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_order_and_isolation() {
        let fake = FakeTransport::new();
        fake.push_json(json!([
            slot(200, json!({"id": "1"})),
            slot(404, json!({"error": {"message": "Unsupported get request"}})),
            slot(200, json!({"id": "3"})),
        ]));
        let client = client(&fake);

        let batch = client.batch().unwrap();
        for id in ["1", "2", "3"] {
            batch.get_object(id, Params::new(), RequestOptions::default()).await.unwrap();
        }
        assert_eq!(batch.len(), 3);

        let results = batch.execute().await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().to_json(), json!({"id": "1"}));
        assert!(matches!(results[1], Err(ApiError::Client(_))));
        assert_eq!(results[1].as_ref().unwrap_err().http_status(), Some(404));
        assert_eq!(results[2].as_ref().unwrap().to_json(), json!({"id": "3"}));
        assert_eq!(fake.call_count(), 1);

        let request = &fake.requests()[0];
        assert_eq!(request.path, "/");
        assert_eq!(request.param("access_token"), Some("token"));
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let fake = FakeTransport::new();
        let client = client(&fake);
        let results = client.batch().unwrap().execute().await.unwrap();
        assert!(results.is_empty());
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_one_scope_at_a_time() {
        let client = client(&FakeTransport::new());
        let first = client.batch().unwrap();
        assert!(matches!(client.batch(), Err(ApiError::BatchInProgress)));
        assert!(matches!(client.clone().batch(), Err(ApiError::BatchInProgress)));
        drop(first);
        assert!(client.batch().is_ok());
    }

    #[tokio::test]
    async fn test_scope_closes_after_execute() {
        let client = client(&FakeTransport::new());
        client.batch().unwrap().execute().await.unwrap();
        assert!(client.batch().is_ok());
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let fake = FakeTransport::new();
        fake.push_json(json!([null, null, null]));
        let client = client(&fake);

        let batch = client.batch().unwrap();
        batch
            .get_object("me", Params::new().with("fields", "name"), RequestOptions::new().named("me"))
            .await
            .unwrap();
        batch
            .put_connections(
                "me",
                "feed",
                Params::new().with("message", "hi"),
                RequestOptions::new().with_access_token("other").depends_on("me"),
            )
            .await
            .unwrap();
        batch
            .delete_object("/123", RequestOptions::new().omit_response_on_success(false))
            .await
            .unwrap();
        batch.execute().await.unwrap();

        let envelope = sent_envelope(&fake);
        assert_eq!(
            envelope[0],
            json!({"method": "get", "relative_url": "me?fields=name", "name": "me"})
        );
        assert_eq!(
            envelope[1],
            json!({
                "method": "post",
                "relative_url": "me/feed",
                "body": "access_token=other&message=hi",
                "depends_on": "me"
            })
        );
        assert_eq!(
            envelope[2],
            json!({"method": "delete", "relative_url": "123", "omit_response_on_success": false})
        );
    }

    #[tokio::test]
    async fn test_attached_files_are_renamed() {
        let fake = FakeTransport::new();
        fake.push_json(json!([slot(200, json!({"id": "p1"}))]));
        let client = client(&fake);

        let batch = client.batch().unwrap();
        batch
            .put_picture("me", UploadFile::new("cat.png", vec![1, 2]), Params::new(), RequestOptions::default())
            .await
            .unwrap();
        batch.execute().await.unwrap();

        let request = &fake.requests()[0];
        assert!(request.files.contains_key("op0_file0"));
        assert_eq!(sent_envelope(&fake)[0]["attached_files"], "op0_file0");
    }

    #[tokio::test]
    async fn test_operation_requires_token() {
        let fake = FakeTransport::new();
        let client = GraphClient::new(fake.clone());
        let batch = client.batch().unwrap();

        let err = batch
            .get_object("me", Params::new(), RequestOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_compound_failures_fail_whole_batch() {
        for response in [
            HttpResponse::new(502, "Bad Gateway"),
            HttpResponse::new(200, ""),
            HttpResponse::new(200, r#"{"id": "1"}"#),
        ] {
            let fake = FakeTransport::new();
            fake.push(response);
            let client = client(&fake);
            let batch = client.batch().unwrap();
            batch.get_object("me", Params::new(), RequestOptions::default()).await.unwrap();

            let err = batch.execute().await.unwrap_err();
            assert!(err.is_server(), "{err:?}");
        }
    }

    #[tokio::test]
    async fn test_short_response_fails_whole_batch() {
        let fake = FakeTransport::new();
        fake.push_json(json!([slot(200, json!({"id": "1"}))]));
        let client = client(&fake);

        let batch = client.batch().unwrap();
        for id in ["1", "2", "3"] {
            batch.get_object(id, Params::new(), RequestOptions::default()).await.unwrap();
        }

        let err = batch.execute().await.unwrap_err();
        assert!(matches!(err, ApiError::BadResponse(_)), "{err:?}");
        assert!(err.to_string().contains("1 results for 3 operations"), "{err}");
    }

    #[tokio::test]
    async fn test_post_process_and_collections_in_slots() {
        let fake = FakeTransport::new();
        fake.push_json(json!([
            {"code": 302, "headers": [{"name": "Location", "value": "https://cdn/p.jpg"}], "body": null},
            slot(200, json!({"data": [{"id": "f1"}], "paging": {}})),
            null,
        ]));
        let client = client(&fake);

        let batch = client.batch().unwrap();
        batch.get_picture("me", Params::new(), RequestOptions::default()).await.unwrap();
        batch
            .get_connections("me", "friends", Params::new(), RequestOptions::default())
            .await
            .unwrap();
        batch
            .put_like("1", RequestOptions::new().omit_response_on_success(true))
            .await
            .unwrap();

        let results = batch.execute().await.unwrap();
        assert_eq!(results[0].as_ref().unwrap().to_json(), json!("https://cdn/p.jpg"));
        assert_eq!(results[1].as_ref().unwrap().as_collection().unwrap().len(), 1);
        assert!(results[2].as_ref().unwrap().is_null());
    }
}
