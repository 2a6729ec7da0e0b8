//
//  graph-client
//  api/graph.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph Operations
//!
//! The [`GraphApi`] trait is the operation surface of the client. Every
//! operation is a provided method that shapes a [`GraphCall`] and hands it to
//! [`GraphApi::dispatch`]. Implementors only decide how a call is dispatched:
//!
//! | Implementor | Dispatch | `Output` |
//! |-------------|----------|----------|
//! | [`GraphClient`](super::GraphClient) | one HTTP round-trip per call | [`GraphResult`] |
//! | [`BatchScope`](super::BatchScope) | queued until `execute` | `()` |
//!
//! ## Operations
//!
//! | Operation | Verb | Path | Token required |
//! |-----------|------|------|----------------|
//! | `get_object` | GET | `id` | no |
//! | `get_objects` | GET | `/?ids=a,b` | no |
//! | `get_connections` | GET | `id/connection` | no |
//! | `search` | GET | `search?q=...` | no |
//! | `get_picture` | GET | `id/picture` (Location header) | no |
//! | `put_object` | POST | `id` | yes |
//! | `put_connections` | POST | `id/connection` | yes |
//! | `delete_object` | DELETE | `id` | yes |
//! | `delete_connections` | DELETE | `id/connection` | yes |
//! | `rest_call` | any | `method/name` on the REST host | no |
//!
//! Write operations fail with [`ApiError::Authentication`] before any request
//! is made when neither the client nor the call options carry a token.
//!
//! ## Example
//!
//! ```rust,no_run
//! use graph_client::api::{GraphApi, GraphClient, Params, ReqwestTransport, RequestOptions};
//!
//! # async fn run() -> Result<(), graph_client::api::common::ApiError> {
//! let client = GraphClient::new(ReqwestTransport::new()?).with_access_token("token");
//!
//! let me = client.get_object("me", Params::new(), RequestOptions::default()).await?;
//! let friends = client
//!     .get_connections("me", "friends", Params::new().with("limit", 10), RequestOptions::default())
//!     .await?;
//! client.put_wall_post("Hello", Params::new(), "me", RequestOptions::default()).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::common::{parse_error_info, ApiError, ErrorDetails};
use super::params::{Params, UploadFile};
use super::request::{HttpComponent, HttpVerb, RequestOptions};
use super::response::{find_header, GraphResult, ResponseCheck};

/// Transform applied to a call's result once it is available.
///
/// In batch mode it runs when the batch is executed, and only for slots that
/// did not fail.
pub type PostProcess = Box<dyn FnOnce(GraphResult) -> Result<GraphResult, ApiError> + Send>;

/// One logical call, before dispatch.
pub struct GraphCall {
    /// Relative path, with or without a leading slash.
    pub path: String,
    pub params: Params,
    pub verb: HttpVerb,
    pub options: RequestOptions,
    /// Extra validation of the decoded body.
    pub check: Option<ResponseCheck>,
    /// Shaping applied to the decoded result.
    pub post_process: Option<PostProcess>,
}

impl GraphCall {
    pub fn new(path: impl Into<String>, params: Params, verb: HttpVerb, options: RequestOptions) -> Self {
        Self {
            path: path.into(),
            params,
            verb,
            options,
            check: None,
            post_process: None,
        }
    }

    /// Adds a validation hook.
    pub fn with_check(mut self, check: ResponseCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// Adds a post-processing step.
    pub fn then<F>(mut self, f: F) -> Self
    where
        F: FnOnce(GraphResult) -> Result<GraphResult, ApiError> + Send + 'static,
    {
        self.post_process = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for GraphCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCall")
            .field("path", &self.path)
            .field("params", &self.params.keys().collect::<Vec<_>>())
            .field("verb", &self.verb)
            .field("options", &self.options)
            .field("check", &self.check.is_some())
            .field("post_process", &self.post_process.is_some())
            .finish()
    }
}

/// The Graph API operation surface.
///
/// Implementors provide [`dispatch`](Self::dispatch), [`empty`](Self::empty)
/// and [`access_token`](Self::access_token); every operation is built on
/// those three.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// What a dispatched call returns.
    type Output: Send;

    /// Dispatches one call.
    async fn dispatch(&self, call: GraphCall) -> Result<Self::Output, ApiError>;

    /// The output for a call that needs no request at all.
    fn empty(&self) -> Self::Output;

    /// The token used when a call does not carry its own.
    fn access_token(&self) -> Option<&str>;

    /// Fails with a local authentication error when no token is available.
    fn require_token(&self, options: &RequestOptions) -> Result<(), ApiError> {
        let has_token = options.access_token.as_deref().is_some_and(|t| !t.is_empty())
            || self.access_token().is_some_and(|t| !t.is_empty());
        if has_token {
            Ok(())
        } else {
            Err(ApiError::Authentication(ErrorDetails::local(
                "Write operations require an access token",
            )))
        }
    }

    /// Fetches one object by id.
    async fn get_object(
        &self,
        id: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        self.dispatch(GraphCall::new(id, params, HttpVerb::Get, options)).await
    }

    /// Fetches several objects in one request, keyed by id in the response.
    ///
    /// An empty id list returns [`empty`](Self::empty) without a request.
    async fn get_objects(
        &self,
        ids: &[&str],
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        if ids.is_empty() {
            return Ok(self.empty());
        }
        let params = params.with("ids", ids.join(","));
        self.dispatch(GraphCall::new("", params, HttpVerb::Get, options)).await
    }

    /// Fetches an object together with its introspection metadata.
    async fn get_object_metadata(
        &self,
        id: &str,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        self.get_object(id, Params::new().with("metadata", "1"), options).await
    }

    /// Fetches a connection (edge) of an object.
    async fn get_connections(
        &self,
        id: &str,
        connection: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let path = connection_path(id, connection);
        self.dispatch(GraphCall::new(path, params, HttpVerb::Get, options)).await
    }

    /// Replays a captured `(path, params)` pair, as used for paging.
    async fn get_page(&self, path: &str, params: Params) -> Result<Self::Output, ApiError> {
        self.dispatch(GraphCall::new(path, params, HttpVerb::Get, RequestOptions::default()))
            .await
    }

    /// Updates an object.
    async fn put_object(
        &self,
        id: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        self.require_token(&options)?;
        self.dispatch(GraphCall::new(id, params, HttpVerb::Post, options)).await
    }

    /// Creates an object on a connection, e.g. a post on `me/feed`.
    async fn put_connections(
        &self,
        id: &str,
        connection: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        self.require_token(&options)?;
        let path = connection_path(id, connection);
        self.dispatch(GraphCall::new(path, params, HttpVerb::Post, options)).await
    }

    /// Deletes an object.
    ///
    /// The service usually answers with a bare `true`.
    async fn delete_object(&self, id: &str, options: RequestOptions) -> Result<Self::Output, ApiError> {
        self.require_token(&options)?;
        self.dispatch(GraphCall::new(id, Params::new(), HttpVerb::Delete, options)).await
    }

    /// Deletes from a connection, e.g. a like.
    async fn delete_connections(
        &self,
        id: &str,
        connection: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        self.require_token(&options)?;
        let path = connection_path(id, connection);
        self.dispatch(GraphCall::new(path, params, HttpVerb::Delete, options)).await
    }

    /// Posts a message to a profile's feed.
    ///
    /// `attachment` carries optional `link`, `name`, `caption` and similar
    /// fields.
    async fn put_wall_post(
        &self,
        message: &str,
        attachment: Params,
        profile_id: &str,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = attachment.with("message", message);
        self.put_connections(profile_id, "feed", params, options).await
    }

    async fn put_comment(
        &self,
        id: &str,
        message: &str,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = Params::new().with("message", message);
        self.put_connections(id, "comments", params, options).await
    }

    async fn put_like(&self, id: &str, options: RequestOptions) -> Result<Self::Output, ApiError> {
        self.put_connections(id, "likes", Params::new(), options).await
    }

    async fn delete_like(&self, id: &str, options: RequestOptions) -> Result<Self::Output, ApiError> {
        self.delete_connections(id, "likes", Params::new(), options).await
    }

    /// Uploads a photo to `target_id/photos`.
    async fn put_picture(
        &self,
        target_id: &str,
        picture: UploadFile,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = params.with("source", picture);
        self.put_connections(target_id, "photos", params, options).await
    }

    /// Uploads a video to `target_id/videos` through the video host.
    async fn put_video(
        &self,
        target_id: &str,
        video: UploadFile,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = params.with("source", video);
        self.put_connections(target_id, "videos", params, options.video()).await
    }

    /// Searches the graph. `params` usually carries a `type`.
    async fn search(
        &self,
        query: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = params.with("q", query);
        self.dispatch(GraphCall::new("search", params, HttpVerb::Get, options)).await
    }

    /// Resolves the image URL of an object's picture.
    ///
    /// The service redirects to the image, so the URL is read from the
    /// `Location` header. The result is a string value, or `null` when the
    /// header is missing.
    async fn get_picture(
        &self,
        id: &str,
        params: Params,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let options = options.with_component(HttpComponent::Headers);
        let call = GraphCall::new(connection_path(id, "picture"), params, HttpVerb::Get, options)
            .then(|result| {
                let location = match &result {
                    GraphResult::Headers(headers) => find_header(headers, "location"),
                    GraphResult::Response(response) => response.header("location"),
                    _ => None,
                };
                Ok(location.map_or(Value::Null, |l| Value::String(l.to_string())).into())
            });
        self.dispatch(call).await
    }

    /// Fetches the page token for a page the current user manages.
    async fn get_page_access_token(
        &self,
        id: &str,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = Params::new().with("fields", "access_token");
        let call = GraphCall::new(id, params, HttpVerb::Get, options)
            .then(|result| Ok(result.get("access_token").cloned().unwrap_or(Value::Null).into()));
        self.dispatch(call).await
    }

    /// Inspects a token: its app, user, scopes and expiry.
    async fn debug_token(
        &self,
        input_token: &str,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = Params::new().with("input_token", input_token);
        self.dispatch(GraphCall::new("debug_token", params, HttpVerb::Get, options))
            .await
    }

    /// Fetches the comments attached to external URLs.
    async fn get_comments_for_urls(
        &self,
        urls: &[&str],
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        if urls.is_empty() {
            return Ok(self.empty());
        }
        let params = Params::new().with("ids", urls.join(","));
        self.get_connections("", "comments", params, options).await
    }

    /// Runs one FQL query.
    async fn fql_query(&self, query: &str, options: RequestOptions) -> Result<Self::Output, ApiError> {
        let params = Params::new().with("q", query);
        self.get_object("fql", params, options).await
    }

    /// Runs several named FQL queries in one request.
    ///
    /// The result maps each query name to its result set.
    async fn fql_multiquery(
        &self,
        queries: &BTreeMap<String, String>,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let q: Map<String, Value> = queries
            .iter()
            .map(|(name, query)| (name.clone(), Value::from(query.as_str())))
            .collect();
        let q = Value::Object(q);
        let call = GraphCall::new("fql", Params::new().with("q", q), HttpVerb::Get, options)
            .then(|result| Ok(rekey_multiquery(&result).into()));
        self.dispatch(call).await
    }

    /// Calls a legacy REST method.
    ///
    /// REST methods live on the REST host, take `format=json`, and report
    /// failures as `200` bodies carrying an `error_code`.
    async fn rest_call(
        &self,
        method: &str,
        params: Params,
        verb: HttpVerb,
        options: RequestOptions,
    ) -> Result<Self::Output, ApiError> {
        let params = params.with("format", "json");
        let call = GraphCall::new(format!("method/{method}"), params, verb, options.rest_api())
            .with_check(rest_error);
        self.dispatch(call).await
    }
}

/// Joins an id and a connection name.
///
/// An empty id addresses a root connection such as `/comments`.
pub fn connection_path(id: &str, connection: &str) -> String {
    format!("{id}/{connection}")
}

/// Reports REST bodies of the form `{"error_code": ..., "error_msg": ...}`.
fn rest_error(body: &Value) -> Option<ApiError> {
    body.get("error_code")?;
    let info = parse_error_info(body);
    Some(ApiError::Client(ErrorDetails::new(None, body.to_string(), info)))
}

fn rekey_multiquery(result: &GraphResult) -> Value {
    let rows: &[Value] = match result {
        GraphResult::Collection(collection) => collection.items(),
        GraphResult::Value(Value::Array(rows)) => rows.as_slice(),
        GraphResult::Value(value) => match value.get("data") {
            Some(Value::Array(rows)) => rows.as_slice(),
            _ => &[],
        },
        _ => &[],
    };

    let mut by_name = Map::new();
    for row in rows {
        if let Some(name) = row.get("name").and_then(Value::as_str) {
            let set = row.get("fql_result_set").cloned().unwrap_or(Value::Null);
            by_name.insert(name.to_string(), set);
        }
    }
    Value::Object(by_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FakeTransport, GraphClient, HttpResponse};
    use serde_json::json;

    fn client(fake: &FakeTransport) -> GraphClient {
        GraphClient::new(fake.clone()).with_access_token("token")
    }

    #[tokio::test]
    async fn test_get_objects_empty_makes_no_request() {
        let fake = FakeTransport::new();
        let result = client(&fake)
            .get_objects(&[], Params::new(), RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(result.to_json(), json!({}));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_get_objects_joins_ids() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"1": {"id": "1"}, "2": {"id": "2"}}));
        client(&fake)
            .get_objects(&["1", "2"], Params::new(), RequestOptions::default())
            .await
            .unwrap();
        let request = &fake.requests()[0];
        assert_eq!(request.path, "/");
        assert_eq!(request.param("ids"), Some("1,2"));
    }

    #[tokio::test]
    async fn test_write_without_token_fails_closed() {
        let fake = FakeTransport::new();
        let client = GraphClient::new(fake.clone());

        let err = client
            .put_wall_post("hi", Params::new(), "me", RequestOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.http_status(), None);

        assert!(client.delete_object("1", RequestOptions::default()).await.is_err());
        assert!(client.put_like("1", RequestOptions::default()).await.is_err());
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_write_with_call_token() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(200, "true"));
        let client = GraphClient::new(fake.clone());

        let result = client
            .delete_object("1", RequestOptions::new().with_access_token("call"))
            .await
            .unwrap();
        assert_eq!(result.to_json(), json!(true));

        let request = &fake.requests()[0];
        assert_eq!(request.param("access_token"), Some("call"));
        assert_eq!(request.param("method"), Some("delete"));
    }

    #[tokio::test]
    async fn test_search_path() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"data": []}));
        client(&fake)
            .search("coffee", Params::new().with("type", "place"), RequestOptions::default())
            .await
            .unwrap();
        let request = &fake.requests()[0];
        assert_eq!(request.path, "/search");
        assert_eq!(request.param("q"), Some("coffee"));
        assert_eq!(request.param("type"), Some("place"));
    }

    #[tokio::test]
    async fn test_get_picture_reads_location() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(302, "").with_header("Location", "https://cdn/x.jpg"));
        fake.push(HttpResponse::new(200, ""));
        let client = client(&fake);

        let url = client
            .get_picture("4", Params::new().with("type", "large"), RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(url.to_json(), json!("https://cdn/x.jpg"));
        assert_eq!(fake.requests()[0].path, "/4/picture");

        let missing = client
            .get_picture("4", Params::new(), RequestOptions::default())
            .await
            .unwrap();
        assert!(missing.is_null());
    }

    #[tokio::test]
    async fn test_page_access_token() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"id": "9", "access_token": "page-token"}));
        let token = client(&fake)
            .get_page_access_token("9", RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(token.to_json(), json!("page-token"));
        assert_eq!(fake.requests()[0].param("fields"), Some("access_token"));
    }

    #[tokio::test]
    async fn test_put_video_uses_video_host() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"id": "v1"}));
        client(&fake)
            .put_video("me", UploadFile::new("clip.mp4", vec![0, 1]), Params::new(), RequestOptions::default())
            .await
            .unwrap();
        let request = &fake.requests()[0];
        assert_eq!(request.url, "https://graph-video.facebook.com/me/videos");
        assert!(request.files.contains_key("source"));
    }

    #[tokio::test]
    async fn test_fql_multiquery_rekeys() {
        let fake = FakeTransport::new();
        fake.push_json(json!({"data": [
            {"name": "me", "fql_result_set": [{"uid": 1}]},
            {"name": "friends", "fql_result_set": []}
        ]}));
        let mut queries = BTreeMap::new();
        queries.insert("me".to_string(), "select uid from user where uid = me()".to_string());
        queries.insert("friends".to_string(), "select uid2 from friend where uid1 = me()".to_string());

        let result = client(&fake)
            .fql_multiquery(&queries, RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(result.to_json(), json!({"me": [{"uid": 1}], "friends": []}));
        let sent: Value = serde_json::from_str(fake.requests()[0].param("q").unwrap()).unwrap();
        assert_eq!(sent["friends"], "select uid2 from friend where uid1 = me()");
        assert_eq!(sent.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rest_call_error_code() {
        let fake = FakeTransport::new();
        fake.push(HttpResponse::new(200, r#"{"error_code": 100, "error_msg": "Invalid parameter"}"#));
        let err = client(&fake)
            .rest_call("users.getInfo", Params::new(), HttpVerb::Get, RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Client(_)));
        assert_eq!(err.info().unwrap().code, Some(100));

        let request = &fake.requests()[0];
        assert_eq!(request.url, "https://api.facebook.com/method/users.getInfo");
        assert_eq!(request.param("format"), Some("json"));
    }

    #[test]
    fn test_connection_path() {
        assert_eq!(connection_path("me", "friends"), "me/friends");
        assert_eq!(connection_path("", "comments"), "/comments");
    }
}
