//
//  graph-client
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Paginated Graph Collections
//!
//! List-valued responses from the Graph API look like this:
//!
//! ```json
//! {
//!   "data": [{"id": "1"}, {"id": "2"}],
//!   "paging": {
//!     "next": "https://graph.facebook.com/v2.8/me/friends?limit=2&after=QVFI",
//!     "previous": "https://graph.facebook.com/v2.8/me/friends?limit=2&before=QVFH"
//!   },
//!   "summary": {"total_count": 120}
//! }
//! ```
//!
//! [`GraphCollection`] wraps one such page. It dereferences to the item slice
//! and can fetch the neighbouring pages through the client that produced it.
//!
//! # Paging Flow
//!
//! | Step | Method |
//! |------|--------|
//! | Read the items of this page | `&collection[..]`, `collection.iter()` |
//! | Inspect the continuation | [`GraphCollection::next_page_params`] |
//! | Fetch the next page | [`GraphCollection::next_page`] |
//! | Fetch the previous page | [`GraphCollection::previous_page`] |
//!
//! A missing `next` or `previous` URL means there is nothing to fetch; the
//! page methods return `Ok(None)` without making a request.
//!
//! # Example
//!
//! ```rust,no_run
//! use graph_client::api::{GraphApi, GraphClient, GraphResult, Params, ReqwestTransport, RequestOptions};
//!
//! # async fn run() -> Result<(), graph_client::api::common::ApiError> {
//! let client = GraphClient::new(ReqwestTransport::new()?).with_access_token("token");
//! let mut page = client
//!     .get_connections("me", "friends", Params::new(), RequestOptions::default())
//!     .await?
//!     .into_collection();
//!
//! while let Some(friends) = page {
//!     for friend in friends.iter() {
//!         println!("{}", friend["name"]);
//!     }
//!     page = friends.next_page(Params::new()).await?.and_then(GraphResult::into_collection);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::ops::Deref;

use serde_json::Value;
use url::Url;

use super::ApiError;
use crate::api::graph::GraphApi;
use crate::api::params::Params;
use crate::api::response::GraphResult;
use crate::api::GraphClient;

/// One page of a list-valued response.
///
/// Only built for bodies that are objects with an array-valued `data` key;
/// see [`GraphCollection::evaluate`].
#[derive(Clone)]
pub struct GraphCollection {
    items: Vec<Value>,
    paging: Option<Value>,
    summary: Option<Value>,
    raw_response: Value,
    client: GraphClient,
}

impl GraphCollection {
    /// Wraps a decoded result when it is list-shaped.
    ///
    /// Anything that is not a pageable [`GraphResult::Value`] is returned
    /// unchanged.
    pub fn evaluate(result: GraphResult, client: &GraphClient) -> GraphResult {
        match result {
            GraphResult::Value(value) if Self::is_pageable(&value) => {
                GraphResult::Collection(Self::new(value, client.clone()))
            }
            other => other,
        }
    }

    /// True for objects carrying an array under `data`.
    pub fn is_pageable(value: &Value) -> bool {
        value.get("data").is_some_and(Value::is_array)
    }

    fn new(raw_response: Value, client: GraphClient) -> Self {
        let items = raw_response
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let paging = raw_response.get("paging").cloned();
        let summary = raw_response.get("summary").cloned();

        Self {
            items,
            paging,
            summary,
            raw_response,
            client,
        }
    }

    /// Items of this page, in response order.
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// The raw `paging` block, if present.
    pub fn paging(&self) -> Option<&Value> {
        self.paging.as_ref()
    }

    /// The raw `summary` block, if present.
    pub fn summary(&self) -> Option<&Value> {
        self.summary.as_ref()
    }

    /// The full decoded response this page was built from.
    pub fn raw_response(&self) -> &Value {
        &self.raw_response
    }

    /// The `(path, params)` to request for the next page, if there is one.
    pub fn next_page_params(&self) -> Option<(String, Params)> {
        self.page_url("next").and_then(Self::parse_page_url)
    }

    /// The `(path, params)` to request for the previous page, if there is one.
    pub fn previous_page_params(&self) -> Option<(String, Params)> {
        self.page_url("previous").and_then(Self::parse_page_url)
    }

    /// Fetches the next page, merging `extra` over the captured parameters.
    ///
    /// Returns `Ok(None)` without a request when there is no next page.
    pub async fn next_page(&self, extra: Params) -> Result<Option<GraphResult>, ApiError> {
        self.fetch(self.next_page_params(), extra).await
    }

    /// Fetches the previous page, merging `extra` over the captured parameters.
    ///
    /// Returns `Ok(None)` without a request when there is no previous page.
    pub async fn previous_page(&self, extra: Params) -> Result<Option<GraphResult>, ApiError> {
        self.fetch(self.previous_page_params(), extra).await
    }

    /// Splits a paging URL into a relative path and its query parameters.
    ///
    /// Only the leading slash is dropped. A `vN[.N]` segment stays in the
    /// path, so the page is requested under the version the cursor was issued
    /// for. Repeated query keys are joined with commas.
    ///
    /// ```rust
    /// use graph_client::api::common::GraphCollection;
    ///
    /// let (path, params) = GraphCollection::parse_page_url(
    ///     "https://graph.facebook.com/v2.8/me/feed?limit=25&fields=id&fields=name",
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(path, "v2.8/me/feed");
    /// assert_eq!(params.encode(), "fields=id%2Cname&limit=25");
    /// ```
    pub fn parse_page_url(url: &str) -> Option<(String, Params)> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(url, "Ignoring unparseable paging URL: {}", e);
                return None;
            }
        };

        let path = parsed.path().trim_start_matches('/').to_string();

        let mut params = Params::new();
        for (key, value) in parsed.query_pairs() {
            let joined = match params.get(&key).and_then(|v| v.as_str()) {
                Some(existing) => format!("{existing},{value}"),
                None => value.into_owned(),
            };
            params.insert(key.into_owned(), joined);
        }

        Some((path, params))
    }

    fn page_url(&self, direction: &str) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|paging| paging.get(direction))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    async fn fetch(
        &self,
        target: Option<(String, Params)>,
        extra: Params,
    ) -> Result<Option<GraphResult>, ApiError> {
        let Some((path, params)) = target else {
            return Ok(None);
        };
        self.client.get_page(&path, params.merge(extra)).await.map(Some)
    }
}

impl Deref for GraphCollection {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.items
    }
}

impl<'a> IntoIterator for &'a GraphCollection {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Debug for GraphCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphCollection")
            .field("items", &self.items)
            .field("paging", &self.paging)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FakeTransport;
    use crate::config::{Endpoints, ServerConfig};
    use serde_json::json;

    fn collection(fake: &FakeTransport, body: Value) -> GraphCollection {
        let client = GraphClient::new(fake.clone());
        GraphCollection::evaluate(GraphResult::Value(body), &client)
            .into_collection()
            .unwrap()
    }

    #[test]
    fn test_only_data_arrays_are_pageable() {
        assert!(GraphCollection::is_pageable(&json!({"data": []})));
        assert!(!GraphCollection::is_pageable(&json!({"data": {"id": 1}})));
        assert!(!GraphCollection::is_pageable(&json!([1, 2])));
        assert!(!GraphCollection::is_pageable(&json!({"id": "1"})));
    }

    #[test]
    fn test_non_pageable_passes_through() {
        let client = GraphClient::new(FakeTransport::new());
        let result = GraphCollection::evaluate(GraphResult::Value(json!({"id": "1"})), &client);
        assert_eq!(result.as_value(), Some(&json!({"id": "1"})));
    }

    #[test]
    fn test_accessors() {
        let c = collection(
            &FakeTransport::new(),
            json!({"data": [1, 2, 3], "summary": {"total_count": 3}}),
        );
        assert_eq!(c.len(), 3);
        assert_eq!(c.iter().filter(|v| v.as_i64() > Some(1)).count(), 2);
        assert_eq!(c.summary(), Some(&json!({"total_count": 3})));
        assert!(c.paging().is_none());
        assert!(c.next_page_params().is_none());
    }

    #[tokio::test]
    async fn test_next_page_round_trip() {
        let fake = FakeTransport::new();
        let c = collection(&fake, json!({"data": [], "paging": {"next": "http://x/abc?a=2&b=3"}}));

        let (path, params) = c.next_page_params().unwrap();
        assert_eq!(path, "abc");
        assert_eq!(params, Params::new().with("a", "2").with("b", "3"));

        fake.push_json(json!({"data": [{"id": "9"}]}));
        let next = c.next_page(Params::new()).await.unwrap().unwrap();
        assert_eq!(next.as_collection().unwrap()[0]["id"], "9");

        let request = &fake.requests()[0];
        assert_eq!(request.path, "/abc");
        assert_eq!(request.param("a"), Some("2"));
        assert_eq!(request.param("b"), Some("3"));

        assert!(c.previous_page(Params::new()).await.unwrap().is_none());
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_extra_params_merge_over_captured() {
        let fake = FakeTransport::new();
        let c = collection(
            &fake,
            json!({"data": [], "paging": {"previous": "https://graph.facebook.com/v2.8/me/feed?since=1&limit=5"}}),
        );

        fake.push_json(json!({"id": "not a page"}));
        let page = c.previous_page(Params::new().with("since", "100")).await.unwrap().unwrap();
        assert!(page.as_value().is_some());

        let request = &fake.requests()[0];
        assert_eq!(request.path, "/v2.8/me/feed");
        assert_eq!(request.param("since"), Some("100"));
        assert_eq!(request.param("limit"), Some("5"));
    }

    #[tokio::test]
    async fn test_page_keeps_version_from_paging_url() {
        let fake = FakeTransport::new();
        let c = collection(
            &fake,
            json!({"data": [], "paging": {"next": "https://graph.facebook.com/v2.8/me/feed?after=X"}}),
        );

        fake.push_json(json!({"data": []}));
        c.next_page(Params::new()).await.unwrap();
        assert_eq!(fake.requests()[0].path, "/v2.8/me/feed");

        // A configured version never replaces the one the cursor was issued under.
        let versioned = GraphClient::new(fake.clone()).with_endpoints(
            Endpoints::from_config(&ServerConfig {
                api_version: Some("v3.0".into()),
                ..Default::default()
            })
            .unwrap(),
        );
        let c = GraphCollection::evaluate(
            GraphResult::Value(json!({"data": [], "paging": {"next": "https://graph.facebook.com/v2.8/me/feed?after=Y"}})),
            &versioned,
        )
        .into_collection()
        .unwrap();

        fake.push_json(json!({"data": []}));
        c.next_page(Params::new()).await.unwrap();
        assert_eq!(fake.requests()[1].path, "/v2.8/me/feed");
        assert_eq!(fake.requests()[1].param("after"), Some("Y"));
    }

    #[tokio::test]
    async fn test_page_keeps_captured_token() {
        let fake = FakeTransport::new();
        let client = GraphClient::new(fake.clone()).with_access_token("client");
        let result = GraphCollection::evaluate(
            GraphResult::Value(json!({"data": [], "paging": {"next": "https://graph.facebook.com/me/feed?access_token=page"}})),
            &client,
        );

        fake.push_json(json!({"data": []}));
        result.as_collection().unwrap().next_page(Params::new()).await.unwrap();
        assert_eq!(fake.requests()[0].param("access_token"), Some("page"));

        fake.push_json(json!({"data": []}));
        client.get_page("me/feed", Params::new()).await.unwrap();
        assert_eq!(fake.requests()[1].param("access_token"), Some("client"));
    }

    #[test]
    fn test_bad_url_is_ignored() {
        assert!(GraphCollection::parse_page_url("not a url").is_none());
    }
}
