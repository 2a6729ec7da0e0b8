//
//  graph-client
//  tests/http_client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! End-to-end tests of the reqwest transport against a mock server.

use graph_client::api::{ApiError, GraphApi, GraphClient, GraphResult, Params, ReqwestTransport, RequestOptions};
use graph_client::config::{Endpoints, ServerConfig};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

fn client_for(server: &ServerGuard, api_version: Option<&str>) -> GraphClient {
    let config = ServerConfig {
        graph_server: server.host_with_port(),
        rest_server: server.host_with_port(),
        api_version: api_version.map(String::from),
        use_ssl: false,
        ..Default::default()
    };
    let endpoints = Endpoints::from_config(&config).unwrap();
    GraphClient::new(ReqwestTransport::new().unwrap())
        .with_endpoints(endpoints)
        .with_access_token("tok")
}

#[tokio::test]
async fn test_get_object_sends_token_and_decodes() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/me")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("access_token".into(), "tok".into()),
            Matcher::UrlEncoded("fields".into(), "id,name".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "4", "name": "Mark"}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let result = client
        .get_object("me", Params::new().with("fields", "id,name"), RequestOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.to_json(), json!({"id": "4", "name": "Mark"}));
}

#[tokio::test]
async fn test_version_prefix_and_paging() {
    let mut server = Server::new_async().await;
    let next = format!("http://{}/v2.8/me/friends?limit=1&after=abc", server.host_with_port());

    let first = server
        .mock("GET", "/v2.8/me/friends")
        .match_query(Matcher::Exact("access_token=tok&limit=1".into()))
        .with_status(200)
        .with_body(json!({"data": [{"id": "1"}], "paging": {"next": next}}).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v2.8/me/friends")
        .match_query(Matcher::Exact("access_token=tok&after=abc&limit=1".into()))
        .with_status(200)
        .with_body(r#"{"data": [{"id": "2"}], "paging": {}}"#)
        .create_async()
        .await;

    let client = client_for(&server, Some("v2.8"));
    let page = client
        .get_connections("me", "friends", Params::new().with("limit", 1), RequestOptions::default())
        .await
        .unwrap()
        .into_collection()
        .unwrap();
    assert_eq!(page.items()[0]["id"], "1");

    let next_page = page.next_page(Params::new()).await.unwrap().unwrap();
    let next_page = next_page.into_collection().unwrap();
    assert_eq!(next_page.items()[0]["id"], "2");
    assert!(next_page.next_page(Params::new()).await.unwrap().is_none());

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_expired_token_is_authentication_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/me")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("x-fb-trace-id", "trace-1")
        .with_body(r#"{"error": {"type": "OAuthException", "code": 190, "message": "Session has expired"}}"#)
        .create_async()
        .await;

    let error = client_for(&server, None)
        .get_object("me", Params::new(), RequestOptions::default())
        .await
        .unwrap_err();

    assert!(error.is_authentication());
    assert_eq!(error.http_status(), Some(400));
    let info = error.info().unwrap();
    assert_eq!(info.code, Some(190));
    assert_eq!(info.fbtrace_id.as_deref(), Some("trace-1"));
}

#[tokio::test]
async fn test_missing_object_is_client_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/nope")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(r#"{"error": {"type": "GraphMethodException", "code": 100, "message": "Unsupported get request"}}"#)
        .create_async()
        .await;

    let error = client_for(&server, None)
        .get_object("nope", Params::new(), RequestOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Client(_)));
    assert_eq!(error.http_status(), Some(404));
    assert!(error.response_body().unwrap().contains("Unsupported get request"));
}

#[tokio::test]
async fn test_server_error_and_bad_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/down")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;
    server
        .mock("GET", "/garbled")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>")
        .create_async()
        .await;

    let client = client_for(&server, None);
    let down = client
        .get_object("down", Params::new(), RequestOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(down, ApiError::Server(_)));

    let garbled = client
        .get_object("garbled", Params::new(), RequestOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(garbled, ApiError::BadResponse(_)));
    assert!(garbled.is_server());
}

#[tokio::test]
async fn test_delete_is_tunneled_through_post() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/123_456")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("method".into(), "delete".into()),
            Matcher::UrlEncoded("access_token".into(), "tok".into()),
        ]))
        .with_status(200)
        .with_body("true")
        .create_async()
        .await;

    let result = client_for(&server, None)
        .delete_object("123_456", RequestOptions::default())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.to_json(), json!(true));
}

#[tokio::test]
async fn test_picture_reads_redirect_location() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/4/picture")
        .match_query(Matcher::UrlEncoded("type".into(), "large".into()))
        .with_status(302)
        .with_header("Location", "https://cdn.example.com/4.jpg")
        .create_async()
        .await;

    let result = client_for(&server, None)
        .get_picture("4", Params::new().with("type", "large"), RequestOptions::default())
        .await
        .unwrap();

    assert_eq!(result.to_json(), json!("https://cdn.example.com/4.jpg"));
}

#[tokio::test]
async fn test_rest_error_code_in_success_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/method/users.getInfo")
        .match_query(Matcher::UrlEncoded("format".into(), "json".into()))
        .with_status(200)
        .with_body(r#"{"error_code": 100, "error_msg": "Invalid parameter"}"#)
        .create_async()
        .await;

    let error = client_for(&server, Some("v2.8"))
        .rest_call(
            "users.getInfo",
            Params::new(),
            graph_client::api::HttpVerb::Get,
            RequestOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Client(_)));
    assert_eq!(error.info().unwrap().code, Some(100));
}

#[tokio::test]
async fn test_batch_round_trip() {
    let mut server = Server::new_async().await;
    let slots = json!([
        {"code": 200, "headers": [{"name": "Content-Type", "value": "application/json"}], "body": "{\"id\": \"4\"}"},
        {"code": 400, "body": "{\"error\": {\"type\": \"GraphMethodException\", \"code\": 100, \"message\": \"bad\"}}"},
        null
    ]);
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("access_token".into(), "tok".into()),
            Matcher::Regex("batch=".into()),
        ]))
        .with_status(200)
        .with_body(slots.to_string())
        .create_async()
        .await;

    let client = client_for(&server, None);
    let batch = client.batch().unwrap();
    batch.get_object("4", Params::new(), RequestOptions::default()).await.unwrap();
    batch.get_object("bad", Params::new(), RequestOptions::default()).await.unwrap();
    batch
        .put_like("123", RequestOptions::default().omit_response_on_success(true))
        .await
        .unwrap();
    let results = batch.execute().await.unwrap();

    mock.assert_async().await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().to_json(), json!({"id": "4"}));
    assert!(matches!(results[1], Err(ApiError::Client(_))));
    assert!(matches!(results[2], Ok(GraphResult::Value(serde_json::Value::Null))));

    // The flag is released once the scope is consumed.
    assert!(client.batch().is_ok());
}

#[tokio::test]
async fn test_batch_envelope_failure_fails_whole_batch() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(400)
        .with_body(r#"{"error": {"type": "GraphBatchException", "message": "Too many requests in batch"}}"#)
        .create_async()
        .await;

    let client = client_for(&server, None);
    let batch = client.batch().unwrap();
    batch.get_object("me", Params::new(), RequestOptions::default()).await.unwrap();

    let error = batch.execute().await.unwrap_err();
    assert!(matches!(error, ApiError::Client(_)));
}
