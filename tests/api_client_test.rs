// ABOUTME: Integration tests for the authenticated feed API client
// ABOUTME: Verifies headers, query merging, rejection classification and transport failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{api_client, feed_path, fixed_clock, mount_token, token_manager, ACCESS_TOKEN, DIRECTORY_ID};
use o365_feed_poller::errors::{ApiError, FeedError};
use o365_feed_poller::feed::ApiClient;
use o365_feed_poller::utils::http_client::feed_client;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_request_carries_bearer_token_and_publisher_identifier() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .and(header("Authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .and(query_param("PublisherIdentifier", DIRECTORY_ID))
        .and(query_param("extra", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_client(&server, Arc::new(fixed_clock()));
    let url = client.endpoint("subscriptions/list").unwrap();
    let response = client.get(&url, &[("extra", "1")]).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.next_page_uri.is_none());
}

#[tokio::test]
async fn test_next_page_header_exposed() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    let next = format!("{}/next?token=abc", server.uri());
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/content")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("NextPageUri", next.as_str())
                .set_body_json(json!([])),
        )
        .mount(&server)
        .await;

    let client = api_client(&server, Arc::new(fixed_clock()));
    let url = client.endpoint("subscriptions/content").unwrap();
    let response = client.get(&url, &[]).await.unwrap();
    assert_eq!(response.next_page_uri.as_deref(), Some(next.as_str()));
}

#[tokio::test]
async fn test_non_200_is_rejected_with_guidance() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "AF20022", "message": "No subscription found for the specified content type"}
        })))
        .mount(&server)
        .await;

    let client = api_client(&server, Arc::new(fixed_clock()));
    let url = client.endpoint("subscriptions/list").unwrap();
    let err = client.get(&url, &[]).await.unwrap_err();

    match &err {
        FeedError::Api(api @ ApiError::Rejected { status, body_snippet, .. }) => {
            assert_eq!(*status, 400);
            assert!(body_snippet.contains("AF20022"));
            assert!(!api.is_retryable());
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert!(err.to_string().contains("12 hours"));
    assert!(!err.to_string().contains(ACCESS_TOKEN));
}

#[tokio::test]
async fn test_unauthorized_drops_cached_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::token_body(ACCESS_TOKEN)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client = api_client(&server, Arc::new(fixed_clock()));
    let url = client.endpoint("subscriptions/list").unwrap();
    assert!(client.get(&url, &[]).await.is_err());
    assert!(client.get(&url, &[]).await.is_err());
}

#[tokio::test]
async fn test_auth_failure_sends_no_api_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::token_path()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = api_client(&server, Arc::new(fixed_clock()));
    let url = client.endpoint("subscriptions/list").unwrap();
    assert!(matches!(client.get(&url, &[]).await, Err(FeedError::Auth(_))));
}

#[tokio::test]
async fn test_connection_failure_is_retryable_transport_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // nothing listens on port 9 of the loopback interface
    let client = ApiClient::new(
        feed_client(Duration::from_secs(2)),
        token_manager(&server, Arc::new(fixed_clock())),
        "http://127.0.0.1:9/api/v1.0/tenant/activity/feed/",
        DIRECTORY_ID,
    )
    .unwrap();
    let url = client.endpoint("subscriptions/list").unwrap();

    match client.get(&url, &[]).await.unwrap_err() {
        FeedError::Api(err @ ApiError::Transport { .. }) => assert!(err.is_retryable()),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_api_root_is_config_error() {
    let server = MockServer::start().await;
    let result = ApiClient::new(
        feed_client(Duration::from_secs(2)),
        token_manager(&server, Arc::new(fixed_clock())),
        "not a url",
        DIRECTORY_ID,
    );
    assert!(matches!(result, Err(FeedError::Config { .. })));
}
