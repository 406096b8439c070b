// ABOUTME: Integration tests for subscription reconciliation at startup
// ABOUTME: Starts disabled and missing content types while leaving enabled ones alone
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use common::{api_client, feed_path, fixed_clock, mount_token};
use o365_feed_poller::feed::SubscriptionManager;
use o365_feed_poller::models::SubscriptionStatus;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"contentType": "Audit.Exchange", "status": "enabled", "webhook": null},
            {"contentType": "Audit.SharePoint", "status": "disabled", "webhook": null}
        ])))
        .mount(server)
        .await;
}

async fn mount_start(server: &MockServer, content_type: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(feed_path("subscriptions/start")))
        .and(query_param("contentType", content_type))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contentType": content_type,
            "status": "enabled",
            "webhook": null
        })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_decodes_subscriptions() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_listing(&server).await;

    let manager = SubscriptionManager::new(api_client(&server, Arc::new(fixed_clock())));
    let subscriptions = manager.list().await.unwrap();

    assert_eq!(subscriptions.len(), 2);
    assert_eq!(subscriptions[0].status, SubscriptionStatus::Enabled);
    assert_eq!(subscriptions[1].status, SubscriptionStatus::Disabled);
}

#[tokio::test]
async fn test_ensure_starts_disabled_and_missing_types() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_listing(&server).await;
    mount_start(&server, "Audit.Exchange", 0).await;
    mount_start(&server, "Audit.SharePoint", 1).await;
    mount_start(&server, "Audit.General", 1).await;

    let manager = SubscriptionManager::new(api_client(&server, Arc::new(fixed_clock())));
    let configured = vec![
        "Audit.Exchange".to_owned(),
        "Audit.SharePoint".to_owned(),
        "Audit.General".to_owned(),
    ];
    let started = manager.ensure(&configured).await.unwrap();

    assert_eq!(started, vec!["Audit.SharePoint", "Audit.General"]);
}

#[tokio::test]
async fn test_ensure_is_idempotent_when_all_enabled() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"contentType": "Audit.General", "status": "enabled"}
        ])))
        .expect(2)
        .mount(&server)
        .await;
    mount_start(&server, "Audit.General", 0).await;

    let manager = SubscriptionManager::new(api_client(&server, Arc::new(fixed_clock())));
    let configured = vec!["Audit.General".to_owned()];
    assert!(manager.ensure(&configured).await.unwrap().is_empty());
    assert!(manager.ensure(&configured).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_failure_surfaces() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path(feed_path("subscriptions/list")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(feed_path("subscriptions/start")))
        .respond_with(ResponseTemplate::new(403).set_body_string("tenant not provisioned"))
        .mount(&server)
        .await;

    let manager = SubscriptionManager::new(api_client(&server, Arc::new(fixed_clock())));
    let err = manager.ensure(&["DLP.All".to_owned()]).await.unwrap_err();
    assert!(err.to_string().contains("403"));
}
