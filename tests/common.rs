// ABOUTME: Shared test utilities for feed poller integration tests
// ABOUTME: Mock feed server mounting, fixed clock, component wiring and a recording event sink
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `o365_feed_poller`

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use o365_feed_poller::{
    checkpoint::CheckpointStore,
    config::PollerConfig,
    errors::{FeedError, FeedResult},
    feed::{ApiClient, ContentFetcher, ContentLister},
    models::PublishedEvent,
    oauth2_client::{ClientCredentials, TokenManager},
    poller::PollCycle,
    sink::EventSink,
    utils::http_client::feed_client,
    Clock, FixedClock,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT_DOMAIN: &str = "contoso.onmicrosoft.com";
pub const DIRECTORY_ID: &str = "dir-0000-1111";
pub const CLIENT_ID: &str = "app-client-id";
pub const CLIENT_SECRET: &str = "app-client-secret-value";
pub const ACCESS_TOKEN: &str = "eyJ0eXAiOiJKV1QiLCJhbGciOi.test-token";

/// Instant every fixed clock starts at
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()
}

pub fn fixed_clock() -> FixedClock {
    FixedClock::new(test_now())
}

/// Token endpoint path on the mock server
pub fn token_path() -> String {
    format!("/{TENANT_DOMAIN}/oauth2/token")
}

/// Path below the feed root on the mock server
pub fn feed_path(suffix: &str) -> String {
    format!("/api/v1.0/{DIRECTORY_ID}/activity/feed/{suffix}")
}

/// Token body valid for an hour after `test_now`
pub fn token_body(value: &str) -> Value {
    let issued = test_now().timestamp();
    json!({
        "token_type": "Bearer",
        "expires_in": "3599",
        "not_before": issued.to_string(),
        "expires_on": (issued + 3600).to_string(),
        "resource": "https://manage.office.com",
        "access_token": value
    })
}

/// Mount a token endpoint answering every request
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(ACCESS_TOKEN)))
        .mount(server)
        .await;
}

/// Configuration pointing both base URLs at the mock server, with a 12 hour lookback
pub fn test_config(server: &MockServer, checkpoint: &Path, content_types: &[&str]) -> PollerConfig {
    let mut config = PollerConfig::new(TENANT_DOMAIN, CLIENT_ID, CLIENT_SECRET, DIRECTORY_ID);
    config.login_url = server.uri();
    config.resource_url = server.uri();
    config.checkpoint_path = checkpoint.to_path_buf();
    config.content_types = content_types.iter().map(|&t| t.to_owned()).collect();
    config.content_max_age = Duration::from_secs(12 * 3600);
    config.api_timeout = Duration::from_secs(5);
    config
}

pub fn token_manager(server: &MockServer, clock: Arc<dyn Clock>) -> Arc<TokenManager> {
    Arc::new(TokenManager::new(
        feed_client(Duration::from_secs(5)),
        ClientCredentials {
            token_url: format!("{}{}?api-version=1.0", server.uri(), token_path()),
            resource: server.uri(),
            client_id: CLIENT_ID.to_owned(),
            client_secret: CLIENT_SECRET.to_owned(),
        },
        clock,
    ))
}

pub fn api_client(server: &MockServer, clock: Arc<dyn Clock>) -> Arc<ApiClient> {
    let tokens = token_manager(server, clock);
    Arc::new(
        ApiClient::new(
            feed_client(Duration::from_secs(5)),
            tokens,
            &format!("{}{}", server.uri(), feed_path("")),
            DIRECTORY_ID,
        )
        .unwrap(),
    )
}

pub fn content_lister(
    client: &Arc<ApiClient>,
    content_types: &[&str],
    max_lookback: chrono::Duration,
    clock: Arc<dyn Clock>,
) -> ContentLister {
    ContentLister::new(
        Arc::clone(client),
        content_types.iter().map(|&t| t.to_owned()).collect(),
        max_lookback,
        clock,
    )
}

pub fn poll_cycle(
    server: &MockServer,
    clock: &FixedClock,
    content_types: &[&str],
    sink: Arc<dyn EventSink>,
    checkpoint: Arc<dyn CheckpointStore>,
) -> PollCycle {
    let clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let client = api_client(server, Arc::clone(&clock));
    let lister = content_lister(
        &client,
        content_types,
        chrono::Duration::hours(12),
        Arc::clone(&clock),
    );
    PollCycle::new(
        Arc::new(lister),
        Arc::new(ContentFetcher::new(client)),
        sink,
        checkpoint,
        clock,
    )
}

/// One listing entry whose blob lives at `/blobs/{id}` on the mock server
pub fn location_json(server: &MockServer, content_type: &str, id: &str, created: &str) -> Value {
    json!({
        "contentType": content_type,
        "contentId": id,
        "contentUri": format!("{}/blobs/{id}", server.uri()),
        "contentCreated": created,
        "contentExpiration": "2024-01-08T00:00:00.000Z"
    })
}

/// Sink that keeps every event in memory
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PublishedEvent>>,
    closed: AtomicBool,
    fail_after: Option<usize>,
    attempts: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that accepts `accepted` events and refuses the rest
    pub fn failing_after(accepted: usize) -> Self {
        Self {
            fail_after: Some(accepted),
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<PublishedEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn publish(&self, event: PublishedEvent) -> FeedResult<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(FeedError::publish("pipeline unavailable"));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn close(&self) -> FeedResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
