// ABOUTME: Shared HTTP client factory with connection pooling and timeout configuration
// ABOUTME: Builds the single reqwest client handed to the token manager and the feed API client
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use crate::constants::defaults;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create a new HTTP client with custom timeout settings
///
/// The poller builds exactly one client at startup and passes it to every
/// component that talks HTTP, so connection pooling is shared.
///
/// Falls back to a default client if the builder rejects the settings.
#[must_use]
pub fn create_client_with_timeout(timeout: Duration, connect_timeout: Duration) -> Client {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for feed API calls using the configured request timeout
#[must_use]
pub fn feed_client(timeout: Duration) -> Client {
    let connect_timeout = timeout.min(Duration::from_secs(defaults::CONNECT_TIMEOUT_SECS));
    create_client_with_timeout(timeout, connect_timeout)
}
