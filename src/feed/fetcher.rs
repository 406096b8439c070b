// ABOUTME: Content retrieval for a single listed blob
// ABOUTME: Fetches the blob URI and decodes its JSON array of audit events
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use tracing::debug;

use super::client::ApiClient;
use crate::errors::FeedResult;
use crate::models::{ContentLocation, Event};

/// Retrieves the events behind a content location
pub struct ContentFetcher {
    client: Arc<ApiClient>,
}

impl ContentFetcher {
    /// Create a fetcher on top of the shared API client
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch one blob's events
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a JSON array
    /// of objects
    pub async fn fetch(&self, location: &ContentLocation) -> FeedResult<Vec<Event>> {
        let response = self.client.get(&location.content_uri, &[]).await?;
        let events: Option<Vec<Event>> = response.json()?;
        let events = events.unwrap_or_default();
        debug!(
            content_type = %location.content_type,
            content_id = %location.content_id,
            count = events.len(),
            "Fetched content blob"
        );
        Ok(events)
    }
}
