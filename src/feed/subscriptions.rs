// ABOUTME: Subscription management for configured content types
// ABOUTME: Lists current subscriptions and starts any configured type that is not enabled
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::client::ApiClient;
use crate::constants::{api, query};
use crate::errors::FeedResult;
use crate::models::Subscription;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Ensures every configured content type has an enabled subscription
pub struct SubscriptionManager {
    client: Arc<ApiClient>,
}

impl SubscriptionManager {
    /// Create a manager on top of the shared API client
    #[must_use]
    pub const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Current subscriptions (single page)
    ///
    /// # Errors
    ///
    /// Returns an error if the listing request fails or the body is not a list
    pub async fn list(&self) -> FeedResult<Vec<Subscription>> {
        let url = self.client.endpoint(api::SUBSCRIPTIONS_LIST)?;
        let response = self.client.get(&url, &[]).await?;
        let subscriptions: Option<Vec<Subscription>> = response.json()?;
        Ok(subscriptions.unwrap_or_default())
    }

    /// Start the subscription for one content type
    ///
    /// # Errors
    ///
    /// Returns an error if the start request is rejected or fails in transport
    pub async fn start(&self, content_type: &str) -> FeedResult<()> {
        let url = self.client.endpoint(api::SUBSCRIPTIONS_START)?;
        let response = self
            .client
            .post(&url, &[(query::CONTENT_TYPE, content_type)], None)
            .await?;

        match response.json::<Value>() {
            Ok(details) => debug!(content_type, response = %details, "Subscription start response"),
            Err(e) => debug!(content_type, error = %e, "Subscription start response was not JSON"),
        }
        info!(
            content_type,
            "Started subscription; new subscriptions can take up to 12 hours to deliver content"
        );
        Ok(())
    }

    /// Start every configured content type whose subscription is not enabled
    ///
    /// Types absent from the listing are treated as disabled. Returns the
    /// content types that were started.
    ///
    /// # Errors
    ///
    /// Returns the first listing or start failure
    pub async fn ensure(&self, content_types: &[String]) -> FeedResult<Vec<String>> {
        let listed = self.list().await?;
        let mut started = Vec::new();

        for subscription in reconcile(&listed, content_types) {
            if subscription.is_enabled() {
                debug!(content_type = %subscription.content_type, "Subscription already enabled");
                continue;
            }
            info!(
                content_type = %subscription.content_type,
                status = %subscription.status,
                "Subscription not enabled, starting"
            );
            self.start(&subscription.content_type).await?;
            started.push(subscription.content_type);
        }

        Ok(started)
    }
}

/// Listed subscriptions followed by disabled placeholders for configured types the listing lacks
fn reconcile(listed: &[Subscription], content_types: &[String]) -> Vec<Subscription> {
    let mut all = listed.to_vec();
    for content_type in content_types {
        if !listed.iter().any(|s| &s.content_type == content_type) {
            all.push(Subscription::missing(content_type.as_str()));
        }
    }
    all
}
