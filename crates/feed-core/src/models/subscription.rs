// ABOUTME: Content-type subscription model as reported by the subscriptions listing
// ABOUTME: Status is enabled, disabled or unknown; unrecognized values map to unknown
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Content is being collected
    Enabled,
    /// Subscription exists but was stopped, or was never started
    Disabled,
    /// Status missing or not recognized
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A content-type subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Content type, e.g. `Audit.General`
    pub content_type: String,
    /// Current status
    #[serde(default)]
    pub status: SubscriptionStatus,
}

impl Subscription {
    /// Placeholder for a configured content type absent from the listing
    #[must_use]
    pub fn missing(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            status: SubscriptionStatus::Disabled,
        }
    }

    /// Whether content is currently being collected
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.status == SubscriptionStatus::Enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_listing_decodes() {
        let raw = r#"[
            {"contentType":"Audit.SharePoint","status":"enabled","webhook":null},
            {"contentType":"Audit.Exchange","status":"disabled"},
            {"contentType":"DLP.All","status":"paused"},
            {"contentType":"Audit.General"}
        ]"#;
        let subs: Vec<Subscription> = serde_json::from_str(raw).unwrap();
        assert_eq!(subs[0].status, SubscriptionStatus::Enabled);
        assert_eq!(subs[1].status, SubscriptionStatus::Disabled);
        assert_eq!(subs[2].status, SubscriptionStatus::Unknown);
        assert_eq!(subs[3].status, SubscriptionStatus::Unknown);
        assert!(subs[0].is_enabled());
    }

    #[test]
    fn test_missing_placeholder_is_disabled() {
        let sub = Subscription::missing("Audit.General");
        assert_eq!(sub.status, SubscriptionStatus::Disabled);
        assert!(!sub.is_enabled());
    }
}
