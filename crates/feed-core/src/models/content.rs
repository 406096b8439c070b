// ABOUTME: Content location model produced by available-content listings
// ABOUTME: Points at one blob of events; consumed once by the fetcher within a cycle
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time::parse_rfc3339;

/// Pointer to a retrievable blob of events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLocation {
    /// Content type the blob belongs to
    pub content_type: String,
    /// Opaque blob identifier
    pub content_id: String,
    /// URI to fetch the blob from
    pub content_uri: String,
    /// When the blob became available
    pub content_created: DateTime<Utc>,
    /// When the blob stops being retrievable
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub content_expiration: Option<DateTime<Utc>>,
}

/// Expiration is informational; a malformed value must not fail the whole listing
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_rfc3339))
}
