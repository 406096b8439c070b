// ABOUTME: Conversions between the feed API's timestamp formats and chrono UTC datetimes
// ABOUTME: Query timestamps have no zone suffix, event CreationTime needs one appended
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! The API uses three timestamp shapes:
//!
//! - query parameters: `2024-01-01T00:00:00` (UTC, no suffix)
//! - `contentCreated` in listings: RFC3339
//! - `CreationTime` in events: RFC3339 without the trailing zone designator

use chrono::{DateTime, SecondsFormat, Utc};

use crate::constants::formats::{API_QUERY_TIMESTAMP, CREATION_TIME_ZONE_SUFFIX};

/// Format a datetime the way the API expects in query strings
#[must_use]
pub fn format_query_timestamp(at: DateTime<Utc>) -> String {
    at.format(API_QUERY_TIMESTAMP).to_string()
}

/// Parse an RFC3339 timestamp into UTC
///
/// Returns `None` when the input is not RFC3339.
#[must_use]
pub fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Parse an event `CreationTime`, appending the missing zone designator
///
/// Values that already carry a designator are accepted as-is.
#[must_use]
pub fn parse_creation_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    parse_rfc3339(&format!("{raw}{CREATION_TIME_ZONE_SUFFIX}")).or_else(|| parse_rfc3339(raw))
}

/// Render a watermark for durable storage (RFC3339, whole seconds, `Z` suffix)
#[must_use]
pub fn format_watermark(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
