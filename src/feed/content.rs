// ABOUTME: Available-content discovery over single and multi-day time spans
// ABOUTME: Clamps to the lookback limit, splits spans into 24 hour windows and merges results by creation time
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures_util::TryStreamExt;
use tracing::{debug, info, warn};

use super::client::ApiClient;
use super::pagination::content_pages;
use crate::constants::{api, query, windows};
use crate::errors::{FeedError, FeedResult};
use crate::models::ContentLocation;
use crate::time::format_query_timestamp;
use feed_core::Clock;

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

/// Lists content locations for the configured content types
pub struct ContentLister {
    client: Arc<ApiClient>,
    content_types: Vec<String>,
    max_lookback: Duration,
    clock: Arc<dyn Clock>,
}

impl ContentLister {
    /// Create a lister for `content_types`, in the order they should be queried
    #[must_use]
    pub fn new(
        client: Arc<ApiClient>,
        content_types: Vec<String>,
        max_lookback: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            content_types,
            max_lookback,
            clock,
        }
    }

    /// Configured content types
    #[must_use]
    pub fn content_types(&self) -> &[String] {
        &self.content_types
    }

    /// Furthest a listing may reach back from now
    #[must_use]
    pub const fn max_lookback(&self) -> Duration {
        self.max_lookback
    }

    /// List one content type over a window of at most 24 hours
    ///
    /// A start older than the lookback limit is moved forward with a warning.
    /// Results come back in discovery order, which is not guaranteed sorted.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Validation`] if `end` precedes `start` or the span exceeds 24 hours
    /// - any request failure on any page; partial pages are discarded
    pub async fn list(
        &self,
        content_type: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> FeedResult<Vec<ContentLocation>> {
        let start = self.clamp(start);

        if end < start {
            return Err(FeedError::validation(format!(
                "window start {start} is after end {end}"
            )));
        }
        if end - start > Duration::hours(windows::MAX_WINDOW_HOURS) {
            return Err(FeedError::validation(format!(
                "window {start} to {end} exceeds {} hours",
                windows::MAX_WINDOW_HOURS
            )));
        }

        let url = self.client.endpoint(api::SUBSCRIPTIONS_CONTENT)?;
        let params = vec![
            (query::CONTENT_TYPE.to_owned(), content_type.to_owned()),
            (query::START_TIME.to_owned(), format_query_timestamp(start)),
            (query::END_TIME.to_owned(), format_query_timestamp(end)),
        ];
        debug!(content_type, endpoint = %url, window.start = %start, window.end = %end, "Listing available content");

        let mut locations = Vec::new();
        let mut pages = content_pages(&self.client, url, params);
        while let Some(page) = pages.try_next().await? {
            locations.extend(page);
        }

        info!(
            content_type,
            window.start = %start,
            window.end = %end,
            count = locations.len(),
            "Listed available content"
        );
        Ok(locations)
    }

    /// List every configured content type over an arbitrary span
    ///
    /// The span is clamped to the lookback limit and split into windows of at
    /// most 24 hours. Windows are visited in order and, within each window,
    /// content types in configured order. The merged result is stably sorted
    /// by `contentCreated`.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Validation`] if `end` precedes `start`, otherwise
    /// the first failure of any window/content-type listing. No partial result
    /// is returned.
    pub async fn list_all(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> FeedResult<Vec<ContentLocation>> {
        if end < start {
            return Err(FeedError::validation(format!(
                "span start {start} is after end {end}"
            )));
        }
        let start = self.clamp(start);

        let mut all = Vec::new();
        for window in partition_windows(start, end) {
            for content_type in &self.content_types {
                let found = self.list(content_type, window.start, window.end).await?;
                all.extend(found);
            }
        }

        if sort_by_creation(&mut all) {
            debug!(count = all.len(), "Available content already in creation order");
        } else {
            debug!(count = all.len(), "Available content was unsorted; sorted by creation time");
        }
        Ok(all)
    }

    fn clamp(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.now();
        let clamped = clamp_to_lookback(start, now, self.max_lookback);
        if clamped != start {
            warn!(
                requested = %start,
                clamped = %clamped,
                max_lookback_hours = self.max_lookback.num_hours(),
                "Start is older than the lookback limit, moving it forward"
            );
        }
        clamped
    }
}

/// Move `start` forward to `now - max_lookback` when it lies further back
#[must_use]
pub fn clamp_to_lookback(
    start: DateTime<Utc>,
    now: DateTime<Utc>,
    max_lookback: Duration,
) -> DateTime<Utc> {
    let floor = now - max_lookback;
    if start < floor {
        floor
    } else {
        start
    }
}

/// Split `[start, end)` into consecutive windows of at most 24 hours
///
/// The last window ends exactly at `end`. An empty span yields no windows.
#[must_use]
pub fn partition_windows(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TimeWindow> {
    let step = Duration::hours(windows::MAX_WINDOW_HOURS);
    let mut windows = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let window_end = (cursor + step).min(end);
        windows.push(TimeWindow {
            start: cursor,
            end: window_end,
        });
        cursor = window_end;
    }
    windows
}

/// Stable sort by `contentCreated`; returns whether the input was already sorted
pub fn sort_by_creation(items: &mut [ContentLocation]) -> bool {
    let sorted = items
        .windows(2)
        .all(|pair| pair[0].content_created <= pair[1].content_created);
    if !sorted {
        items.sort_by_key(|item| item.content_created);
    }
    sorted
}
