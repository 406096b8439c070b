// ABOUTME: One polling cycle from watermark to published events and advanced checkpoint
// ABOUTME: Lists content after the watermark, fetches and publishes blobs in creation order, persists progress per blob
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::checkpoint::CheckpointStore;
use crate::errors::{FeedError, FeedResult};
use crate::feed::{ContentFetcher, ContentLister, TimeWindow};
use crate::models::{ContentLocation, Event, Watermark};
use crate::sink::EventSink;
use feed_core::Clock;

/// Outcome of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Watermark after the cycle
    pub watermark: Watermark,
    /// Span that was queried, if any
    pub window: Option<TimeWindow>,
    /// Whether listing failed and the cycle was skipped
    pub listing_failed: bool,
    /// Content locations returned by the listing
    pub locations_listed: usize,
    /// Blobs whose events were all published
    pub blobs_published: usize,
    /// Blobs skipped after a fetch failure
    pub blobs_skipped: usize,
    /// Events handed to the sink
    pub events_published: usize,
}

impl CycleReport {
    fn idle(watermark: Watermark, window: Option<TimeWindow>) -> Self {
        Self {
            watermark,
            window,
            listing_failed: false,
            locations_listed: 0,
            blobs_published: 0,
            blobs_skipped: 0,
            events_published: 0,
        }
    }
}

/// Runs single polling cycles against shared components
pub struct PollCycle {
    lister: Arc<ContentLister>,
    fetcher: Arc<ContentFetcher>,
    sink: Arc<dyn EventSink>,
    checkpoint: Arc<dyn CheckpointStore>,
    clock: Arc<dyn Clock>,
}

impl PollCycle {
    /// Wire a cycle runner
    #[must_use]
    pub fn new(
        lister: Arc<ContentLister>,
        fetcher: Arc<ContentFetcher>,
        sink: Arc<dyn EventSink>,
        checkpoint: Arc<dyn CheckpointStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lister,
            fetcher,
            sink,
            checkpoint,
            clock,
        }
    }

    /// Query span for a cycle starting at `now`
    ///
    /// Starts one second after the watermark, but no earlier than the lookback
    /// floor; ends at `now`. `None` when there is nothing to query yet.
    #[must_use]
    pub fn window_for(&self, watermark: Watermark, now: DateTime<Utc>) -> Option<TimeWindow> {
        let floor = now - self.lister.max_lookback();
        let start = watermark.next_query_start().max(floor);
        (start < now).then_some(TimeWindow { start, end: now })
    }

    /// Run one cycle from `watermark`
    ///
    /// A listing failure is logged and skips the cycle with the watermark
    /// unchanged. An API failure fetching a blob skips that blob only; a token
    /// failure ends the cycle so no later blob can move the watermark past it.
    ///
    /// # Errors
    ///
    /// Returns an error if a token cannot be obtained while fetching, the sink
    /// refuses an event, or the checkpoint cannot be written; blobs already
    /// published before the failure keep their persisted progress.
    pub async fn run(&self, watermark: Watermark) -> FeedResult<CycleReport> {
        let now = self.clock.now();
        let Some(window) = self.window_for(watermark, now) else {
            debug!(watermark = %watermark, "Watermark is current, nothing to list");
            return Ok(CycleReport::idle(watermark, None));
        };

        info!(
            watermark = %watermark,
            window.start = %window.start,
            window.end = %window.end,
            "Starting poll cycle"
        );

        let locations = match self.lister.list_all(window.start, window.end).await {
            Ok(locations) => locations,
            Err(e) => {
                error!(
                    window.start = %window.start,
                    window.end = %window.end,
                    error = %e,
                    "Listing available content failed, skipping cycle"
                );
                let mut report = CycleReport::idle(watermark, Some(window));
                report.listing_failed = true;
                return Ok(report);
            }
        };

        let mut report = CycleReport::idle(watermark, Some(window));
        report.locations_listed = locations.len();

        for location in &locations {
            let events = match self.fetcher.fetch(location).await {
                Ok(events) => events,
                Err(e @ FeedError::Auth(_)) => {
                    error!(
                        content_id = %location.content_id,
                        watermark = %report.watermark,
                        error = %e,
                        "Token unavailable, ending cycle before this blob"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        content_type = %location.content_type,
                        content_id = %location.content_id,
                        content_created = %location.content_created,
                        error = %e,
                        "Fetching content failed, skipping blob"
                    );
                    report.blobs_skipped += 1;
                    continue;
                }
            };

            report.events_published += self.publish_blob(location, events).await?;
            report.blobs_published += 1;

            if report.watermark.is_advanced_by(location.content_created) {
                let advanced = Watermark::at(location.content_created);
                self.checkpoint.store(advanced).await?;
                debug!(
                    previous = %report.watermark,
                    watermark = %advanced,
                    "Advanced watermark"
                );
                report.watermark = advanced;
            }
        }

        info!(
            watermark = %report.watermark,
            listed = report.locations_listed,
            published_blobs = report.blobs_published,
            skipped_blobs = report.blobs_skipped,
            events = report.events_published,
            "Poll cycle finished"
        );
        Ok(report)
    }

    async fn publish_blob(&self, location: &ContentLocation, events: Vec<Event>) -> FeedResult<usize> {
        let count = events.len();
        for event in events {
            let timestamp = event_timestamp(&event, location);
            self.sink
                .publish(event.into_published(&location.content_type, timestamp))
                .await?;
        }
        Ok(count)
    }
}

/// `CreationTime` with a zone appended, falling back to the blob's creation time
fn event_timestamp(event: &Event, location: &ContentLocation) -> DateTime<Utc> {
    event.creation_time().unwrap_or_else(|| {
        warn!(
            content_id = %location.content_id,
            creation_time = event.creation_time_raw().unwrap_or("<missing>"),
            "Event has no usable CreationTime, using blob creation time"
        );
        location.content_created
    })
}
