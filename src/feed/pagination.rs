// ABOUTME: Lazy page stream over listings that continue through the NextPageUri header
// ABOUTME: Each pull issues one GET and yields that page; the stream ends when no continuation remains
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Header-driven pagination
//!
//! Content listings return at most one page per response and point at the
//! next page through the `NextPageUri` response header. [`content_pages`]
//! turns that into a finite `Stream` of pages: nothing is requested until the
//! consumer polls, and a fresh stream always restarts from the first page.
//!
//! ```rust,no_run
//! use futures_util::TryStreamExt;
//! use o365_feed_poller::feed::{client::ApiClient, pagination::content_pages};
//!
//! async fn drain(client: &ApiClient, url: String) -> o365_feed_poller::errors::FeedResult<usize> {
//!     let pages: Vec<_> = content_pages(client, url, Vec::new()).try_collect().await?;
//!     Ok(pages.iter().map(Vec::len).sum())
//! }
//! ```

use std::pin::Pin;

use async_stream::try_stream;
use futures_util::Stream;
use tracing::{debug, warn};

use super::client::ApiClient;
use crate::errors::{FeedError, FeedResult};
use crate::models::ContentLocation;

/// Stream of listing pages
pub type ContentPageStream<'a> =
    Pin<Box<dyn Stream<Item = FeedResult<Vec<ContentLocation>>> + Send + 'a>>;

/// Stream every page of a content listing
///
/// `params` apply to the first request only; continuation URLs already carry
/// their own query and only get the publisher identifier added. A continuation
/// equal to the page just requested ends the stream.
pub fn content_pages(
    client: &ApiClient,
    url: String,
    params: Vec<(String, String)>,
) -> ContentPageStream<'_> {
    Box::pin(try_stream! {
        let mut next: Option<String> = Some(url);
        let mut first = true;
        let mut page_number: usize = 0;

        while let Some(target) = next.take() {
            let borrowed: Vec<(&str, &str)> = if first {
                params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
            } else {
                Vec::new()
            };
            first = false;

            let response = client.get(&target, &borrowed).await?;
            let page: Option<Vec<ContentLocation>> =
                response.json().map_err(FeedError::from)?;
            page_number += 1;

            match response.next_page_uri {
                Some(uri) if uri == target => {
                    warn!(page = page_number, next_page = %uri, "Continuation points at the current page, stopping");
                }
                Some(uri) => {
                    debug!(page = page_number, next_page = %uri, "Listing continues on next page");
                    next = Some(uri);
                }
                None => {}
            }

            yield page.unwrap_or_default();
        }
    })
}
