// ABOUTME: Management activity feed access: HTTP client, subscriptions, listing and retrieval
// ABOUTME: Every component shares one ApiClient built at startup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Feed API
//!
//! - [`client`]: authenticated requests and query merging
//! - [`subscriptions`]: make sure configured content types are collected
//! - [`pagination`]: `NextPageUri`-driven page stream
//! - [`content`]: windowed listing across content types
//! - [`fetcher`]: blob retrieval

/// Authenticated feed API client
pub mod client;
/// Available-content listing
pub mod content;
/// Blob retrieval
pub mod fetcher;
/// Header-driven page stream
pub mod pagination;
/// Subscription lifecycle
pub mod subscriptions;

pub use client::{merge_query, ApiClient, ApiResponse};
pub use content::{clamp_to_lookback, partition_windows, sort_by_creation, ContentLister, TimeWindow};
pub use fetcher::ContentFetcher;
pub use pagination::content_pages;
pub use subscriptions::SubscriptionManager;
