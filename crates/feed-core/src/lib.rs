// ABOUTME: Core types and constants for the management-activity feed poller
// ABOUTME: Foundation crate with the error taxonomy, feed data models, timestamp formats and clock
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # Feed Core
//!
//! Foundation crate shared by the feed acquisition engine. It is designed to
//! change infrequently so the engine crate recompiles on its own.
//!
//! ## Modules
//!
//! - **errors**: `FeedError` taxonomy (validation, auth, api, checkpoint, publish, config)
//! - **constants**: API paths, query keys, headers, timestamp formats and defaults
//! - **models**: subscriptions, content locations, events and the watermark
//! - **time**: conversions between the API's timestamp formats and `DateTime<Utc>`
//! - **clock**: injectable source of "now"

/// Unified error taxonomy for feed operations
pub mod errors;

/// Constants organized by domain
pub mod constants;

/// Feed data models
pub mod models;

/// API timestamp formatting and parsing
pub mod time;

/// Injectable wall clock
pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{ApiError, AuthError, FeedError, FeedResult};
