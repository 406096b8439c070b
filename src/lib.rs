// ABOUTME: Main library entry point for the management activity feed poller
// ABOUTME: Token management, subscriptions, windowed content listing, checkpointing and the poll loop
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![deny(unsafe_code)]

//! # O365 Feed Poller
//!
//! Continuously pulls audit events from a tenant's management activity feed
//! and hands them to an event sink, resuming after restarts from a durable
//! watermark without leaving gaps.
//!
//! ## Architecture
//!
//! Components, leaves first:
//! - **`oauth2_client`**: client-credentials token cache
//! - **`feed`**: authenticated API client, subscriptions, paginated listing and blob retrieval
//! - **`checkpoint`**: watermark persistence
//! - **`sink`**: downstream event seam
//! - **`poller`**: one cycle, and the driver that schedules cycles
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use o365_feed_poller::{config::PollerConfig, poller::Poller, sink::JsonLinesSink, SystemClock};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PollerConfig::from_env()?;
//!     let mut poller = Poller::from_config(&config, Arc::new(JsonLinesSink::stdout()), Arc::new(SystemClock))?;
//!     let report = poller.run_once().await?;
//!     println!("watermark now {}", report.watermark);
//!     Ok(())
//! }
//! ```

/// Core types re-exported from `feed-core`
pub use feed_core::{constants, errors, models, time};
pub use feed_core::{Clock, FixedClock, SystemClock};

/// Environment configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// Shared utilities
pub mod utils;

/// OAuth 2.0 client-credentials token management
pub mod oauth2_client;

/// Feed API access
pub mod feed;

/// Watermark persistence
pub mod checkpoint;

/// Event sink seam
pub mod sink;

/// Poll cycle and lifecycle driver
pub mod poller;
