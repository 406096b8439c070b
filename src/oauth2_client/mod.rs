// ABOUTME: OAuth 2.0 client-credentials support for the feed API
// ABOUTME: Token model, expiry rule and the caching token manager
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # OAuth 2.0 Client Module
//!
//! The poller authenticates as itself (client-credentials grant). One
//! [`TokenManager`] is built at startup and shared by reference; it owns the
//! only cached token.

/// Token model and caching token manager
pub mod client;

pub use client::{AccessToken, ClientCredentials, TokenManager};
