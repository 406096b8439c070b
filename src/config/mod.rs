// ABOUTME: Configuration module for the feed poller
// ABOUTME: Environment-only configuration of tenant identity, content types, timing and endpoints
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Environment-driven poller configuration
pub mod environment;

pub use environment::PollerConfig;
