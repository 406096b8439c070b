// ABOUTME: Unified error taxonomy for the feed acquisition engine
// ABOUTME: Validation, auth, API, checkpoint, publish and configuration failures with diagnostic context
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Feed Error Types
//!
//! Every fallible operation in the engine returns [`FeedResult`]. The variants
//! map onto how the poll loop reacts:
//!
//! - `Validation` - caller-supplied time range was invalid, surfaced immediately
//! - `Auth` - token acquisition failed, the dependent request is not sent
//! - `Api` - the feed API rejected a request or the transport failed
//! - `Checkpoint` - the watermark could not be persisted
//! - `Publish` - the downstream sink refused an event
//! - `Config` - configuration could not be loaded or is inconsistent
//!
//! None of the rendered messages contain the client secret or a bearer token.

/// API request failures (rejected vs. transport)
pub mod api;

pub use api::ApiError;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Token acquisition failure against the authorization endpoint
#[derive(Debug, Clone, Error)]
#[error("authentication against {target} failed{}: {message}", .status.map(|code| format!(" (HTTP {code})")).unwrap_or_default())]
pub struct AuthError {
    /// Sanitized request target (scheme, host and path only)
    pub target: String,
    /// HTTP status when the endpoint answered
    pub status: Option<u16>,
    /// Diagnostic message
    pub message: String,
}

impl AuthError {
    /// Create an auth error for a response with a status code
    #[must_use]
    pub fn rejected(target: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an auth error for a request that never produced a usable response
    #[must_use]
    pub fn failed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            status: None,
            message: message.into(),
        }
    }
}

/// Top-level error for feed operations
#[derive(Debug, Error)]
pub enum FeedError {
    /// Caller-supplied input (usually a time range) is invalid
    #[error("invalid request: {message}")]
    Validation {
        /// What was wrong
        message: String,
    },

    /// Token request failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Feed API request failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Watermark could not be written
    #[error("checkpoint write to {} failed: {source}", .path.display())]
    Checkpoint {
        /// Checkpoint location
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Downstream sink refused an event
    #[error("publishing to event sink failed: {message}")]
    Publish {
        /// Sink diagnostic
        message: String,
    },

    /// Configuration is missing or inconsistent
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },
}

impl FeedError {
    /// Invalid input
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Checkpoint write failure
    #[must_use]
    pub fn checkpoint(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Checkpoint {
            path: path.into(),
            source,
        }
    }

    /// Sink failure
    #[must_use]
    pub fn publish(message: impl Into<String>) -> Self {
        Self::Publish {
            message: message.into(),
        }
    }

    /// Configuration failure
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether repeating the operation later may succeed without intervention
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(api) => api.is_retryable(),
            Self::Auth(_) | Self::Checkpoint { .. } => true,
            Self::Validation { .. } | Self::Publish { .. } | Self::Config { .. } => false,
        }
    }
}

/// Result alias for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
