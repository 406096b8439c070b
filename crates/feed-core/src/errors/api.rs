// ABOUTME: Feed API error type distinguishing server rejections from transport failures
// ABOUTME: Carries status, body snippet and operator guidance for non-200 responses
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use thiserror::Error;

/// Maximum number of characters of a response body kept in an error
pub const BODY_SNIPPET_CHARS: usize = 512;

/// Operator guidance attached to every rejected API request
pub const REJECTION_GUIDANCE: &str = "newly enabled or newly subscribed feeds can take 12 hours or more to provide data; \
     confirm audit log search is enabled for the target tenant";

/// Failure of a request against the feed API
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The server answered with a non-200 status
    #[error("non-200 status {status} from {url}: {body_snippet} ({guidance})", guidance = REJECTION_GUIDANCE)]
    Rejected {
        /// Request URL (query string included, no credentials)
        url: String,
        /// HTTP status code
        status: u16,
        /// Leading part of the response body
        body_snippet: String,
    },

    /// Timeout, DNS failure, connection reset or similar; safe to retry next cycle
    #[error("transport failure calling {url}: {message}")]
    Transport {
        /// Request URL
        url: String,
        /// Transport diagnostic
        message: String,
    },

    /// The server answered 200 but the body could not be decoded
    #[error("malformed response body from {url}: {message}")]
    Decode {
        /// Request URL
        url: String,
        /// Decoder diagnostic
        message: String,
    },
}

impl ApiError {
    /// Create a rejection error, truncating the body to a snippet
    #[must_use]
    pub fn rejected(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::Rejected {
            url: url.into(),
            status,
            body_snippet: body_snippet(body),
        }
    }

    /// Create a transport error
    #[must_use]
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    #[must_use]
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Classify a `reqwest` failure
    #[cfg(feature = "http-errors")]
    #[must_use]
    pub fn from_transport(url: impl Into<String>, error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "connection failed"
        } else if error.is_body() || error.is_decode() {
            "response body could not be read"
        } else {
            "request failed"
        };
        // reqwest's Display includes the URL, which may carry a pagination token; keep our own
        let detail = std::error::Error::source(error)
            .map(ToString::to_string)
            .unwrap_or_default();
        let message = if detail.is_empty() {
            kind.to_owned()
        } else {
            format!("{kind}: {detail}")
        };
        Self::transport(url, message)
    }

    /// Transport failures are retryable, server rejections and bad bodies are not
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status when the server answered
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

/// Truncate a response body to at most [`BODY_SNIPPET_CHARS`] characters
#[must_use]
pub fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_carries_guidance_and_status() {
        let err = ApiError::rejected("https://manage.example.com/feed", 401, "{\"error\":\"AF20022\"}");
        let rendered = err.to_string();
        assert!(rendered.contains("401"));
        assert!(rendered.contains("AF20022"));
        assert!(rendered.contains("12 hours"));
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_body_snippet_truncates_on_char_boundary() {
        let body = "é".repeat(BODY_SNIPPET_CHARS + 10);
        let snippet = body_snippet(&body);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), BODY_SNIPPET_CHARS + 3);
    }

    #[test]
    fn test_short_body_untouched() {
        assert_eq!(body_snippet("  denied \n"), "denied");
    }

    #[test]
    fn test_transport_is_retryable() {
        let err = ApiError::transport("https://manage.example.com/feed", "connection reset");
        assert!(err.is_retryable());
        assert_eq!(err.status(), None);
    }
}
