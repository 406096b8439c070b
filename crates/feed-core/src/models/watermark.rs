// ABOUTME: Watermark marking the creation time of the last published content blob
// ABOUTME: Monotonic progress marker; the epoch value means nothing has been published yet
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::time::format_watermark;

/// `contentCreated` of the most recently published blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Watermark(DateTime<Utc>);

impl Watermark {
    /// Value used before anything has been published
    #[must_use]
    pub const fn epoch() -> Self {
        Self(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Watermark at `at`
    #[must_use]
    pub const fn at(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Underlying instant
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// Whether this is the first-run value
    #[must_use]
    pub fn is_epoch(&self) -> bool {
        self.0 == DateTime::<Utc>::UNIX_EPOCH
    }

    /// First instant not covered by this watermark
    ///
    /// The API has whole-second granularity, so the watermark's own second is excluded.
    #[must_use]
    pub fn next_query_start(&self) -> DateTime<Utc> {
        self.0 + Duration::seconds(1)
    }

    /// Whether a blob created at `created` is newer than this watermark
    #[must_use]
    pub fn is_advanced_by(&self, created: DateTime<Utc>) -> bool {
        created > self.0
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for Watermark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_watermark(self.0))
    }
}

impl From<DateTime<Utc>> for Watermark {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_default() {
        assert!(Watermark::default().is_epoch());
        assert_eq!(Watermark::epoch().to_string(), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_next_query_start_skips_watermark_second() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            Watermark::at(at).next_query_start(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 1).unwrap()
        );
    }

    #[test]
    fn test_only_strictly_newer_advances() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mark = Watermark::at(at);
        assert!(!mark.is_advanced_by(at));
        assert!(mark.is_advanced_by(at + Duration::seconds(1)));
        assert!(!mark.is_advanced_by(at - Duration::seconds(1)));
    }
}
