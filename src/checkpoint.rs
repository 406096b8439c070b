// ABOUTME: Durable watermark storage surviving process restarts
// ABOUTME: File-backed store holding one RFC3339 timestamp, replaced atomically on every write
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Checkpoint
//!
//! The checkpoint is a single RFC3339 timestamp: the `contentCreated` of the
//! newest blob whose events were fully published. A missing or unreadable
//! checkpoint means "first run" and loads as the epoch watermark.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::errors::{FeedError, FeedResult};
use crate::models::Watermark;
use crate::time::{format_watermark, parse_rfc3339};

/// Storage for the poller's watermark
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Read the stored watermark, or the epoch watermark if none is usable
    async fn load(&self) -> Watermark;

    /// Replace the stored watermark
    ///
    /// # Errors
    ///
    /// Returns a checkpoint error if the watermark could not be made durable
    async fn store(&self, watermark: Watermark) -> FeedResult<()>;
}

/// Checkpoint kept in a small text file
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    /// Checkpoint at `path`; the file is created on first store
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the checkpoint file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_atomically(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let staging = self.staging_path();
        fs::write(&staging, contents).await?;
        fs::rename(&staging, &self.path).await
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpoint {
    async fn load(&self) -> Watermark {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No checkpoint yet, starting from epoch");
                return Watermark::epoch();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Checkpoint unreadable, starting from epoch");
                return Watermark::epoch();
            }
        };

        parse_rfc3339(raw.trim()).map_or_else(
            || {
                warn!(path = %self.path.display(), "Checkpoint content is not a timestamp, starting from epoch");
                Watermark::epoch()
            },
            Watermark::at,
        )
    }

    async fn store(&self, watermark: Watermark) -> FeedResult<()> {
        let rendered = format_watermark(watermark.timestamp());
        self.write_atomically(&rendered)
            .await
            .map_err(|e| FeedError::checkpoint(&self.path, e))?;
        debug!(path = %self.path.display(), watermark = %rendered, "Checkpoint stored");
        Ok(())
    }
}
