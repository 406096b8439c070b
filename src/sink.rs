// ABOUTME: Event sink seam between the poller and the downstream pipeline
// ABOUTME: Ships a JSON-lines sink writing one published event per line to stdout or a file
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::errors::{FeedError, FeedResult};
use crate::models::PublishedEvent;

/// Downstream consumer of published events
///
/// Publishing is sequential; a failure means the sink is unusable and stops
/// the current cycle.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Hand one event to the pipeline
    ///
    /// # Errors
    ///
    /// Returns a publish error if the event was not accepted
    async fn publish(&self, event: PublishedEvent) -> FeedResult<()>;

    /// Flush and release the sink
    ///
    /// # Errors
    ///
    /// Returns a publish error if buffered output could not be flushed
    async fn close(&self) -> FeedResult<()>;
}

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Writes each event as a single JSON object per line
pub struct JsonLinesSink {
    writer: Mutex<Option<BoxedWriter>>,
}

impl JsonLinesSink {
    /// Sink over any async writer
    #[must_use]
    pub fn new(writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            writer: Mutex::new(Some(Box::new(writer))),
        }
    }

    /// Sink on standard output
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Sink appending to `path`, created if needed
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Publish`] if the file cannot be opened
    pub async fn append_to(path: &Path) -> FeedResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| FeedError::publish(format!("cannot open {}: {e}", path.display())))?;
        Ok(Self::new(file))
    }
}

#[async_trait]
impl EventSink for JsonLinesSink {
    async fn publish(&self, event: PublishedEvent) -> FeedResult<()> {
        let mut line = serde_json::to_vec(&event.to_json())
            .map_err(|e| FeedError::publish(format!("event not serializable: {e}")))?;
        line.push(b'\n');

        let mut guard = self.writer.lock().await;
        let writer = guard
            .as_mut()
            .ok_or_else(|| FeedError::publish("sink is closed"))?;
        writer
            .write_all(&line)
            .await
            .map_err(|e| FeedError::publish(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| FeedError::publish(e.to_string()))
    }

    async fn close(&self) -> FeedResult<()> {
        if let Some(mut writer) = self.writer.lock().await.take() {
            writer
                .shutdown()
                .await
                .map_err(|e| FeedError::publish(e.to_string()))?;
        }
        Ok(())
    }
}
