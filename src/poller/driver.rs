// ABOUTME: Lifecycle driver that ensures subscriptions and runs poll cycles on a fixed period
// ABOUTME: Races the period timer against a shutdown channel with shutdown taking precedence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::cycle::{CycleReport, PollCycle};
use crate::checkpoint::{CheckpointStore, FileCheckpoint};
use crate::config::PollerConfig;
use crate::errors::{FeedError, FeedResult};
use crate::feed::{ApiClient, ContentFetcher, ContentLister, SubscriptionManager};
use crate::oauth2_client::{ClientCredentials, TokenManager};
use crate::sink::EventSink;
use crate::utils::http_client::feed_client;
use feed_core::Clock;

/// Lifecycle phase of a [`Poller`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Constructed, not yet started
    Starting,
    /// Making sure every content type is subscribed
    EnsuringSubscriptions,
    /// Steady loop of timed cycles
    Polling,
    /// Shutdown requested, releasing resources
    Stopping,
    /// Finished
    Stopped,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Starting => "starting",
            Self::EnsuringSubscriptions => "ensuring-subscriptions",
            Self::Polling => "polling",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Long-running poller
pub struct Poller {
    subscriptions: SubscriptionManager,
    cycle: PollCycle,
    checkpoint: Arc<dyn CheckpointStore>,
    sink: Arc<dyn EventSink>,
    content_types: Vec<String>,
    period: Duration,
    state: PollerState,
    cycles_run: u64,
}

impl Poller {
    /// Assemble a poller from already-built components
    #[must_use]
    pub fn new(
        subscriptions: SubscriptionManager,
        cycle: PollCycle,
        checkpoint: Arc<dyn CheckpointStore>,
        sink: Arc<dyn EventSink>,
        content_types: Vec<String>,
        period: Duration,
    ) -> Self {
        Self {
            subscriptions,
            cycle,
            checkpoint,
            sink,
            content_types,
            period,
            state: PollerState::Starting,
            cycles_run: 0,
        }
    }

    /// Build every component from configuration
    ///
    /// One HTTP client and one token manager are created here and shared by
    /// all feed components.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the API root URL is invalid
    pub fn from_config(
        config: &PollerConfig,
        sink: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> FeedResult<Self> {
        let http = feed_client(config.api_timeout);
        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            ClientCredentials {
                token_url: config.token_url(),
                resource: config.resource_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
            },
            Arc::clone(&clock),
        ));
        let client = Arc::new(ApiClient::new(
            http,
            tokens,
            &config.api_root_url(),
            config.directory_id.clone(),
        )?);

        let lister = Arc::new(ContentLister::new(
            Arc::clone(&client),
            config.content_types.clone(),
            config.max_lookback(),
            Arc::clone(&clock),
        ));
        let fetcher = Arc::new(ContentFetcher::new(Arc::clone(&client)));
        let checkpoint: Arc<dyn CheckpointStore> =
            Arc::new(FileCheckpoint::new(&config.checkpoint_path));

        let cycle = PollCycle::new(
            lister,
            fetcher,
            Arc::clone(&sink),
            Arc::clone(&checkpoint),
            clock,
        );

        Ok(Self::new(
            SubscriptionManager::new(client),
            cycle,
            checkpoint,
            sink,
            config.content_types.clone(),
            config.poll_period,
        ))
    }

    /// Current lifecycle phase
    #[must_use]
    pub const fn state(&self) -> PollerState {
        self.state
    }

    /// Cycles run so far, including skipped ones
    #[must_use]
    pub const fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    fn transition(&mut self, next: PollerState) {
        debug!(from = %self.state, to = %next, "Poller state change");
        self.state = next;
    }

    /// Ensure subscriptions for every configured content type
    ///
    /// # Errors
    ///
    /// Returns the listing or start failure; polling without subscriptions is pointless
    pub async fn start(&mut self) -> FeedResult<Vec<String>> {
        self.transition(PollerState::EnsuringSubscriptions);
        let started = self.subscriptions.ensure(&self.content_types).await?;
        info!(
            content_types = %self.content_types.join(","),
            newly_started = started.len(),
            "Subscriptions ready"
        );
        Ok(started)
    }

    /// Ensure subscriptions, run exactly one cycle and close the sink
    ///
    /// # Errors
    ///
    /// Returns any subscription, cycle or sink failure
    pub async fn run_once(&mut self) -> FeedResult<CycleReport> {
        let outcome = match self.start().await {
            Ok(_) => {
                self.transition(PollerState::Polling);
                let watermark = self.checkpoint.load().await;
                self.cycles_run += 1;
                self.cycle.run(watermark).await
            }
            Err(e) => Err(e),
        };
        self.stop().await?;
        outcome
    }

    /// Run until `shutdown` yields or every sender is dropped
    ///
    /// Runs one cycle immediately, then one per period. When a tick and a
    /// shutdown are ready together, shutdown wins and no further cycle starts.
    ///
    /// # Errors
    ///
    /// Returns the subscription failure at startup, or a sink failure during a
    /// cycle. Other cycle failures are logged and retried on the next tick.
    pub async fn run(&mut self, mut shutdown: mpsc::Receiver<()>) -> FeedResult<()> {
        if let Err(e) = self.start().await {
            error!(error = %e, "Could not ensure subscriptions, giving up");
            self.stop().await?;
            return Err(e);
        }
        self.transition(PollerState::Polling);

        let outcome = self.poll_until(&mut shutdown).await;
        self.stop().await?;
        outcome
    }

    async fn poll_until(&mut self, shutdown: &mut mpsc::Receiver<()>) -> FeedResult<()> {
        if shutdown_requested(shutdown) {
            info!("Shutdown requested before the first cycle");
            return Ok(());
        }
        self.tick().await?;

        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    info!("Poller received shutdown signal");
                    return Ok(());
                }
                _ = timer.tick() => {
                    self.tick().await?;
                }
            }
        }
    }

    /// Reload the watermark and run a cycle; only sink failures escape
    async fn tick(&mut self) -> FeedResult<()> {
        self.cycles_run += 1;
        let watermark = self.checkpoint.load().await;
        match self.cycle.run(watermark).await {
            Ok(report) => {
                debug!(cycle = self.cycles_run, watermark = %report.watermark, "Cycle complete");
                Ok(())
            }
            Err(e @ FeedError::Publish { .. }) => {
                error!(cycle = self.cycles_run, error = %e, "Event sink failed, stopping");
                Err(e)
            }
            Err(e) => {
                warn!(
                    cycle = self.cycles_run,
                    error = %e,
                    "Cycle ended early; progress resumes from the stored checkpoint next tick"
                );
                Ok(())
            }
        }
    }

    async fn stop(&mut self) -> FeedResult<()> {
        self.transition(PollerState::Stopping);
        let closed = self.sink.close().await;
        self.transition(PollerState::Stopped);
        info!(cycles = self.cycles_run, "Poller stopped");
        closed
    }
}

fn shutdown_requested(shutdown: &mut mpsc::Receiver<()>) -> bool {
    matches!(
        shutdown.try_recv(),
        Ok(()) | Err(mpsc::error::TryRecvError::Disconnected)
    )
}
