// ABOUTME: Command-line entry point for the management activity feed poller
// ABOUTME: Loads environment configuration, wires the poller and runs it until interrupted
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Feed Poller Binary
//!
//! Polls the tenant's management activity feed and writes every event as a
//! JSON line to stdout or to `--output`. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use o365_feed_poller::{
    config::PollerConfig,
    logging,
    poller::Poller,
    sink::{EventSink, JsonLinesSink},
    SystemClock,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Command-line overrides applied on top of the environment configuration
#[derive(Parser)]
#[command(name = "o365-feed-poller")]
#[command(about = "Continuously pull audit events from the management activity feed")]
pub struct Args {
    /// Override the checkpoint file location
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Append events to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Ensure subscriptions, run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = PollerConfig::from_env().context("Failed to load poller configuration")?;
    if let Some(checkpoint) = args.checkpoint {
        config.checkpoint_path = checkpoint;
    }
    info!("{}", config.summary());

    let sink: Arc<dyn EventSink> = match &args.output {
        Some(path) => Arc::new(JsonLinesSink::append_to(path).await?),
        None => Arc::new(JsonLinesSink::stdout()),
    };

    let mut poller = Poller::from_config(&config, sink, Arc::new(SystemClock))?;

    if args.once {
        let report = poller.run_once().await?;
        info!(
            watermark = %report.watermark,
            events = report.events_published,
            "Single cycle complete"
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        wait_for_signal().await;
        if let Err(e) = shutdown_tx.send(()).await {
            warn!(error = %e, "Shutdown signal could not be delivered");
        }
    });

    poller.run(shutdown_rx).await?;
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received");
}
