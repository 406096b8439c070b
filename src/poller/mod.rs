// ABOUTME: Poll orchestration: single cycles and the long-running lifecycle driver
// ABOUTME: The driver owns the schedule, the cycle owns watermark advancement
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// One polling cycle
pub mod cycle;
/// Lifecycle driver
pub mod driver;

pub use cycle::{CycleReport, PollCycle};
pub use driver::{Poller, PollerState};
