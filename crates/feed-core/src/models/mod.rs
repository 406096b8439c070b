// ABOUTME: Feed data models shared by the acquisition engine
// ABOUTME: Subscriptions, content locations, events and the watermark
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Content locations returned by listings
pub mod content;
/// Audit events and their published form
pub mod event;
/// Content-type subscriptions
pub mod subscription;
/// Durable progress marker
pub mod watermark;

pub use content::ContentLocation;
pub use event::{Event, PublishedEvent};
pub use subscription::{Subscription, SubscriptionStatus};
pub use watermark::Watermark;
