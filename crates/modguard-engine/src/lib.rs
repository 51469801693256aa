//! modguard Engine
//!
//! The decision pipeline and the components built around it:
//! - [`DecisionEngine`]: ML classification with heuristic fallback, joined
//!   with policy retrieval and topic detection
//! - [`ModerationQueue`]: analysed items awaiting moderator review
//! - [`FeedRunner`]: drives a [`ContentSource`] into the queue
//! - [`MetricsCollector`]: analysis counters and latency

pub mod engine;
pub mod feed;
pub mod metrics;
pub mod queue;

pub use engine::{Analysis, DecisionEngine, EngineConfig};
pub use feed::{ContentSource, FeedConfig, FeedHandle, FeedRunner, FeedSummary, MockFeed};
pub use crate::metrics::{describe_metrics, MetricsCollector, MetricsSnapshot};
pub use queue::{ModerationQueue, QueueEvent, QueueStats};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::engine::{Analysis, DecisionEngine};
    pub use crate::queue::ModerationQueue;
    pub use modguard_core::prelude::*;
}
