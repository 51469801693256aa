//! Metrics collection and reporting
//!
//! Every analysis is recorded twice: in the in-process [`MetricsCollector`]
//! used for summaries, and through the `metrics` facade for whichever
//! recorder the binary installs.

use modguard_core::{AnalysisPath, Decision};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const ANALYSES_TOTAL: &str = "modguard_analyses_total";
pub const FALLBACKS_TOTAL: &str = "modguard_fallbacks_total";
pub const ANALYSIS_LATENCY_US: &str = "modguard_analysis_latency_us";
pub const TRAINING_SESSIONS_TOTAL: &str = "modguard_training_sessions_total";

/// Register descriptions for all modguard metrics with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(
        ANALYSES_TOTAL,
        "Total number of analyses by decision and classification path"
    );
    metrics::describe_counter!(
        FALLBACKS_TOTAL,
        "Analyses that fell back to heuristics after an ML failure"
    );
    metrics::describe_histogram!(
        ANALYSIS_LATENCY_US,
        metrics::Unit::Microseconds,
        "End-to-end analysis latency in microseconds"
    );
    metrics::describe_counter!(
        TRAINING_SESSIONS_TOTAL,
        "Training sessions by outcome"
    );
}

/// Metrics collector for analysis throughput and outcomes
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    total_analyses: AtomicU64,
    model_path: AtomicU64,
    heuristic_path: AtomicU64,
    fallbacks: AtomicU64,
    approved: AtomicU64,
    flagged: AtomicU64,
    rejected: AtomicU64,
    total_latency_us: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record a completed analysis
    pub fn record_analysis(&self, decision: Decision, path: AnalysisPath, latency_us: u64) {
        let inner = &self.inner;
        inner.total_analyses.fetch_add(1, Ordering::Relaxed);
        inner.total_latency_us.fetch_add(latency_us, Ordering::Relaxed);

        match path {
            AnalysisPath::Model => inner.model_path.fetch_add(1, Ordering::Relaxed),
            AnalysisPath::Heuristic => inner.heuristic_path.fetch_add(1, Ordering::Relaxed),
        };
        match decision {
            Decision::Approved => inner.approved.fetch_add(1, Ordering::Relaxed),
            Decision::Flagged => inner.flagged.fetch_add(1, Ordering::Relaxed),
            Decision::Rejected => inner.rejected.fetch_add(1, Ordering::Relaxed),
        };

        metrics::counter!(ANALYSES_TOTAL, "decision" => decision.as_str(), "path" => path.as_str())
            .increment(1);
        metrics::histogram!(ANALYSIS_LATENCY_US).record(latency_us as f64);
    }

    /// Record an ML failure that forced the heuristic path
    pub fn record_fallback(&self) {
        self.inner.fallbacks.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(FALLBACKS_TOTAL).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            total_analyses: inner.total_analyses.load(Ordering::Relaxed),
            model_path: inner.model_path.load(Ordering::Relaxed),
            heuristic_path: inner.heuristic_path.load(Ordering::Relaxed),
            fallbacks: inner.fallbacks.load(Ordering::Relaxed),
            approved: inner.approved.load(Ordering::Relaxed),
            flagged: inner.flagged.load(Ordering::Relaxed),
            rejected: inner.rejected.load(Ordering::Relaxed),
            total_latency_us: inner.total_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_analyses: u64,
    pub model_path: u64,
    pub heuristic_path: u64,
    pub fallbacks: u64,
    pub approved: u64,
    pub flagged: u64,
    pub rejected: u64,
    pub total_latency_us: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per analysis
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_analyses == 0 {
            0
        } else {
            self.total_latency_us / self.total_analyses
        }
    }

    /// Share of analyses that fell back to heuristics
    pub fn fallback_rate(&self) -> f64 {
        if self.total_analyses == 0 {
            0.0
        } else {
            self.fallbacks as f64 / self.total_analyses as f64
        }
    }
}
