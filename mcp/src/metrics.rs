//! Dispatch metrics.
//!
//! Process-local counters only; nothing here is exported over the wire. The
//! snapshot is logged at shutdown.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::error::FailureKind;

pub struct DispatchMetrics {
    total_calls: AtomicU64,
    successful_calls: AtomicU64,
    failed_calls: AtomicU64,

    validation_failures: AtomicU64,
    remote_failures: AtomicU64,
    routing_failures: AtomicU64,
    setup_failures: AtomicU64,
    internal_failures: AtomicU64,

    rate_limit_retries: AtomicU64,
    active_calls: AtomicU64,

    tool_latencies: DashMap<String, LatencyStats>,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self {
            total_calls: AtomicU64::new(0),
            successful_calls: AtomicU64::new(0),
            failed_calls: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            remote_failures: AtomicU64::new(0),
            routing_failures: AtomicU64::new(0),
            setup_failures: AtomicU64::new(0),
            internal_failures: AtomicU64::new(0),
            rate_limit_retries: AtomicU64::new(0),
            active_calls: AtomicU64::new(0),
            tool_latencies: DashMap::new(),
        }
    }

    pub fn record_call_start(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        self.active_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the end of a call. `failure` is `None` on success.
    pub fn record_call_end(&self, failure: Option<FailureKind>) {
        self.active_calls.fetch_sub(1, Ordering::Relaxed);

        let Some(kind) = failure else {
            self.successful_calls.fetch_add(1, Ordering::Relaxed);
            return;
        };
        self.failed_calls.fetch_add(1, Ordering::Relaxed);
        let bucket = match kind {
            FailureKind::Validation => &self.validation_failures,
            FailureKind::Remote => &self.remote_failures,
            FailureKind::Routing => &self.routing_failures,
            FailureKind::Setup => &self.setup_failures,
            FailureKind::Internal => &self.internal_failures,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency is tracked only for names that resolved to a registered tool.
    pub fn record_latency(&self, tool: &str, duration_ms: u64) {
        if let Some(stats) = self.tool_latencies.get(tool) {
            stats.record(duration_ms);
            return;
        }
        self.tool_latencies
            .entry(tool.to_string())
            .or_insert_with(LatencyStats::new)
            .record(duration_ms);
    }

    pub fn record_rate_limit_retry(&self) {
        self.rate_limit_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_calls: self.total_calls.load(Ordering::Relaxed),
            successful_calls: self.successful_calls.load(Ordering::Relaxed),
            failed_calls: self.failed_calls.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            routing_failures: self.routing_failures.load(Ordering::Relaxed),
            setup_failures: self.setup_failures.load(Ordering::Relaxed),
            internal_failures: self.internal_failures.load(Ordering::Relaxed),
            rate_limit_retries: self.rate_limit_retries.load(Ordering::Relaxed),
            active_calls: self.active_calls.load(Ordering::Relaxed),
        }
    }

    pub fn tool_latency(&self, tool: &str) -> Option<LatencySnapshot> {
        self.tool_latencies.get(tool).map(|stats| stats.snapshot())
    }

    /// Latency stats for all tools, sorted by name.
    pub fn all_tool_latencies(&self) -> Vec<(String, LatencySnapshot)> {
        let mut out: Vec<_> = self
            .tool_latencies
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-tool latency statistics.
pub struct LatencyStats {
    count: AtomicU64,
    total_ms: AtomicU64,
    min_ms: AtomicU64,
    max_ms: AtomicU64,
}

impl LatencyStats {
    fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            total_ms: AtomicU64::new(0),
            min_ms: AtomicU64::new(u64::MAX),
            max_ms: AtomicU64::new(0),
        }
    }

    fn record(&self, ms: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_ms.fetch_add(ms, Ordering::Relaxed);
        self.min_ms.fetch_min(ms, Ordering::Relaxed);
        self.max_ms.fetch_max(ms, Ordering::Relaxed);
    }

    fn snapshot(&self) -> LatencySnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let total = self.total_ms.load(Ordering::Relaxed);
        let min = self.min_ms.load(Ordering::Relaxed);

        LatencySnapshot {
            count,
            avg_ms: if count > 0 { total / count } else { 0 },
            min_ms: if min == u64::MAX { 0 } else { min },
            max_ms: self.max_ms.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub validation_failures: u64,
    pub remote_failures: u64,
    pub routing_failures: u64,
    pub setup_failures: u64,
    pub internal_failures: u64,
    pub rate_limit_retries: u64,
    pub active_calls: u64,
}

impl MetricsSnapshot {
    /// Success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        let completed = self.successful_calls + self.failed_calls;
        if completed == 0 {
            100.0
        } else {
            (self.successful_calls as f64 / completed as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencySnapshot {
    pub count: u64,
    pub avg_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}
