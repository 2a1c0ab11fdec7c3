// /////////////////////////////////////////////////////////////////////////////
// DocForge
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prometheus metrics for stage execution, retries, and queue depth.
//!
//! Mirrors the `docforge_domain::events::PipelineEvent` shapes as counters
//! and gauges so the same executor call site that emits an event also
//! updates a metric - one instrumentation point, two observers.

use docforge_domain::error::ErrorKind;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

/// Registry plus the named metrics the pipeline executor updates.
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Registry,

    stages_started_total: IntCounterVec,
    stages_completed_total: IntCounterVec,
    stages_failed_total: IntCounterVec,
    stage_duration_seconds: Histogram,
    retries_scheduled_total: IntCounter,
    errors_by_kind_total: IntCounterVec,
    queue_depth_pending: IntGauge,
    queue_depth_processing: IntGauge,
    queue_depth_failed: IntGauge,
}

impl PipelineMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let stages_started_total = IntCounterVec::new(
            Opts::new("stages_started_total", "Stage executions started").namespace("docforge"),
            &["stage"],
        )?;
        let stages_completed_total = IntCounterVec::new(
            Opts::new("stages_completed_total", "Stage executions completed successfully")
                .namespace("docforge"),
            &["stage"],
        )?;
        let stages_failed_total = IntCounterVec::new(
            Opts::new("stages_failed_total", "Stage executions that ended in failure")
                .namespace("docforge"),
            &["stage"],
        )?;
        let stage_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("stage_duration_seconds", "Stage execution wall time")
                .namespace("docforge")
                .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0]),
        )?;
        let retries_scheduled_total = IntCounter::with_opts(
            Opts::new("retries_scheduled_total", "Retries scheduled after a retryable failure")
                .namespace("docforge"),
        )?;
        let errors_by_kind_total = IntCounterVec::new(
            Opts::new("errors_by_kind_total", "Errors observed, grouped by retry-taxonomy kind")
                .namespace("docforge"),
            &["kind"],
        )?;
        let queue_depth_pending =
            IntGauge::with_opts(Opts::new("queue_depth_pending", "Pending queue tasks").namespace("docforge"))?;
        let queue_depth_processing = IntGauge::with_opts(
            Opts::new("queue_depth_processing", "Queue tasks currently leased").namespace("docforge"),
        )?;
        let queue_depth_failed =
            IntGauge::with_opts(Opts::new("queue_depth_failed", "Dead-lettered queue tasks").namespace("docforge"))?;

        registry.register(Box::new(stages_started_total.clone()))?;
        registry.register(Box::new(stages_completed_total.clone()))?;
        registry.register(Box::new(stages_failed_total.clone()))?;
        registry.register(Box::new(stage_duration_seconds.clone()))?;
        registry.register(Box::new(retries_scheduled_total.clone()))?;
        registry.register(Box::new(errors_by_kind_total.clone()))?;
        registry.register(Box::new(queue_depth_pending.clone()))?;
        registry.register(Box::new(queue_depth_processing.clone()))?;
        registry.register(Box::new(queue_depth_failed.clone()))?;

        Ok(Self {
            registry,
            stages_started_total,
            stages_completed_total,
            stages_failed_total,
            stage_duration_seconds,
            retries_scheduled_total,
            errors_by_kind_total,
            queue_depth_pending,
            queue_depth_processing,
            queue_depth_failed,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_stage_started(&self, stage: &str) {
        self.stages_started_total.with_label_values(&[stage]).inc();
    }

    pub fn record_stage_completed(&self, stage: &str, duration_s: f64) {
        self.stages_completed_total.with_label_values(&[stage]).inc();
        self.stage_duration_seconds.observe(duration_s);
    }

    pub fn record_stage_failed(&self, stage: &str, kind: ErrorKind) {
        self.stages_failed_total.with_label_values(&[stage]).inc();
        self.errors_by_kind_total.with_label_values(&[kind_label(kind)]).inc();
    }

    pub fn record_retry_scheduled(&self) {
        self.retries_scheduled_total.inc();
    }

    pub fn set_queue_depth(&self, pending: i64, processing: i64, failed: i64) {
        self.queue_depth_pending.set(pending);
        self.queue_depth_processing.set(processing);
        self.queue_depth_failed.set(failed);
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Transient => "transient",
        ErrorKind::Permanent => "permanent",
        ErrorKind::RateLimited => "rate_limited",
        ErrorKind::Cancelled => "cancelled",
        ErrorKind::LeaseLost => "lease_lost",
        ErrorKind::Unknown => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_stage_lifecycle_counters() {
        let metrics = PipelineMetrics::new().unwrap();
        metrics.record_stage_started("upload");
        metrics.record_stage_completed("upload", 0.25);
        metrics.record_stage_failed("embedding", ErrorKind::RateLimited);
        metrics.record_retry_scheduled();
        metrics.set_queue_depth(3, 1, 0);

        let families = metrics.registry().gather();
        assert!(!families.is_empty());
    }
}
