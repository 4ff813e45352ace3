//! Per-period aggregation store
//!
//! The one piece of shared mutable state in the pipeline. Counter updates
//! and the auto-responded membership test-and-set happen under a single
//! mutex, and flush holds the same mutex for its snapshot-then-clear
//! boundary, so no record is ever lost or attributed to two periods.

use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::gateway::NotificationSink;
use crate::models::{AggregateCounters, Classification, Report};

/// Outcome of a flush: either a report for the closed period, or nothing
/// worth reporting
#[derive(Debug, Clone)]
pub enum FlushOutcome {
    Report(Report),
    NothingToReport,
}

impl FlushOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            FlushOutcome::Report(report) => Some(report),
            FlushOutcome::NothingToReport => None,
        }
    }
}

#[derive(Default)]
struct PeriodState {
    counters: AggregateCounters,
    // Source of truth for auto-responded membership; the counter is derived
    auto_responded: HashSet<String>,
}

impl PeriodState {
    fn snapshot(&self) -> Report {
        Report {
            date: Utc::now().date_naive(),
            total_emails: self.counters.total_emails,
            category_counts: self.counters.category_counts.clone(),
            urgency_counts: self.counters.urgency_counts.clone(),
            auto_responded_count: self.counters.auto_responded_count,
        }
    }

    fn reset(&mut self) {
        self.counters = AggregateCounters::default();
        self.auto_responded.clear();
    }
}

/// Aggregation store for the current reporting period.
///
/// Construct once per process and inject into the pipeline; never a hidden
/// module-level singleton.
#[derive(Default)]
pub struct AggregateStore {
    period: Mutex<PeriodState>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully triaged message.
    ///
    /// The auto-responded count is deduplicated by message id within the
    /// period: recording the same id twice with `auto_responded = true`
    /// bumps it once.
    pub async fn record(
        &self,
        message_id: &str,
        classification: &Classification,
        auto_responded: bool,
    ) {
        let mut period = self.period.lock().await;

        period.counters.total_emails += 1;
        *period
            .counters
            .category_counts
            .entry(classification.main_category().as_str().to_string())
            .or_insert(0) += 1;
        *period
            .counters
            .urgency_counts
            .entry(classification.urgency.urgency.as_str().to_string())
            .or_insert(0) += 1;

        if auto_responded && period.auto_responded.insert(message_id.to_string()) {
            period.counters.auto_responded_count += 1;
        }

        tracing::debug!(
            message_id,
            total = period.counters.total_emails,
            "recorded triage result"
        );
    }

    /// Snapshot the period into a report and clear the counters atomically.
    /// An empty period yields the nothing-to-report sentinel and leaves the
    /// counters untouched.
    pub async fn flush(&self) -> FlushOutcome {
        let mut period = self.period.lock().await;
        if period.counters.total_emails == 0 {
            return FlushOutcome::NothingToReport;
        }

        let report = period.snapshot();
        period.reset();
        FlushOutcome::Report(report)
    }

    /// Flush through a notification sink, clearing counters only after the
    /// sink accepted the report. The period lock is held across the publish
    /// so concurrent records land squarely in the next period; a failed
    /// publish loses nothing.
    pub async fn flush_to(&self, sink: &dyn NotificationSink) -> Result<FlushOutcome> {
        let mut period = self.period.lock().await;
        if period.counters.total_emails == 0 {
            return Ok(FlushOutcome::NothingToReport);
        }

        let report = period.snapshot();
        sink.publish(&report).await?;
        period.reset();
        Ok(FlushOutcome::Report(report))
    }
}
