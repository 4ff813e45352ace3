//! Periodic summary task
//!
//! Flushes the aggregation store into a report and hands it to the
//! notification sink. The cron trigger itself belongs to the host runtime;
//! this task only knows how to run one cycle. Counters are cleared only
//! after the sink accepted the report, so a transient delivery failure
//! costs nothing but a delay.

use std::sync::Arc;
use tracing::info;

use crate::aggregate::{AggregateStore, FlushOutcome};
use crate::error::Result;
use crate::gateway::NotificationSink;
use crate::pipeline::{EventSink, TriageEvent};

pub struct SummaryTask {
    aggregate: Arc<AggregateStore>,
    sink: Arc<dyn NotificationSink>,
    events: Arc<dyn EventSink>,
}

impl SummaryTask {
    pub fn new(
        aggregate: Arc<AggregateStore>,
        sink: Arc<dyn NotificationSink>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            aggregate,
            sink,
            events,
        }
    }

    /// Run one summary cycle: flush, publish, emit.
    /// An empty period is not a failure; nothing is published.
    pub async fn run_once(&self) -> Result<()> {
        info!("generating email summary");

        match self.aggregate.flush_to(self.sink.as_ref()).await? {
            FlushOutcome::NothingToReport => {
                info!("no emails processed this period, skipping summary");
            }
            FlushOutcome::Report(report) => {
                info!(
                    total = report.total_emails,
                    auto_responded = report.auto_responded_count,
                    "summary published"
                );
                self.events.emit(TriageEvent::SummarySent {
                    date: report.date,
                    report,
                });
            }
        }
        Ok(())
    }
}
