//! Triage pipeline orchestration
//!
//! One inbound notification flows strictly sequentially through decode →
//! fetch → classify → {labeling, response} → record. The labeling and
//! response branches are independent side-effect branches: a failure in one
//! neither suppresses the other nor corrupts aggregation for the run.
//! Stage outcomes surface as named events through the host's event sink.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::aggregate::AggregateStore;
use crate::classifier::Classifier;
use crate::config::TriageConfig;
use crate::decoder;
use crate::error::Result;
use crate::gateway::MailGateway;
use crate::labeling::{self, LabelingPolicy};
use crate::models::{Classification, FetchedMessage, Report, ResponsePlan};
use crate::responder::ResponsePolicy;

/// Pipeline-stage outcomes, emitted as discrete events so the host runtime
/// can fan them out
#[derive(Debug, Clone)]
pub enum TriageEvent {
    Organized {
        message_id: String,
        applied_labels: Vec<String>,
        archived: bool,
    },
    Replied {
        message_id: String,
        thread_id: String,
        response_type: String,
    },
    OrganizationFailed {
        message_id: String,
        error: String,
    },
    SummarySent {
        date: chrono::NaiveDate,
        report: Report,
    },
}

/// Seam through which the pipeline hands events to the host
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TriageEvent);
}

impl EventSink for mpsc::UnboundedSender<TriageEvent> {
    fn emit(&self, event: TriageEvent) {
        // A closed receiver just means nobody is listening anymore
        let _ = self.send(event);
    }
}

/// Sink that drops every event; for hosts that only consume logs
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: TriageEvent) {}
}

pub struct TriagePipeline {
    gateway: Arc<dyn MailGateway>,
    aggregate: Arc<AggregateStore>,
    classifier: Classifier,
    labeling: LabelingPolicy,
    responder: ResponsePolicy,
    events: Arc<dyn EventSink>,
}

impl TriagePipeline {
    pub fn new(
        gateway: Arc<dyn MailGateway>,
        aggregate: Arc<AggregateStore>,
        config: &TriageConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            gateway,
            aggregate,
            classifier: Classifier::new(),
            labeling: LabelingPolicy::new(&config.labels),
            responder: ResponsePolicy::new(&config.responder),
            events,
        }
    }

    /// Process one raw webhook payload end to end.
    ///
    /// Decode and fetch failures abort the run with no counter updates.
    /// Downstream branch failures are logged and emitted as failure events
    /// but the run still records its classification.
    pub async fn process(&self, raw: &Value) -> Result<()> {
        let notification = decoder::decode(raw)?;
        info!(message_id = %notification.message_id, "notification decoded");

        let fetched = self.gateway.fetch_message(&notification).await?;
        let message_id = fetched.message.message_id.clone();

        let classification = self
            .classifier
            .classify(&fetched.message, fetched.analysis.clone());
        info!(
            message_id = %message_id,
            category = %classification.category.category,
            urgency = classification.urgency.urgency.as_str(),
            "message classified"
        );

        if let Err(e) = self.organize(&fetched, &classification).await {
            error!(message_id = %message_id, error = %e, "failed to organize email");
            self.events.emit(TriageEvent::OrganizationFailed {
                message_id: message_id.clone(),
                error: e.to_string(),
            });
        }

        let auto_responded = self.respond(&fetched, &classification).await;

        self.aggregate
            .record(&message_id, &classification, auto_responded)
            .await;

        Ok(())
    }

    /// Labeling branch: resolve labels, apply them, archive when decided
    async fn organize(
        &self,
        fetched: &FetchedMessage,
        classification: &Classification,
    ) -> Result<()> {
        let message_id = &fetched.message.message_id;
        let decision = self
            .labeling
            .decide(classification, fetched.archive_hint, self.gateway.as_ref())
            .await?;

        if !decision.label_ids.is_empty() {
            self.gateway
                .apply_labels(message_id, &decision.label_ids)
                .await?;
            info!(
                message_id = %message_id,
                labels = decision.labels_to_apply.join(", "),
                "applied labels"
            );
        }

        let mut archived = false;
        if decision.should_archive {
            let archive_name = labeling::archive_label_name(classification.main_category());
            let archive_label_id = self.gateway.resolve_label(&archive_name).await?;
            self.gateway.archive(message_id, &archive_label_id).await?;
            archived = true;
            info!(message_id = %message_id, archive_label = %archive_name, "archived message");
        }

        self.events.emit(TriageEvent::Organized {
            message_id: message_id.clone(),
            applied_labels: decision.labels_to_apply,
            archived,
        });
        Ok(())
    }

    /// Response branch. Returns whether an auto-response actually went out;
    /// suppression and send failures both answer no, only the first is
    /// normal behavior.
    async fn respond(
        &self,
        fetched: &FetchedMessage,
        classification: &Classification,
    ) -> bool {
        let message = &fetched.message;

        let body = match self.responder.respond(classification) {
            ResponsePlan::Suppressed => {
                info!(
                    message_id = %message.message_id,
                    category = %classification.category.category,
                    "no auto-response for this category"
                );
                return false;
            }
            ResponsePlan::Reply(body) => body,
        };

        match self
            .gateway
            .send_reply(&message.message_id, &message.thread_id, &body)
            .await
        {
            Ok(()) => {
                info!(message_id = %message.message_id, "auto-response sent");
                self.events.emit(TriageEvent::Replied {
                    message_id: message.message_id.clone(),
                    thread_id: message.thread_id.clone(),
                    response_type: classification.category.category.clone(),
                });
                true
            }
            Err(e) => {
                warn!(message_id = %message.message_id, error = %e, "failed to send auto-response");
                false
            }
        }
    }
}
