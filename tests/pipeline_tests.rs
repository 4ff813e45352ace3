//! End-to-end pipeline scenarios against the in-memory gateway

mod common;

use async_trait::async_trait;
use common::*;
use gmail_triage::aggregate::AggregateStore;
use gmail_triage::error::{Result, TriageError};
use gmail_triage::gateway::{InMemoryMailGateway, MailGateway, RecordingSink};
use gmail_triage::models::{FetchedMessage, Importance, NotificationRef, Urgency};
use gmail_triage::pipeline::{TriageEvent, TriagePipeline};
use gmail_triage::summary::SummaryTask;
use mockall::mock;
use std::sync::Arc;
use tokio::sync::mpsc;

fn build_pipeline(
    gateway: Arc<dyn MailGateway>,
    aggregate: Arc<AggregateStore>,
) -> (TriagePipeline, mpsc::UnboundedReceiver<TriageEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pipeline = TriagePipeline::new(gateway, aggregate, &test_config(), Arc::new(tx));
    (pipeline, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<TriageEvent>) -> Vec<TriageEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn urgent_message_with_unrecognized_category_gets_generic_ack() {
    let gateway = Arc::new(InMemoryMailGateway::new());
    gateway.insert_message(fetched_message(
        "m1",
        "URGENT: please reply today",
        "need an answer as soon as possible",
    ));
    let aggregate = Arc::new(AggregateStore::new());
    let (pipeline, mut rx) = build_pipeline(Arc::clone(&gateway) as _, Arc::clone(&aggregate));

    pipeline.process(&push_payload("m1", 100)).await.unwrap();

    // No category keyword matched, so the generic ack goes out
    let replies = gateway.sent_replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].body.contains("respond appropriately"));
    assert_eq!(replies[0].body.matches("Jordan Reyes").count(), 1);

    // Unknown category + Urgent labels applied
    let events = drain(&mut rx);
    let organized = events
        .iter()
        .find_map(|e| match e {
            TriageEvent::Organized { applied_labels, .. } => Some(applied_labels.clone()),
            _ => None,
        })
        .expect("expected an organized event");
    assert_eq!(organized, vec!["Unknown", "Urgent"]);

    let report = aggregate.flush().await.report().cloned().unwrap();
    assert_eq!(report.total_emails, 1);
    assert_eq!(report.urgency_counts.get("high"), Some(&1));
    assert_eq!(report.category_counts.get("unknown"), Some(&1));
    assert_eq!(report.auto_responded_count, 1);
}

#[tokio::test]
async fn analyzed_work_meeting_gets_composite_label_first() {
    let gateway = Arc::new(InMemoryMailGateway::new());
    gateway.insert_message(analyzed_message(
        "m2",
        "Sprint planning",
        "work.meeting",
        Urgency::Medium,
        Importance::Low,
    ));
    let aggregate = Arc::new(AggregateStore::new());
    let (pipeline, mut rx) = build_pipeline(Arc::clone(&gateway) as _, aggregate);

    pipeline.process(&flat_payload("m2")).await.unwrap();

    let events = drain(&mut rx);
    let organized = events
        .iter()
        .find_map(|e| match e {
            TriageEvent::Organized { applied_labels, .. } => Some(applied_labels.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(organized, vec!["Work-Meeting", "Work", "Normal"]);

    // Meeting invitations get the meeting ack
    assert!(gateway.sent_replies()[0].body.contains("meeting invitation"));
}

#[tokio::test]
async fn repeated_runs_reuse_resolved_labels() {
    let gateway = Arc::new(InMemoryMailGateway::new());
    gateway.insert_message(analyzed_message(
        "m3",
        "Standup",
        "work.meeting",
        Urgency::Low,
        Importance::Low,
    ));
    let aggregate = Arc::new(AggregateStore::new());
    let (pipeline, _rx) = build_pipeline(Arc::clone(&gateway) as _, aggregate);

    pipeline.process(&flat_payload("m3")).await.unwrap();
    let labels_after_first = gateway.label_count();
    pipeline.process(&flat_payload("m3")).await.unwrap();

    // Find-or-create resolved the same names again without duplicates
    assert_eq!(gateway.label_count(), labels_after_first);
}

#[tokio::test]
async fn promotion_marketing_is_suppressed_and_archived() {
    let gateway = Arc::new(InMemoryMailGateway::new());
    gateway.insert_message(analyzed_message(
        "m4",
        "Summer sale",
        "promotion.marketing",
        Urgency::Low,
        Importance::Low,
    ));
    let aggregate = Arc::new(AggregateStore::new());
    let (pipeline, mut rx) = build_pipeline(Arc::clone(&gateway) as _, Arc::clone(&aggregate));

    pipeline.process(&flat_payload("m4")).await.unwrap();

    // Suppression: no send attempted, not a failure
    assert!(gateway.sent_replies().is_empty());
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .all(|e| !matches!(e, TriageEvent::OrganizationFailed { .. })));

    // Archived under the distinct archive label
    assert_eq!(gateway.archived_messages().len(), 1);
    let archive_id = gateway.label_id("Archived_Promotional").unwrap();
    assert_eq!(gateway.archived_messages()[0].1, archive_id);

    // Composite label still resolved before the category label
    let organized = events
        .iter()
        .find_map(|e| match e {
            TriageEvent::Organized { applied_labels, archived, .. } => {
                Some((applied_labels.clone(), *archived))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(
        organized.0,
        vec!["Promotional-Marketing", "Promotional", "Low-Priority"]
    );
    assert!(organized.1);

    let report = aggregate.flush().await.report().cloned().unwrap();
    assert_eq!(report.auto_responded_count, 0);
}

#[tokio::test]
async fn summary_task_reports_mixed_period() {
    let gateway = Arc::new(InMemoryMailGateway::new());
    for i in 0..3 {
        gateway.insert_message(analyzed_message(
            &format!("w{}", i),
            "Status",
            "work",
            Urgency::High,
            Importance::Low,
        ));
    }
    for i in 0..2 {
        gateway.insert_message(analyzed_message(
            &format!("p{}", i),
            "Hello",
            "personal",
            Urgency::Low,
            Importance::Low,
        ));
    }

    let aggregate = Arc::new(AggregateStore::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let events: Arc<dyn gmail_triage::pipeline::EventSink> = Arc::new(tx);
    let pipeline = TriagePipeline::new(
        Arc::clone(&gateway) as _,
        Arc::clone(&aggregate),
        &test_config(),
        Arc::clone(&events),
    );

    for id in ["w0", "w1", "w2", "p0", "p1"] {
        pipeline.process(&flat_payload(id)).await.unwrap();
    }

    let sink = Arc::new(RecordingSink::new());
    let summary = SummaryTask::new(Arc::clone(&aggregate), Arc::clone(&sink) as _, events);
    summary.run_once().await.unwrap();

    let published = sink.published();
    assert_eq!(published.len(), 1);
    let report = &published[0];
    assert_eq!(report.total_emails, 5);
    assert_eq!(report.category_counts.get("work"), Some(&3));
    assert_eq!(report.category_counts.get("personal"), Some(&2));
    assert_eq!(report.urgency_counts.get("high"), Some(&3));
    assert_eq!(report.urgency_counts.get("low"), Some(&2));
    // Every run auto-responded, deduped by distinct message ids
    assert_eq!(report.auto_responded_count, 5);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, TriageEvent::SummarySent { .. })));

    // Period closed; immediate re-run publishes nothing
    summary.run_once().await.unwrap();
    assert_eq!(sink.published().len(), 1);
}

mock! {
    Gateway {}

    #[async_trait]
    impl MailGateway for Gateway {
        async fn fetch_message(&self, notification: &NotificationRef) -> Result<FetchedMessage>;
        async fn resolve_label(&self, name: &str) -> Result<String>;
        async fn apply_labels(&self, message_id: &str, label_ids: &[String]) -> Result<()>;
        async fn archive(&self, message_id: &str, archive_label_id: &str) -> Result<()>;
        async fn send_reply(&self, message_id: &str, thread_id: &str, body: &str) -> Result<()>;
    }
}

#[tokio::test]
async fn labeling_failure_does_not_suppress_response_branch() {
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_message().returning(|_| {
        Ok(analyzed_message(
            "m9",
            "Task handoff",
            "work.task",
            Urgency::High,
            Importance::Low,
        ))
    });
    gateway.expect_resolve_label().returning(|name| {
        Err(TriageError::LabelResolution {
            name: name.to_string(),
            message: "backend down".to_string(),
        })
    });
    // Labeling never gets this far
    gateway.expect_apply_labels().times(0);
    gateway.expect_archive().times(0);
    // The response branch must still run
    gateway
        .expect_send_reply()
        .times(1)
        .returning(|_, _, _| Ok(()));

    let aggregate = Arc::new(AggregateStore::new());
    let (pipeline, mut rx) = build_pipeline(Arc::new(gateway), Arc::clone(&aggregate));

    pipeline.process(&flat_payload("m9")).await.unwrap();

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, TriageEvent::OrganizationFailed { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, TriageEvent::Replied { .. })));

    // The run still counted, including the auto-response
    let report = aggregate.flush().await.report().cloned().unwrap();
    assert_eq!(report.total_emails, 1);
    assert_eq!(report.auto_responded_count, 1);
}

#[tokio::test]
async fn send_failure_counts_run_without_auto_response() {
    let mut gateway = MockGateway::new();
    gateway.expect_fetch_message().returning(|_| {
        Ok(analyzed_message(
            "m10",
            "Task handoff",
            "work.task",
            Urgency::Low,
            Importance::Low,
        ))
    });
    gateway
        .expect_resolve_label()
        .returning(|name| Ok(format!("id-{}", name)));
    gateway.expect_apply_labels().times(1).returning(|_, _| Ok(()));
    gateway
        .expect_send_reply()
        .times(1)
        .returning(|_, _, _| Err(TriageError::Send("smtp refused".to_string())));

    let aggregate = Arc::new(AggregateStore::new());
    let (pipeline, mut rx) = build_pipeline(Arc::new(gateway), Arc::clone(&aggregate));

    pipeline.process(&flat_payload("m10")).await.unwrap();

    // Labeling succeeded, send failed: organized but no reply event
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, TriageEvent::Organized { .. })));
    assert!(events.iter().all(|e| !matches!(e, TriageEvent::Replied { .. })));

    let report = aggregate.flush().await.report().cloned().unwrap();
    assert_eq!(report.total_emails, 1);
    assert_eq!(report.auto_responded_count, 0);
}
