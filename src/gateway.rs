//! Collaborator seams for the triage pipeline
//!
//! The core never performs network I/O itself. Message fetching, label
//! resolution and application, archiving, reply sending and report delivery
//! all go through these traits, implemented by whichever transport
//! integration is active and injected into the pipeline.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{Result, TriageError};
use crate::models::{FetchedMessage, NotificationRef, Report};

/// Mail provider capability surface consumed by the pipeline
#[async_trait]
pub trait MailGateway: Send + Sync {
    /// Fetch the message a notification refers to
    async fn fetch_message(&self, notification: &NotificationRef) -> Result<FetchedMessage>;

    /// Find-or-create a label by display name. Idempotent: the same name
    /// always yields the same id, never a duplicate label.
    async fn resolve_label(&self, name: &str) -> Result<String>;

    /// Apply already-resolved label ids to a message
    async fn apply_labels(&self, message_id: &str, label_ids: &[String]) -> Result<()>;

    /// Archive a message under the given archive label
    async fn archive(&self, message_id: &str, archive_label_id: &str) -> Result<()>;

    /// Send a reply on the message's thread
    async fn send_reply(&self, message_id: &str, thread_id: &str, body: &str) -> Result<()>;
}

/// Delivery seam for aggregate reports (chat webhook, etc.)
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, report: &Report) -> Result<()>;
}

/// Record of a sent auto-response, kept by the in-memory gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub message_id: String,
    pub thread_id: String,
    pub body: String,
}

/// In-memory mail gateway backing the simulator binary and the integration
/// tests. Seeded with canned messages; records every side effect for
/// inspection.
#[derive(Default)]
pub struct InMemoryMailGateway {
    messages: Mutex<HashMap<String, FetchedMessage>>,
    labels: Mutex<HashMap<String, String>>,
    next_label_id: AtomicU64,
    applied: Mutex<Vec<(String, Vec<String>)>>,
    archived: Mutex<Vec<(String, String)>>,
    sent: Mutex<Vec<SentReply>>,
}

impl InMemoryMailGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a message; later notifications for its id will fetch it
    pub fn insert_message(&self, fetched: FetchedMessage) {
        let mut messages = self.messages.lock().unwrap();
        messages.insert(fetched.message.message_id.clone(), fetched);
    }

    pub fn applied_labels(&self) -> Vec<(String, Vec<String>)> {
        self.applied.lock().unwrap().clone()
    }

    pub fn archived_messages(&self) -> Vec<(String, String)> {
        self.archived.lock().unwrap().clone()
    }

    pub fn sent_replies(&self) -> Vec<SentReply> {
        self.sent.lock().unwrap().clone()
    }

    pub fn label_count(&self) -> usize {
        self.labels.lock().unwrap().len()
    }

    /// Resolved id for a label name, if one was ever created
    pub fn label_id(&self, name: &str) -> Option<String> {
        self.labels.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl MailGateway for InMemoryMailGateway {
    async fn fetch_message(&self, notification: &NotificationRef) -> Result<FetchedMessage> {
        let messages = self.messages.lock().unwrap();
        messages
            .get(&notification.message_id)
            .cloned()
            .ok_or_else(|| TriageError::MessageNotFound(notification.message_id.clone()))
    }

    async fn resolve_label(&self, name: &str) -> Result<String> {
        let mut labels = self.labels.lock().unwrap();
        if let Some(id) = labels.get(name) {
            return Ok(id.clone());
        }
        let id = format!("Label_{}", self.next_label_id.fetch_add(1, Ordering::SeqCst) + 1);
        labels.insert(name.to_string(), id.clone());
        Ok(id)
    }

    async fn apply_labels(&self, message_id: &str, label_ids: &[String]) -> Result<()> {
        let mut applied = self.applied.lock().unwrap();
        applied.push((message_id.to_string(), label_ids.to_vec()));
        Ok(())
    }

    async fn archive(&self, message_id: &str, archive_label_id: &str) -> Result<()> {
        let mut archived = self.archived.lock().unwrap();
        archived.push((message_id.to_string(), archive_label_id.to_string()));
        Ok(())
    }

    async fn send_reply(&self, message_id: &str, thread_id: &str, body: &str) -> Result<()> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentReply {
            message_id: message_id.to_string(),
            thread_id: thread_id.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Sink that keeps published reports in memory (simulator, tests)
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Report>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<Report> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, report: &Report) -> Result<()> {
        tracing::info!(total = report.total_emails, "report published to sink");
        let mut published = self.published.lock().unwrap();
        published.push(report.clone());
        Ok(())
    }
}
