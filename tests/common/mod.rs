//! Common test utilities and fixtures

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use gmail_triage::config::TriageConfig;
use gmail_triage::models::{
    CategoryResult, Classification, FetchedMessage, Importance, ImportanceResult, Message,
    Urgency, UrgencyResult,
};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Config used across integration scenarios: named responder, both
/// labeling extensions on
pub fn test_config() -> TriageConfig {
    let mut config = TriageConfig::default();
    config.responder.display_name = "Jordan Reyes".to_string();
    config
}

/// Create a fetched message with no upstream analysis
pub fn fetched_message(id: &str, subject: &str, snippet: &str) -> FetchedMessage {
    FetchedMessage {
        message: Message {
            message_id: id.to_string(),
            thread_id: format!("thread-{}", id),
            subject: subject.to_string(),
            from: "sender@example.com".to_string(),
            snippet: snippet.to_string(),
            label_ids: vec!["INBOX".to_string()],
        },
        analysis: None,
        archive_hint: false,
    }
}

/// Create a fetched message carrying externally computed scores
pub fn analyzed_message(
    id: &str,
    subject: &str,
    category: &str,
    urgency: Urgency,
    importance: Importance,
) -> FetchedMessage {
    let mut fetched = fetched_message(id, subject, "");
    fetched.analysis = Some(classification(category, urgency, importance));
    fetched
}

pub fn classification(
    category: &str,
    urgency: Urgency,
    importance: Importance,
) -> Classification {
    Classification {
        category: CategoryResult {
            category: category.to_string(),
            confidence: 0.93,
            alternative: None,
            promotion_score: None,
        },
        urgency: UrgencyResult {
            urgency,
            score: 0.7,
            factors: HashMap::new(),
        },
        importance: ImportanceResult {
            importance,
            score: 0.5,
            factors: HashMap::new(),
        },
    }
}

/// Flat webhook body referencing a message directly
pub fn flat_payload(message_id: &str) -> Value {
    json!({"messageId": message_id, "threadId": format!("thread-{}", message_id)})
}

/// Pub/Sub push envelope whose base64 data embeds the history position
pub fn push_payload(message_id: &str, history_id: u64) -> Value {
    let data = STANDARD.encode(format!(
        r#"{{"emailAddress":"me@example.com","historyId":{}}}"#,
        history_id
    ));
    json!({"message": {"data": data, "messageId": message_id}})
}
