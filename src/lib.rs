//! Gmail Triage Pipeline
//!
//! Triages inbound email notifications: classifies each message, decides
//! which labels and archival action to apply, optionally drafts an automatic
//! reply, and rolls results into a periodic aggregate report.
//!
//! # Overview
//!
//! One notification flows through a strictly sequential pipeline:
//! decode → fetch → classify → {labeling policy, response policy} → record.
//! Independently, a timer-driven summary task flushes the accumulated
//! counters into a report and hands it to a notification sink.
//!
//! All network-bound work (message fetch, label find-or-create, reply
//! sending, report delivery) happens behind the narrow collaborator traits
//! in [`gateway`]; the core itself never blocks on I/O.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use gmail_triage::aggregate::AggregateStore;
//! use gmail_triage::config::TriageConfig;
//! use gmail_triage::gateway::InMemoryMailGateway;
//! use gmail_triage::pipeline::{NullEventSink, TriagePipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TriageConfig::load("triage.toml".as_ref()).await?;
//!     let gateway = Arc::new(InMemoryMailGateway::new());
//!     let aggregate = Arc::new(AggregateStore::new());
//!
//!     let pipeline =
//!         TriagePipeline::new(gateway, aggregate, &config, Arc::new(NullEventSink));
//!
//!     let payload = serde_json::json!({"messageId": "m1", "threadId": "t1"});
//!     pipeline.process(&payload).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`decoder`] - Webhook payload decoding into notification references
//! - [`classifier`] - Category/urgency/importance heuristics
//! - [`labeling`] - Label set and archive decisions
//! - [`responder`] - Auto-response template policy
//! - [`aggregate`] - Per-period counters and flush semantics
//! - [`pipeline`] - Stage orchestration and event emission
//! - [`summary`] - Periodic flush-and-publish task
//! - [`gateway`] - Collaborator traits and the in-memory test gateway
//! - [`config`] - Configuration management
//! - [`error`] - Error types and result alias
//! - [`models`] - Core data structures

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod gateway;
pub mod labeling;
pub mod models;
pub mod pipeline;
pub mod responder;
pub mod summary;

// Re-export commonly used types for convenience
pub use error::{Result, TriageError};

// Core data models
pub use models::{
    AggregateCounters, Category, CategoryResult, Classification, FetchedMessage, Importance,
    ImportanceResult, LabelDecision, Message, NotificationContext, NotificationRef, Report,
    ResponsePlan, Urgency, UrgencyResult,
};

// Pipeline stages
pub use aggregate::{AggregateStore, FlushOutcome};
pub use classifier::Classifier;
pub use labeling::LabelingPolicy;
pub use responder::ResponsePolicy;

// Orchestration
pub use pipeline::{EventSink, NullEventSink, TriageEvent, TriagePipeline};
pub use summary::SummaryTask;

// Collaborator seams
pub use gateway::{InMemoryMailGateway, MailGateway, NotificationSink, RecordingSink};

// Config types
pub use config::{LabelPolicyConfig, ResponderConfig, TriageConfig};
