use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use gmail_triage::aggregate::AggregateStore;
use gmail_triage::config::TriageConfig;
use gmail_triage::gateway::{InMemoryMailGateway, RecordingSink};
use gmail_triage::models::{FetchedMessage, Message};
use gmail_triage::pipeline::{TriageEvent, TriagePipeline};
use gmail_triage::summary::SummaryTask;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gmail-triage", version, about = "Email notification triage pipeline")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "triage.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play canned webhook payloads through the pipeline against an
    /// in-memory mailbox, then run one summary cycle
    Simulate {
        /// Optional JSON file with an extra payload to process
        #[arg(long)]
        payload: Option<PathBuf>,
    },
    /// Load and validate the configuration, then print it
    CheckConfig,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_triage=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_triage=info,warn,error"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = TriageConfig::load(&cli.config).await?;

    match cli.command {
        Commands::Simulate { payload } => simulate(config, payload).await,
        Commands::CheckConfig => {
            config.validate()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Seed the in-memory mailbox with the messages the canned payloads refer to
fn seed_mailbox(gateway: &InMemoryMailGateway) {
    // Analyzed upstream: a work task with external scores attached
    gateway.insert_message(FetchedMessage {
        message: Message {
            message_id: "sim-analyzed-1".to_string(),
            thread_id: "thread-analyzed-1".to_string(),
            subject: "Quarterly report review".to_string(),
            from: "manager@example.com".to_string(),
            snippet: "Please review the attached report before Friday".to_string(),
            label_ids: vec!["INBOX".to_string()],
        },
        analysis: serde_json::from_value(json!({
            "category": {"category": "work.task", "confidence": 0.94},
            "urgency": {"urgency": "high", "score": 0.82,
                        "factors": {"subject_keyword_urgent": 1.0}},
            "importance": {"importance": "medium", "score": 0.55,
                           "factors": {"vip_sender": 0.5}}
        }))
        .ok(),
        archive_hint: false,
    });

    // Heuristic path: promotional mail, will be labeled and archived
    gateway.insert_message(FetchedMessage {
        message: Message {
            message_id: "sim-promo-1".to_string(),
            thread_id: "thread-promo-1".to_string(),
            subject: "Exclusive offer: 40% discount this week only".to_string(),
            from: "deals@shop.example".to_string(),
            snippet: "Unsubscribe at any time".to_string(),
            label_ids: vec!["INBOX".to_string()],
        },
        analysis: None,
        archive_hint: false,
    });

    // Heuristic path: urgent message with no recognizable category
    gateway.insert_message(FetchedMessage {
        message: Message {
            message_id: "sim-urgent-1".to_string(),
            thread_id: "thread-urgent-1".to_string(),
            subject: "URGENT: please reply today".to_string(),
            from: "contact@example.org".to_string(),
            snippet: "need an answer as soon as possible".to_string(),
            label_ids: vec!["INBOX".to_string()],
        },
        analysis: None,
        archive_hint: false,
    });
}

fn canned_payloads() -> Vec<Value> {
    let push_data =
        STANDARD.encode(r#"{"emailAddress":"me@example.com","historyId":4711}"#);
    vec![
        // Pub/Sub push envelope
        json!({"message": {"data": push_data, "messageId": "sim-analyzed-1"}}),
        // Flat webhook bodies
        json!({"messageId": "sim-promo-1", "threadId": "thread-promo-1"}),
        json!({"messageId": "sim-urgent-1", "threadId": "thread-urgent-1"}),
    ]
}

async fn simulate(config: TriageConfig, extra_payload: Option<PathBuf>) -> Result<()> {
    let gateway = Arc::new(InMemoryMailGateway::new());
    seed_mailbox(&gateway);

    let aggregate = Arc::new(AggregateStore::new());
    let sink = Arc::new(RecordingSink::new());
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let events: Arc<dyn gmail_triage::pipeline::EventSink> = Arc::new(events_tx);

    let pipeline = TriagePipeline::new(
        Arc::clone(&gateway) as _,
        Arc::clone(&aggregate),
        &config,
        Arc::clone(&events),
    );

    let mut payloads = canned_payloads();
    if let Some(path) = extra_payload {
        let content = tokio::fs::read_to_string(&path).await?;
        payloads.push(serde_json::from_str(&content)?);
    }

    for payload in &payloads {
        if let Err(e) = pipeline.process(payload).await {
            tracing::error!(error = %e, "pipeline run failed");
        }
    }

    let summary = SummaryTask::new(aggregate, Arc::clone(&sink) as _, events);
    summary.run_once().await?;

    println!("--- events ---");
    while let Ok(event) = events_rx.try_recv() {
        match event {
            TriageEvent::Organized {
                message_id,
                applied_labels,
                archived,
            } => println!(
                "organized {} labels=[{}] archived={}",
                message_id,
                applied_labels.join(", "),
                archived
            ),
            TriageEvent::Replied {
                message_id,
                response_type,
                ..
            } => println!("replied {} ({})", message_id, response_type),
            TriageEvent::OrganizationFailed { message_id, error } => {
                println!("organization failed {}: {}", message_id, error)
            }
            TriageEvent::SummarySent { date, .. } => println!("summary sent for {}", date),
        }
    }

    for report in sink.published() {
        println!("--- report ---");
        println!("{}", report.render_text());
    }

    Ok(())
}
