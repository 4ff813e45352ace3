use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Normalized reference to a message extracted from a webhook notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRef {
    pub message_id: String,
    pub context: NotificationContext,
}

/// Provider-dependent lookup context carried by a notification.
///
/// Pub/Sub push envelopes reference a mailbox history position; flat webhook
/// bodies reference the conversation thread directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationContext {
    History {
        history_id: u64,
        email_address: Option<String>,
    },
    Thread {
        thread_id: String,
    },
}

/// Message content as fetched from the mail gateway.
/// Immutable once fetched; identity is `message_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: String,
    pub thread_id: String,
    pub subject: String,
    pub from: String,
    pub snippet: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
}

/// A fetched message together with any analysis the upstream provider
/// already attached to it
#[derive(Debug, Clone)]
pub struct FetchedMessage {
    pub message: Message,
    /// Externally computed scores; the classifier passes these through
    /// unchanged when present
    pub analysis: Option<Classification>,
    /// Archival eligibility flagged by the upstream analyzer
    pub archive_hint: bool,
}

/// Closed set of main categories every classification maps into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Social,
    Promotional,
    Spam,
    Other,
    Unknown,
}

impl Category {
    /// Map a raw main-category segment (first dot-segment of an analyzer
    /// category string) into the closed set. Unrecognized values fall back
    /// to `Unknown`, never to an unmapped raw string.
    pub fn from_raw(segment: &str) -> Self {
        match segment {
            "work" => Category::Work,
            "personal" => Category::Personal,
            "social" => Category::Social,
            "promotion" | "promotional" => Category::Promotional,
            "spam" => Category::Spam,
            "update" | "other" => Category::Other,
            _ => Category::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Social => "social",
            Category::Promotional => "promotional",
            Category::Spam => "spam",
            Category::Other => "other",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Lenient parse matching the analyzer contract: anything that is not
    /// "high" or "medium" counts as low
    pub fn parse(raw: &str) -> Self {
        match raw {
            "high" => Urgency::High,
            "medium" => Urgency::Medium,
            _ => Urgency::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

impl Importance {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "high" => Importance::High,
            "medium" => Importance::Medium,
            _ => Importance::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
        }
    }
}

/// Category result: a dot-delimited category string (e.g. "work.task")
/// plus scoring detail from the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion_score: Option<f32>,
}

impl CategoryResult {
    /// First dot-segment of the raw category string
    pub fn main_segment(&self) -> &str {
        self.category.split('.').next().unwrap_or("")
    }

    /// Optional second dot-segment, used for composite labels and finer
    /// response selection
    pub fn sub_category(&self) -> Option<&str> {
        self.category.split('.').nth(1).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgencyResult {
    pub urgency: Urgency,
    pub score: f32,
    #[serde(default)]
    pub factors: HashMap<String, f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportanceResult {
    pub importance: Importance,
    pub score: f32,
    #[serde(default)]
    pub factors: HashMap<String, f32>,
}

/// Full classification of one message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: CategoryResult,
    pub urgency: UrgencyResult,
    pub importance: ImportanceResult,
}

impl Classification {
    /// Main category mapped into the closed set
    pub fn main_category(&self) -> Category {
        Category::from_raw(self.category.main_segment())
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.category.sub_category()
    }

    pub fn is_urgent(&self) -> bool {
        self.urgency.urgency == Urgency::High
    }

    pub fn is_important(&self) -> bool {
        self.importance.importance == Importance::High
    }
}

/// Labeling policy outcome. `labels_to_apply` and `label_ids` are parallel
/// sequences: same length, same order. A label whose id could not be
/// resolved appears in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDecision {
    pub labels_to_apply: Vec<String>,
    pub label_ids: Vec<String>,
    pub should_archive: bool,
}

/// Response policy outcome. Suppression is an explicit terminal decision,
/// not an error and not an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePlan {
    Reply(String),
    Suppressed,
}

impl ResponsePlan {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, ResponsePlan::Suppressed)
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            ResponsePlan::Reply(body) => Some(body),
            ResponsePlan::Suppressed => None,
        }
    }
}

/// Per-period counters accumulated by the aggregation store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateCounters {
    pub total_emails: u64,
    pub category_counts: HashMap<String, u64>,
    pub urgency_counts: HashMap<String, u64>,
    pub auto_responded_count: u64,
}

/// Aggregate report produced at flush time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub date: chrono::NaiveDate,
    pub total_emails: u64,
    pub category_counts: HashMap<String, u64>,
    pub urgency_counts: HashMap<String, u64>,
    pub auto_responded_count: u64,
}

impl Report {
    /// Plain-text rendering used for log lines and the simulator output.
    /// Actual webhook formatting belongs to the notification sink.
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Email summary for {}", self.date));
        lines.push(format!("Total emails: {}", self.total_emails));

        let mut categories: Vec<_> = self.category_counts.iter().collect();
        categories.sort_by(|a, b| a.0.cmp(b.0));
        for (category, count) in categories {
            lines.push(format!("  category {}: {}", category, count));
        }

        let mut urgencies: Vec<_> = self.urgency_counts.iter().collect();
        urgencies.sort_by(|a, b| a.0.cmp(b.0));
        for (urgency, count) in urgencies {
            lines.push(format!("  urgency {}: {}", urgency, count));
        }

        lines.push(format!("Auto-responded: {}", self.auto_responded_count));
        lines.join("\n")
    }
}
