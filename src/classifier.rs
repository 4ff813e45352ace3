//! Deterministic email classification
//!
//! Derives category, urgency and importance for a fetched message. When the
//! upstream analyzer already attached scores they pass through unchanged;
//! otherwise keyword/regex heuristics over subject, snippet and label ids
//! decide. Falling back to the heuristic defaults is expected behavior, not
//! a failure mode.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::models::{
    Category, CategoryResult, Classification, Importance, ImportanceResult, Message, Urgency,
    UrgencyResult,
};

struct ContentPatterns {
    work: Regex,
    personal: Regex,
    social: Regex,
    promotional: Regex,
    urgent: Regex,
    important: Regex,
    critical: Regex,
    noteworthy: Regex,
}

static CONTENT_PATTERNS: Lazy<ContentPatterns> = Lazy::new(|| ContentPatterns {
    work: Regex::new(r"(?i)(work|task|project|deadline|meeting|presentation)").unwrap(),

    personal: Regex::new(r"(?i)(personal|family|friend|vacation|holiday)").unwrap(),

    social: Regex::new(r"(?i)(social|event|party|gathering|meetup)").unwrap(),

    promotional: Regex::new(r"(?i)(deal|discount|offer|subscription|newsletter|unsubscribe)")
        .unwrap(),

    urgent: Regex::new(r"(?i)(urgent|asap|emergency|immediately|deadline|today)").unwrap(),

    important: Regex::new(r"(?i)(important|priority|attention|soon)").unwrap(),

    critical: Regex::new(r"(?i)(important|critical|essential|key|crucial)").unwrap(),

    noteworthy: Regex::new(r"(?i)(significant|noteworthy|relevant)").unwrap(),
});

/// Label-id substrings checked before any content heuristics, in order
static LABEL_CATEGORIES: &[(&str, Category)] = &[
    ("work", Category::Work),
    ("personal", Category::Personal),
    ("social", Category::Social),
    ("promotions", Category::Promotional),
    ("spam", Category::Spam),
];

const LABEL_MATCH_CONFIDENCE: f32 = 0.9;
const KEYWORD_MATCH_CONFIDENCE: f32 = 0.6;

pub struct Classifier {
    // Heuristic tables are process-wide statics; no per-instance state yet
}

impl Classifier {
    pub fn new() -> Self {
        Self {}
    }

    /// Classify a message. Externally supplied scores are never overridden.
    pub fn classify(&self, message: &Message, external: Option<Classification>) -> Classification {
        if let Some(scores) = external {
            tracing::debug!(
                message_id = %message.message_id,
                category = %scores.category.category,
                "using externally supplied classification"
            );
            return scores;
        }

        let content = format!("{} {}", message.subject, message.snippet);

        Classification {
            category: self.detect_category(message, &content),
            urgency: self.detect_urgency(&content),
            importance: self.detect_importance(&content),
        }
    }

    /// Category precedence: label ids first, then ordered keyword sets over
    /// subject + snippet, then the `unknown` fallback
    fn detect_category(&self, message: &Message, content: &str) -> CategoryResult {
        for (needle, category) in LABEL_CATEGORIES {
            let matched = message
                .label_ids
                .iter()
                .any(|id| id.to_lowercase().contains(needle));
            if matched {
                return CategoryResult {
                    category: category.as_str().to_string(),
                    confidence: LABEL_MATCH_CONFIDENCE,
                    alternative: None,
                    promotion_score: None,
                };
            }
        }

        let keyword_sets = [
            (&CONTENT_PATTERNS.work, Category::Work),
            (&CONTENT_PATTERNS.personal, Category::Personal),
            (&CONTENT_PATTERNS.social, Category::Social),
            (&CONTENT_PATTERNS.promotional, Category::Promotional),
        ];

        for (pattern, category) in keyword_sets {
            if pattern.is_match(content) {
                return CategoryResult {
                    category: category.as_str().to_string(),
                    confidence: KEYWORD_MATCH_CONFIDENCE,
                    alternative: None,
                    promotion_score: None,
                };
            }
        }

        CategoryResult {
            category: Category::Unknown.as_str().to_string(),
            confidence: 0.0,
            alternative: None,
            promotion_score: None,
        }
    }

    fn detect_urgency(&self, content: &str) -> UrgencyResult {
        let mut factors = HashMap::new();

        if CONTENT_PATTERNS.urgent.is_match(content) {
            factors.insert("subject_keyword_urgent".to_string(), 1.0);
            return UrgencyResult {
                urgency: Urgency::High,
                score: 0.9,
                factors,
            };
        }

        if CONTENT_PATTERNS.important.is_match(content) {
            factors.insert("keyword_score".to_string(), 0.5);
            return UrgencyResult {
                urgency: Urgency::Medium,
                score: 0.5,
                factors,
            };
        }

        factors.insert("low_urgency_modifier".to_string(), -0.2);
        UrgencyResult {
            urgency: Urgency::Low,
            score: 0.1,
            factors,
        }
    }

    fn detect_importance(&self, content: &str) -> ImportanceResult {
        let mut factors = HashMap::new();

        if CONTENT_PATTERNS.critical.is_match(content) {
            factors.insert("keyword_critical".to_string(), 1.0);
            return ImportanceResult {
                importance: Importance::High,
                score: 0.9,
                factors,
            };
        }

        if CONTENT_PATTERNS.noteworthy.is_match(content) {
            factors.insert("keyword_noteworthy".to_string(), 0.5);
            return ImportanceResult {
                importance: Importance::Medium,
                score: 0.5,
                factors,
            };
        }

        ImportanceResult {
            importance: Importance::Low,
            score: 0.1,
            factors,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
