//! Auto-response policy
//!
//! A deterministic state machine over (main category, sub-category,
//! urgency, importance) selecting a fixed reply template or suppressing the
//! response. Suppression is a policy decision, never a failure: promotional
//! mail, spam and plain updates simply get no reply.

use crate::config::ResponderConfig;
use crate::models::{Classification, ResponsePlan};

pub struct ResponsePolicy {
    display_name: String,
    enabled: bool,
}

impl ResponsePolicy {
    pub fn new(config: &ResponderConfig) -> Self {
        Self {
            display_name: config.display_name.clone(),
            enabled: config.enabled,
        }
    }

    /// Select a reply template for a classification, or suppress.
    ///
    /// Keyed on the raw main-category segment (not the mapped label
    /// category): an `update.notification` suppresses or acks on its own
    /// terms even though its label category is `Other`.
    pub fn respond(&self, classification: &Classification) -> ResponsePlan {
        if !self.enabled {
            return ResponsePlan::Suppressed;
        }

        let name = &self.display_name;
        let sub = classification.sub_category();
        let is_urgent = classification.is_urgent();
        let is_important = classification.is_important();

        let body = match classification.category.main_segment() {
            "work" => match sub {
                Some("task") => {
                    if is_urgent {
                        format!("Hi,\n\nThank you for assigning me this task. I've noted this as urgent and will work on it as soon as possible.\n\nRegards, {}", name)
                    } else {
                        format!("Hi,\n\nThank you for assigning me this task. I'll review it and get back to you with updates.\n\nRegards, {}", name)
                    }
                }
                Some("meeting") => format!("Hi,\n\nThank you for the meeting invitation. I've received it and will confirm my availability shortly.\n\nRegards, {}", name),
                Some("update") => format!("Hi,\n\nThank you for the update. I've noted the information and will review it in detail.\n\nRegards, {}", name),
                _ => {
                    if is_urgent {
                        format!("Hi,\n\nThank you for your work-related email. I've noted this as urgent and will address it as soon as possible.\n\nRegards, {}", name)
                    } else {
                        format!("Hi,\n\nThank you for your work-related email. I'll review it and get back to you soon.\n\nRegards, {}", name)
                    }
                }
            },

            "personal" => match sub {
                Some("finance") => format!("Hi,\n\nThank you for your message regarding financial matters. I'll read it carefully and respond when I can.\n\nBest, {}", name),
                Some("health") => format!("Hi,\n\nThank you for your health-related message. I'll give this my attention as soon as possible.\n\nBest, {}", name),
                Some("family") => format!("Hi,\n\nThanks for your family-related message! I'll read it properly and get back to you.\n\nBest, {}", name),
                _ => format!("Hi,\n\nThanks for your personal message! I'll read it properly and get back to you when I can.\n\nBest, {}", name),
            },

            "social" => match sub {
                Some("event") => format!("Hi,\n\nThanks for the event information! I'll check my schedule and let you know.\n\nBest, {}", name),
                Some("networking") => format!("Hi,\n\nI appreciate you reaching out to connect. I'll review your message and respond soon.\n\nBest, {}", name),
                _ => format!("Thanks for the social update. I'll check it out soon! {}", name),
            },

            // No reply to marketing or promotional mail
            "promotion" | "promotional" => return ResponsePlan::Suppressed,

            "update" => {
                if sub == Some("notification") && is_important {
                    format!("Thank you for the important notification. I've received it and will take appropriate action.\n\nRegards, {}", name)
                } else {
                    // Plain updates and newsletters get no reply
                    return ResponsePlan::Suppressed;
                }
            }

            "spam" => return ResponsePlan::Suppressed,

            _ => format!("Hi,\n\nThank you for your email. I'll review it and respond appropriately.\n\nBest regards, {}", name),
        };

        ResponsePlan::Reply(body)
    }
}
