//! Labeling policy
//!
//! Maps a classification to the ordered set of display labels to apply and
//! an archive decision. Category and urgency mappings are fixed lookup
//! tables; composite sub-category labels and archival are optional
//! extensions controlled by configuration.

use crate::config::LabelPolicyConfig;
use crate::error::Result;
use crate::gateway::MailGateway;
use crate::models::{Category, Classification, LabelDecision, Urgency};

/// Display label for a main category
pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Work => "Work",
        Category::Personal => "Personal",
        Category::Spam => "Spam",
        Category::Unknown => "Unknown",
        Category::Promotional => "Promotional",
        Category::Social => "Social",
        Category::Other => "Other",
    }
}

/// Display label for an urgency tier
pub fn urgency_label(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "Urgent",
        Urgency::Medium => "Normal",
        Urgency::Low => "Low-Priority",
    }
}

/// Composite label for a sub-category, e.g. ("work", "meeting") -> "Work-Meeting"
pub fn composite_label(category: Category, sub_category: &str) -> String {
    format!(
        "{}-{}",
        category_label(category),
        capitalize(sub_category)
    )
}

/// Distinct label name used when a message is archived
pub fn archive_label_name(category: Category) -> String {
    format!("Archived_{}", category_label(category))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub struct LabelingPolicy {
    subcategory_labels: bool,
    archival: bool,
}

impl LabelingPolicy {
    pub fn new(config: &LabelPolicyConfig) -> Self {
        Self {
            subcategory_labels: config.subcategory_labels,
            archival: config.archival,
        }
    }

    /// Decide which labels to apply and whether to archive.
    ///
    /// Resolution order is fixed: sub-category composite label (when
    /// enabled and present), then category label, then urgency label.
    /// Each name goes through the gateway's idempotent find-or-create;
    /// a name that resolves to an empty id is dropped from both parallel
    /// sequences. A failed resolution aborts the labeling stage.
    pub async fn decide(
        &self,
        classification: &Classification,
        archive_hint: bool,
        gateway: &dyn MailGateway,
    ) -> Result<LabelDecision> {
        let category = classification.main_category();
        let mut decision = LabelDecision::default();

        if self.subcategory_labels {
            if let Some(sub) = classification.sub_category() {
                let name = composite_label(category, sub);
                resolve_into(&mut decision, &name, gateway).await?;
            }
        }

        resolve_into(&mut decision, category_label(category), gateway).await?;
        resolve_into(
            &mut decision,
            urgency_label(classification.urgency.urgency),
            gateway,
        )
        .await?;

        decision.should_archive = matches!(category, Category::Promotional | Category::Spam)
            || (self.archival && archive_hint);

        Ok(decision)
    }
}

async fn resolve_into(
    decision: &mut LabelDecision,
    name: &str,
    gateway: &dyn MailGateway,
) -> Result<()> {
    let id = gateway.resolve_label(name).await?;
    if id.is_empty() {
        tracing::warn!(label = name, "label resolved without an id, dropping");
        return Ok(());
    }
    tracing::debug!(label = name, id = %id, "label resolved");
    decision.labels_to_apply.push(name.to_string());
    decision.label_ids.push(id);
    Ok(())
}
