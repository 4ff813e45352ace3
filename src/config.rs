use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TriageError};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TriageConfig {
    #[serde(default)]
    pub responder: ResponderConfig,
    #[serde(default)]
    pub labels: LabelPolicyConfig,
}

/// Auto-responder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Display name signed under every reply template
    #[serde(default = "default_display_name")]
    pub display_name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            display_name: default_display_name(),
            enabled: default_enabled(),
        }
    }
}

/// Optional labeling extensions: composite sub-category labels and
/// analyzer-hinted archival
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelPolicyConfig {
    #[serde(default = "default_subcategory_labels")]
    pub subcategory_labels: bool,
    #[serde(default = "default_archival")]
    pub archival: bool,
}

impl Default for LabelPolicyConfig {
    fn default() -> Self {
        Self {
            subcategory_labels: default_subcategory_labels(),
            archival: default_archival(),
        }
    }
}

fn default_display_name() -> String {
    "Email Assistant".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_subcategory_labels() -> bool {
    true
}

fn default_archival() -> bool {
    true
}

impl TriageConfig {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TriageError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| TriageError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TriageError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TriageError::Config(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| TriageError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.responder.enabled && self.responder.display_name.trim().is_empty() {
            return Err(TriageError::Config(
                "responder.display_name must not be empty while the responder is enabled"
                    .to_string(),
            ));
        }
        Ok(())
    }
}
