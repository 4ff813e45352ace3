use thiserror::Error;

/// Type alias for Result with TriageError
pub type Result<T> = std::result::Result<T, TriageError>;

/// Error types for the email triage pipeline
#[derive(Error, Debug)]
pub enum TriageError {
    /// Webhook payload could not be decoded into a notification reference
    #[error("Malformed notification payload: {0}")]
    Decode(String),

    /// Message referenced by a notification does not exist (anymore)
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Mail gateway failed to fetch message content
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Label find-or-create failed at the mail gateway
    #[error("Label resolution failed for '{name}': {message}")]
    LabelResolution { name: String, message: String },

    /// Applying labels or archiving a message failed
    #[error("Label application failed: {0}")]
    LabelApply(String),

    /// Sending an auto-response failed
    #[error("Send failed: {0}")]
    Send(String),

    /// Publishing the aggregate report to the notification sink failed
    #[error("Report publish failed: {0}")]
    Publish(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (config files, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TriageError {
    /// Check if the error is transient: an external collaborator failed in a
    /// way that a later event (or the next flush cycle) may succeed at.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TriageError::Fetch(_)
                | TriageError::LabelResolution { .. }
                | TriageError::LabelApply(_)
                | TriageError::Send(_)
                | TriageError::Publish(_)
        )
    }

    /// Check if the error is permanent for this event (bad payload,
    /// missing message, broken configuration)
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}
