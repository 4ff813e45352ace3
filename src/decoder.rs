//! Webhook notification decoder
//!
//! Turns a raw, provider-defined webhook envelope into a normalized
//! [`NotificationRef`]. Two shapes are understood: a flat JSON body carrying
//! `messageId`/`threadId` directly, and a Pub/Sub push envelope whose
//! base64-encoded `message.data` embeds `{emailAddress, historyId}`.

use base64::{engine::general_purpose::STANDARD, engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TriageError};
use crate::models::{NotificationContext, NotificationRef};

#[derive(Debug, Deserialize)]
struct FlatBody {
    #[serde(rename = "messageId")]
    message_id: String,
    #[serde(rename = "threadId")]
    thread_id: String,
}

#[derive(Debug, Deserialize)]
struct PushEnvelope {
    message: PushMessage,
}

#[derive(Debug, Deserialize)]
struct PushMessage {
    data: String,
    #[serde(rename = "messageId")]
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct PushData {
    #[serde(rename = "emailAddress")]
    email_address: Option<String>,
    #[serde(rename = "historyId", deserialize_with = "deserialize_history_id")]
    history_id: u64,
}

/// Providers serialize `historyId` inconsistently as a JSON number or a
/// decimal string; accept both.
fn deserialize_history_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| D::Error::custom("historyId out of range")),
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|e| D::Error::custom(format!("invalid historyId: {}", e))),
        other => Err(D::Error::custom(format!(
            "historyId must be a number or string, got {}",
            other
        ))),
    }
}

/// Decode a raw webhook payload into a notification reference.
///
/// Structured-field extraction is attempted first; only when the flat shape
/// is absent does the decoder fall back to unwrapping the base64 envelope.
/// Failure never produces side effects: no fetch, no counter updates.
pub fn decode(raw: &Value) -> Result<NotificationRef> {
    if let Ok(flat) = serde_json::from_value::<FlatBody>(raw.clone()) {
        return Ok(NotificationRef {
            message_id: flat.message_id,
            context: NotificationContext::Thread {
                thread_id: flat.thread_id,
            },
        });
    }

    let envelope: PushEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| TriageError::Decode(format!("unrecognized envelope shape: {}", e)))?;

    let bytes = decode_base64(&envelope.message.data)?;

    let data: PushData = serde_json::from_slice(&bytes)
        .map_err(|e| TriageError::Decode(format!("embedded JSON invalid: {}", e)))?;

    Ok(NotificationRef {
        message_id: envelope.message.message_id,
        context: NotificationContext::History {
            history_id: data.history_id,
            email_address: data.email_address,
        },
    })
}

/// Push envelopes are standard base64 in practice, but some relays re-encode
/// with the URL-safe alphabet; try both before giving up.
fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(data)
        .or_else(|_| URL_SAFE_NO_PAD.decode(data.trim_end_matches('=')))
        .map_err(|e| TriageError::Decode(format!("invalid base64 payload: {}", e)))
}
