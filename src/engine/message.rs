//! Synthetic messages.
//!
//! A well-formed body is a small JSON document. The corrupted variant is the
//! same document cut in half, which downstream processors fail to parse.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MESSAGE_SOURCE: &str = "telemetry-loadgen";

/// Why a message was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Emitted by the run loop.
    Loop,
    /// Run loop message whose body was deliberately broken.
    Corrupted,
    /// Emitted by a manual invoke-once call.
    Single,
}

impl MessageKind {
    /// FIFO message group. Keeps corrupted and manual traffic in their own
    /// ordering lanes on the queue.
    pub fn group_id(self) -> &'static str {
        match self {
            MessageKind::Loop => "telemetry-hub-loadgen",
            MessageKind::Corrupted => "telemetry-hub-loadgen-corrupted",
            MessageKind::Single => "telemetry-hub-single",
        }
    }
}

/// A fabricated payload, owned by the send call that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticMessage {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub body: String,
    pub kind: MessageKind,
}

/// Structure of a well-formed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageBody {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub kind: MessageKind,
    pub payload: String,
}

impl SyntheticMessage {
    /// Build a fresh, well-formed message.
    pub fn generate(kind: MessageKind) -> Self {
        let id = Uuid::new_v4();
        let generated_at = Utc::now();
        let payload = match kind {
            MessageKind::Single => format!("Single invocation at {}", generated_at.to_rfc3339()),
            _ => format!("LoadGen message at {}", generated_at.to_rfc3339()),
        };
        let body = serde_json::json!({
            "id": id,
            "generated_at": generated_at,
            "source": MESSAGE_SOURCE,
            "kind": kind,
            "payload": payload,
        })
        .to_string();

        Self {
            id,
            generated_at,
            body,
            kind,
        }
    }

    /// Replace the body with a truncated copy that no longer parses.
    pub fn into_corrupted(self) -> Self {
        let mut cut = self.body.len() / 2;
        while !self.body.is_char_boundary(cut) {
            cut -= 1;
        }
        Self {
            body: self.body[..cut].to_string(),
            kind: MessageKind::Corrupted,
            ..self
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.kind == MessageKind::Corrupted
    }
}

/// Structural check a downstream consumer would apply.
pub fn is_well_formed(body: &str) -> bool {
    serde_json::from_str::<MessageBody>(body)
        .map(|parsed| parsed.source == MESSAGE_SOURCE)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_body_is_well_formed() {
        let message = SyntheticMessage::generate(MessageKind::Loop);
        assert!(is_well_formed(&message.body));

        let parsed: MessageBody = serde_json::from_str(&message.body).unwrap();
        assert_eq!(parsed.id, message.id);
        assert_eq!(parsed.kind, MessageKind::Loop);
        assert!(parsed.payload.starts_with("LoadGen message at"));
    }

    #[test]
    fn test_corrupted_body_fails_check() {
        let message = SyntheticMessage::generate(MessageKind::Loop);
        let id = message.id;
        let corrupted = message.into_corrupted();

        assert!(corrupted.is_corrupted());
        assert_eq!(corrupted.id, id);
        assert!(!corrupted.body.is_empty());
        assert!(!is_well_formed(&corrupted.body));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = SyntheticMessage::generate(MessageKind::Single);
        let b = SyntheticMessage::generate(MessageKind::Single);
        assert_ne!(a.id, b.id);
        assert_eq!(a.kind.group_id(), "telemetry-hub-single");
    }

    #[test]
    fn test_foreign_json_is_not_well_formed() {
        assert!(!is_well_formed(r#"{"hello": "world"}"#));
        assert!(!is_well_formed("This is a corrupted message."));
    }
}
