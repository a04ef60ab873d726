use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::ApiError;

/// Canonical in-app notification. Everything downstream of the feed's
/// ingestion boundary sees only this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub message_id: String,
    pub subject: String,
    pub body: String,
    pub notification_type: Option<String>,
    pub appointment_id: Option<i64>,
    pub decline_reason: Option<String>,
    pub is_read: bool,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Timestamp used for ordering and display. Undated notifications
    /// sort last.
    pub fn sort_ts(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationPayload {
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, rename = "type")]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub appointment_id: Option<i64>,
    #[serde(default)]
    pub decline_reason: Option<String>,
}

/// Wire shape of one in-app message. The listing endpoint has shipped two
/// formats: an envelope with a nested `payload`, and a flat record. Both
/// are accepted here and nowhere else.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NotificationEnvelope {
    Wrapped {
        message_id: String,
        payload: NotificationPayload,
        #[serde(default)]
        is_read: bool,
        #[serde(default)]
        sent_at: Option<DateTime<Utc>>,
        #[serde(default)]
        created_at: Option<DateTime<Utc>>,
    },
    Flat {
        message_id: String,
        subject: String,
        #[serde(default)]
        body: String,
        #[serde(default, rename = "type")]
        notification_type: Option<String>,
        #[serde(default)]
        appointment_id: Option<i64>,
        #[serde(default)]
        decline_reason: Option<String>,
        #[serde(default)]
        is_read: bool,
        #[serde(default)]
        sent_at: Option<DateTime<Utc>>,
        #[serde(default)]
        created_at: Option<DateTime<Utc>>,
    },
}

impl NotificationEnvelope {
    pub fn normalize(self) -> Notification {
        match self {
            NotificationEnvelope::Wrapped {
                message_id,
                payload,
                is_read,
                sent_at,
                created_at,
            } => Notification {
                message_id,
                subject: payload.subject,
                body: payload.body,
                notification_type: payload.notification_type,
                appointment_id: payload.appointment_id,
                decline_reason: payload.decline_reason,
                is_read,
                sent_at: sent_at.or(created_at),
            },
            NotificationEnvelope::Flat {
                message_id,
                subject,
                body,
                notification_type,
                appointment_id,
                decline_reason,
                is_read,
                sent_at,
                created_at,
            } => Notification {
                message_id,
                subject,
                body,
                notification_type,
                appointment_id,
                decline_reason,
                is_read,
                sent_at: sent_at.or(created_at),
            },
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NotificationError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Notification not found")]
    NotFound,
}

impl From<ApiError> for NotificationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(msg) | ApiError::Decode(msg) => NotificationError::Transport(msg),
            ApiError::NotFound(_) => NotificationError::NotFound,
            ApiError::Auth(msg) => NotificationError::Rejected(msg),
            ApiError::Rejected { message, .. } => NotificationError::Rejected(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_envelope_normalizes() {
        let raw = r#"{
            "message_id": "m-1",
            "payload": {
                "subject": "Appointment confirmed",
                "body": "See you on the 12th",
                "type": "appointment_update",
                "appointment_id": 55
            },
            "is_read": false,
            "sent_at": "2026-08-07T10:00:00Z"
        }"#;
        let envelope: NotificationEnvelope = serde_json::from_str(raw).expect("wrapped parses");
        let n = envelope.normalize();
        assert_eq!(n.message_id, "m-1");
        assert_eq!(n.subject, "Appointment confirmed");
        assert_eq!(n.appointment_id, Some(55));
        assert!(!n.is_read);
    }

    #[test]
    fn test_flat_envelope_normalizes() {
        let raw = r#"{
            "message_id": "m-2",
            "subject": "Appointment declined",
            "body": "Provider unavailable",
            "decline_reason": "on leave",
            "is_read": true,
            "created_at": "2026-08-06T08:00:00Z"
        }"#;
        let envelope: NotificationEnvelope = serde_json::from_str(raw).expect("flat parses");
        let n = envelope.normalize();
        assert_eq!(n.message_id, "m-2");
        assert_eq!(n.decline_reason.as_deref(), Some("on leave"));
        assert!(n.is_read);
        assert!(n.sent_at.is_some());
    }

    #[test]
    fn test_sent_at_falls_back_to_created_at() {
        let raw = r#"{
            "message_id": "m-3",
            "payload": { "subject": "Reminder" },
            "created_at": "2026-08-05T08:00:00Z"
        }"#;
        let envelope: NotificationEnvelope = serde_json::from_str(raw).expect("parses");
        let n = envelope.normalize();
        assert!(n.sent_at.is_some());
    }
}
