use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "error" => NotificationKind::Error,
            _ => NotificationKind::Info,
        }
    }
}

/// Event handed to notification sinks. `ref_id` is empty when the event
/// does not point at a stored record (e.g. a failed booking attempt).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "ref")]
    pub reference: String,
    pub ref_id: String,
}

impl NewNotification {
    pub fn booking_created(booking_id: &str, client_name: &str, when: &str) -> Self {
        Self {
            title: "New booking".to_string(),
            message: format!("{client_name} booked {when}"),
            kind: NotificationKind::Info,
            reference: "booking".to_string(),
            ref_id: booking_id.to_string(),
        }
    }

    pub fn booking_failed(reason: &str) -> Self {
        Self {
            title: "Booking failed".to_string(),
            message: reason.to_string(),
            kind: NotificationKind::Error,
            reference: "booking".to_string(),
            ref_id: String::new(),
        }
    }

    pub fn booking_cancelled(booking_id: &str, client_name: &str, when: &str) -> Self {
        Self {
            title: "Booking cancelled".to_string(),
            message: format!("{client_name} cancelled {when}"),
            kind: NotificationKind::Info,
            reference: "booking".to_string(),
            ref_id: booking_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "ref")]
    pub reference: String,
    pub ref_id: String,
    pub is_read: bool,
    pub created_at: String,
}
