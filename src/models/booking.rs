use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::WallClockTime;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub time: WallClockTime,
    pub status: BookingStatus,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            BookingStatus::Completed | BookingStatus::Cancelled => true,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::InProgress => false,
        }
    }

    /// Whether a booking in this status keeps its slot reserved.
    pub fn occupies_slot(&self) -> bool {
        !self.is_terminal()
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending | Confirmed | InProgress, Cancelled) => true,
            (Pending, Confirmed) => true,
            (Confirmed, InProgress) => true,
            (InProgress, Completed) => true,
            _ => false,
        }
    }
}

/// Booking form as submitted by a client. Every field defaults to empty so
/// that absent fields surface as validation errors rather than parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingRequest {
    pub name: String,
    pub phone: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub email: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<String>,
}

/// A request that passed every submission check and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub service_id: String,
    pub date: NaiveDate,
    pub time: WallClockTime,
    pub status: BookingStatus,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: Option<String>,
    pub message: Option<String>,
    pub user_id: Option<String>,
}

impl ValidatedBooking {
    pub fn into_booking(self, id: String, now: NaiveDateTime) -> Booking {
        Booking {
            id,
            service_id: self.service_id,
            date: self.date,
            time: self.time,
            status: self.status,
            client_name: self.client_name,
            client_phone: self.client_phone,
            client_email: self.client_email,
            message: self.message,
            user_id: self.user_id,
            created_at: now,
            updated_at: now,
        }
    }
}
