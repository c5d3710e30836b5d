use std::env;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_token: String,
    pub clinic_name: String,
    pub clinic_utc_offset_minutes: i32,
    pub notification_webhook_url: Option<String>,
    pub notification_webhook_secret: Option<String>,
    pub notification_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "clinic.db".to_string()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            clinic_name: env::var("CLINIC_NAME").unwrap_or_else(|_| "Dental Clinic".to_string()),
            // Cairo
            clinic_utc_offset_minutes: env::var("CLINIC_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            notification_webhook_secret: env::var("NOTIFICATION_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            notification_timeout_secs: env::var("NOTIFICATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    /// Today's calendar date at the clinic, independent of the server's zone.
    pub fn clinic_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.clinic_offset()).date_naive()
    }
}
