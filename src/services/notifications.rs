use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use rusqlite::Connection;
use sha1::Sha1;
use tokio::sync::broadcast;

use crate::db::queries;
use crate::models::{NewNotification, Notification};

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &NewNotification) -> anyhow::Result<()>;
}

/// Fans a notification out to every sink. Delivery is best effort: a failing
/// sink is logged and skipped, and the caller never sees the error.
#[derive(Clone, Default)]
pub struct NotificationEmitter {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationEmitter {
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub async fn emit(&self, notification: NewNotification) {
        for sink in &self.sinks {
            if let Err(e) = sink.deliver(&notification).await {
                tracing::warn!(
                    error = %e,
                    title = %notification.title,
                    ref_id = %notification.ref_id,
                    "notification delivery failed"
                );
            }
        }
    }
}

/// Stores notifications for the staff dashboard and pushes them to live
/// subscribers.
pub struct StoreNotificationSink {
    db: Arc<Mutex<Connection>>,
    tx: broadcast::Sender<Notification>,
}

impl StoreNotificationSink {
    pub fn new(db: Arc<Mutex<Connection>>, tx: broadcast::Sender<Notification>) -> Self {
        Self { db, tx }
    }
}

#[async_trait]
impl NotificationSink for StoreNotificationSink {
    async fn deliver(&self, notification: &NewNotification) -> anyhow::Result<()> {
        let stored = {
            let db = self
                .db
                .lock()
                .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
            queries::insert_notification(&db, notification)?
        };
        // No subscribers is fine
        let _ = self.tx.send(stored);
        Ok(())
    }
}

/// Posts notifications as JSON to an external endpoint.
pub struct WebhookNotificationSink {
    url: String,
    secret: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotificationSink {
    pub fn new(url: String, secret: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook client")?;
        Ok(Self {
            url,
            secret,
            client,
        })
    }
}

pub fn sign_payload(secret: &str, body: &[u8]) -> anyhow::Result<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid webhook secret: {e}"))?;
    mac.update(body);
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl NotificationSink for WebhookNotificationSink {
    async fn deliver(&self, notification: &NewNotification) -> anyhow::Result<()> {
        let body = serde_json::to_vec(notification)?;

        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(secret) = &self.secret {
            request = request.header("X-Clinic-Signature", sign_payload(secret, &body)?);
        }

        request
            .body(body)
            .send()
            .await
            .context("failed to post notification webhook")?
            .error_for_status()
            .context("notification webhook returned error")?;

        Ok(())
    }
}
