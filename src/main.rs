use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clinic_booking::config::AppConfig;
use clinic_booking::db;
use clinic_booking::handlers;
use clinic_booking::services::notifications::{
    NotificationEmitter, StoreNotificationSink, WebhookNotificationSink,
};
use clinic_booking::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let db = Arc::new(Mutex::new(conn));

    let (notifications_tx, _) = broadcast::channel(256);

    let mut notifier = NotificationEmitter::default().with_sink(Arc::new(
        StoreNotificationSink::new(db.clone(), notifications_tx.clone()),
    ));
    if let Some(url) = &config.notification_webhook_url {
        tracing::info!("forwarding notifications to webhook (url: {url})");
        notifier = notifier.with_sink(Arc::new(WebhookNotificationSink::new(
            url.clone(),
            config.notification_webhook_secret.clone(),
            Duration::from_secs(config.notification_timeout_secs),
        )?));
    }

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        notifier,
        notifications_tx,
    });

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
