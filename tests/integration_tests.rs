use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Datelike, NaiveDate};
use tokio::sync::broadcast;
use tower::ServiceExt;

use clinic_booking::config::AppConfig;
use clinic_booking::db;
use clinic_booking::db::queries;
use clinic_booking::handlers;
use clinic_booking::models::{ClinicService, NewNotification, NotificationKind};
use clinic_booking::services::notifications::{
    NotificationEmitter, NotificationSink, StoreNotificationSink,
};
use clinic_booking::state::AppState;

// ── Mock Sinks ──

struct RecordingSink {
    seen: Arc<Mutex<Vec<NewNotification>>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: &NewNotification) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn deliver(&self, _notification: &NewNotification) -> anyhow::Result<()> {
        anyhow::bail!("notification service unreachable")
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
        clinic_name: "Smile Dental".to_string(),
        clinic_utc_offset_minutes: 120,
        notification_webhook_url: None,
        notification_webhook_secret: None,
        notification_timeout_secs: 1,
    }
}

fn build_state(extra_sinks: Vec<Arc<dyn NotificationSink>>) -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    queries::save_service(
        &conn,
        &ClinicService {
            id: "cleaning".to_string(),
            title: "Teeth cleaning".to_string(),
            is_active: true,
        },
    )
    .unwrap();
    queries::save_service(
        &conn,
        &ClinicService {
            id: "implants".to_string(),
            title: "Implants".to_string(),
            is_active: false,
        },
    )
    .unwrap();

    let db = Arc::new(Mutex::new(conn));
    let (notifications_tx, _) = broadcast::channel(16);

    let mut notifier = NotificationEmitter::default().with_sink(Arc::new(
        StoreNotificationSink::new(db.clone(), notifications_tx.clone()),
    ));
    for sink in extra_sinks {
        notifier = notifier.with_sink(sink);
    }

    Arc::new(AppState {
        db,
        config: test_config(),
        notifier,
        notifications_tx,
    })
}

fn test_state() -> Arc<AppState> {
    build_state(vec![])
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

fn next_monday(state: &AppState) -> NaiveDate {
    let mut day = state.config.clinic_today().succ_opt().unwrap();
    while day.weekday() != chrono::Weekday::Mon {
        day = day.succ_opt().unwrap();
    }
    day
}

fn booking_body(date: NaiveDate, time: &str, phone: &str) -> String {
    serde_json::json!({
        "name": "Mona Adel",
        "phone": phone,
        "serviceId": "cleaning",
        "date": date.format("%Y-%m-%d").to_string(),
        "time": time,
        "email": "mona@example.com",
        "message": "Sensitive tooth"
    })
    .to_string()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, body: Option<String>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", "Bearer test-token");
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    send(state, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn book(state: &Arc<AppState>, date: NaiveDate, time: &str) -> (StatusCode, serde_json::Value) {
    send(
        state,
        post_json("/api/bookings", booking_body(date, time, "01012345678")),
    )
    .await
}

fn slot<'a>(availability: &'a serde_json::Value, start: &str) -> &'a serde_json::Value {
    availability["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["start"] == start)
        .unwrap()
}

// ── Public API ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, json) = get(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_services_lists_active_only() {
    let state = test_state();
    let (status, json) = get(&state, "/api/services").await;
    assert_eq!(status, StatusCode::OK);
    let services = json.as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["id"], "cleaning");
    assert_eq!(services[0]["isActive"], true);
}

#[tokio::test]
async fn test_default_schedule() {
    let state = test_state();
    let (status, json) = get(&state, "/api/schedule").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["monday"]["isClosed"], false);
    assert_eq!(json["monday"]["from"], "09:00 AM");
    assert_eq!(json["monday"]["to"], "05:00 PM");
    assert_eq!(json["friday"]["isClosed"], true);
}

#[tokio::test]
async fn test_availability_for_open_monday() {
    let state = test_state();
    let monday = next_monday(&state);
    let (status, json) = get(&state, &format!("/api/availability?date={monday}")).await;
    assert_eq!(status, StatusCode::OK);

    let slots = json["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0]["start"], "09:00 AM");
    assert_eq!(slots[15]["start"], "04:30 PM");
    assert!(slots.iter().all(|s| s["available"] == true));
    assert!(slots.iter().all(|s| s["date"] == monday.to_string()));
}

#[tokio::test]
async fn test_availability_bad_date() {
    let state = test_state();
    let (status, json) = get(&state, "/api/availability?date=16-06-2025").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_date");
}

#[tokio::test]
async fn test_booking_marks_slot_unavailable() {
    let state = test_state();
    let monday = next_monday(&state);

    let (status, json) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");
    assert_eq!(json["time"], "10:00 AM");
    assert_eq!(json["serviceId"], "cleaning");
    assert!(!json["id"].as_str().unwrap().is_empty());

    let (_, availability) = get(&state, &format!("/api/availability?date={monday}")).await;
    for s in availability["slots"].as_array().unwrap() {
        assert_eq!(s["available"], s["start"] != "10:00 AM");
    }
}

#[tokio::test]
async fn test_double_booking_rejected() {
    let state = test_state();
    let monday = next_monday(&state);

    let (status, _) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = send(
        &state,
        post_json("/api/bookings", booking_body(monday, "10:00 AM", "01198765432")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "slot_unavailable");
}

#[tokio::test]
async fn test_invalid_phone_rejected() {
    let state = test_state();
    let monday = next_monday(&state);
    let (status, json) = send(
        &state,
        post_json("/api/bookings", booking_body(monday, "10:00 AM", "0991234567")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_phone");
}

#[tokio::test]
async fn test_missing_field_rejected_first() {
    let state = test_state();
    let body = serde_json::json!({
        "name": "Mona",
        "serviceId": "cleaning",
        "date": "1999-01-01",
        "time": "10:00 AM"
    })
    .to_string();
    let (status, json) = send(&state, post_json("/api/bookings", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "missing_field");
    assert!(json["error"].as_str().unwrap().contains("phone"));
}

#[tokio::test]
async fn test_past_date_rejected() {
    let state = test_state();
    let last_week = state.config.clinic_today() - chrono::Duration::days(7);
    let (status, json) = book(&state, last_week, "10:00 AM").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "past_date");
}

#[tokio::test]
async fn test_closed_day_rejected() {
    let state = test_state();
    let friday = next_monday(&state) + chrono::Duration::days(4);
    let (status, json) = book(&state, friday, "10:00 AM").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "slot_unavailable");
}

#[tokio::test]
async fn test_inactive_service_rejected() {
    let state = test_state();
    let monday = next_monday(&state);
    let body = booking_body(monday, "10:00 AM", "01012345678").replace("cleaning", "implants");
    let (status, json) = send(&state, post_json("/api/bookings", body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn test_live_slot_index_blocks_duplicates() {
    let state = test_state();
    let monday = next_monday(&state);

    // A live booking the client snapshot never saw, written straight to the store
    {
        let db = state.db.lock().unwrap();
        db.execute(
            "INSERT INTO bookings (id, service_id, date, time, status, client_name, client_phone, created_at, updated_at)
             VALUES ('raw', 'cleaning', ?1, '10:00', 'pending', 'Other', '01500000000', '2025-01-01 00:00:00', '2025-01-01 00:00:00')",
            [monday.to_string()],
        )
        .unwrap();
        let duplicate = db.execute(
            "INSERT INTO bookings (id, service_id, date, time, status, client_name, client_phone, created_at, updated_at)
             VALUES ('raw2', 'cleaning', ?1, '10:00', 'confirmed', 'Other', '01500000000', '2025-01-01 00:00:00', '2025-01-01 00:00:00')",
            [monday.to_string()],
        );
        assert!(duplicate.is_err());
    }

    let (status, json) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "slot_unavailable");
}

// ── Client bookings & cancellation ──

#[tokio::test]
async fn test_client_cancellation_frees_slot() {
    let state = test_state();
    let monday = next_monday(&state);

    let (_, created) = book(&state, monday, "11:00 AM").await;
    let id = created["id"].as_str().unwrap().to_string();

    // Wrong phone looks like a missing booking
    let (status, _) = send(
        &state,
        post_json(
            &format!("/api/bookings/{id}/cancel"),
            r#"{"phone":"01199999999"}"#.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(
        &state,
        post_json(
            &format!("/api/bookings/{id}/cancel"),
            r#"{"phone":"01012345678"}"#.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "cancelled");

    let (_, availability) = get(&state, &format!("/api/availability?date={monday}")).await;
    assert_eq!(slot(&availability, "11:00 AM")["available"], true);

    // Cancelling twice is not a valid transition
    let (status, json) = send(
        &state,
        post_json(
            &format!("/api/bookings/{id}/cancel"),
            r#"{"phone":"01012345678"}"#.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "invalid_transition");

    // The freed slot can be booked again
    let (status, _) = book(&state, monday, "11:00 AM").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_client_bookings_listing() {
    let state = test_state();
    let monday = next_monday(&state);
    book(&state, monday, "09:00 AM").await;
    book(&state, monday, "09:30 AM").await;

    let (status, json) = get(&state, "/api/bookings/client?phone=01012345678").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 2);

    let (status, json) = get(&state, "/api/bookings/client?phone=01122222222").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.as_array().unwrap().is_empty());

    let (status, _) = get(&state, "/api/bookings/client").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Notifications ──

#[tokio::test]
async fn test_booking_emits_notification_with_id() {
    let seen = Arc::new(Mutex::new(vec![]));
    let state = build_state(vec![Arc::new(RecordingSink { seen: seen.clone() })]);
    let monday = next_monday(&state);

    let (_, created) = book(&state, monday, "10:00 AM").await;
    let id = created["id"].as_str().unwrap().to_string();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, NotificationKind::Info);
    assert_eq!(seen[0].ref_id, id);

    let (status, json) = send(&state, admin_request("GET", "/api/admin/notifications", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["refId"], id);
    assert_eq!(json[0]["type"], "info");
    assert_eq!(json[0]["isRead"], false);
}

#[tokio::test]
async fn test_failing_notification_sink_does_not_block_booking() {
    let state = build_state(vec![Arc::new(FailingSink)]);
    let monday = next_monday(&state);

    let (status, json) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["status"], "pending");
}

#[tokio::test]
async fn test_notification_store_failure_does_not_block_booking() {
    let seen = Arc::new(Mutex::new(vec![]));
    let state = build_state(vec![Arc::new(RecordingSink { seen: seen.clone() })]);
    let monday = next_monday(&state);

    {
        let db = state.db.lock().unwrap();
        db.execute_batch("DROP TABLE notifications;").unwrap();
    }

    let (status, _) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::CREATED);
    // Store sink failed, recording sink still received the event
    assert_eq!(seen.lock().unwrap().len(), 1);
}

fn assert_single_failure_notice(seen: &Arc<Mutex<Vec<NewNotification>>>) {
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, NotificationKind::Error);
    assert_eq!(seen[0].ref_id, "");
}

#[tokio::test]
async fn test_commit_race_returns_conflict_and_notifies() {
    let seen = Arc::new(Mutex::new(vec![]));
    let state = build_state(vec![Arc::new(RecordingSink { seen: seen.clone() })]);
    let monday = next_monday(&state);

    // Another client takes the slot between validation and insert
    {
        let db = state.db.lock().unwrap();
        db.execute_batch(
            "CREATE TRIGGER racer BEFORE INSERT ON bookings WHEN NEW.id <> 'racer'
             BEGIN
                 INSERT INTO bookings (id, service_id, date, time, status, client_name, client_phone, created_at, updated_at)
                 VALUES ('racer', NEW.service_id, NEW.date, NEW.time, 'pending', 'Other', '01500000000', NEW.created_at, NEW.updated_at);
             END;",
        )
        .unwrap();
    }

    let (status, json) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "slot_unavailable");
    assert_single_failure_notice(&seen);

    let (_, stored) = send(&state, admin_request("GET", "/api/admin/notifications", None)).await;
    assert_eq!(stored[0]["type"], "error");
    assert_eq!(stored[0]["refId"], "");
}

#[tokio::test]
async fn test_commit_storage_failure_returns_503_and_notifies() {
    let seen = Arc::new(Mutex::new(vec![]));
    let state = build_state(vec![Arc::new(RecordingSink { seen: seen.clone() })]);
    let monday = next_monday(&state);

    {
        let db = state.db.lock().unwrap();
        db.execute_batch(
            "CREATE TRIGGER broken_disk BEFORE INSERT ON bookings
             BEGIN
                 SELECT RAISE(ABORT, 'disk I/O error');
             END;",
        )
        .unwrap();
    }

    let (status, json) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "storage_unavailable");
    assert_single_failure_notice(&seen);
}

#[tokio::test]
async fn test_ledger_read_failure_returns_503_and_notifies() {
    let seen = Arc::new(Mutex::new(vec![]));
    let state = build_state(vec![Arc::new(RecordingSink { seen: seen.clone() })]);
    let monday = next_monday(&state);

    {
        let db = state.db.lock().unwrap();
        db.execute(
            "UPDATE clinic_schedule SET open_from = 'garbage' WHERE weekday = 'monday'",
            [],
        )
        .unwrap();
    }

    let (status, json) = book(&state, monday, "10:00 AM").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "storage_unavailable");
    assert_single_failure_notice(&seen);
}

#[tokio::test]
async fn test_rejected_input_emits_no_notification() {
    let seen = Arc::new(Mutex::new(vec![]));
    let state = build_state(vec![Arc::new(RecordingSink { seen: seen.clone() })]);
    let monday = next_monday(&state);

    let (status, _) = send(
        &state,
        post_json("/api/bookings", booking_body(monday, "10:00 AM", "0991234567")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_limit_is_clamped() {
    let state = test_state();
    let monday = next_monday(&state);
    book(&state, monday, "10:00 AM").await;
    book(&state, monday, "10:30 AM").await;

    let (status, json) = send(
        &state,
        admin_request("GET", "/api/admin/notifications?limit=-1", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, json) = send(&state, admin_request("GET", "/api/admin/notifications", None)).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_mark_notification_read() {
    let state = test_state();
    let monday = next_monday(&state);
    book(&state, monday, "10:00 AM").await;

    let (_, list) = send(&state, admin_request("GET", "/api/admin/notifications", None)).await;
    let id = list[0]["id"].as_i64().unwrap();

    let (status, _) = send(
        &state,
        admin_request("POST", &format!("/api/admin/notifications/{id}/read"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, unread) = send(
        &state,
        admin_request("GET", "/api/admin/notifications?unread=true", None),
    )
    .await;
    assert!(unread.as_array().unwrap().is_empty());

    let (status, _) = send(
        &state,
        admin_request("POST", "/api/admin/notifications/9999/read", None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notification_events_require_token() {
    let state = test_state();
    let (status, _) = get(&state, "/api/admin/notifications/events").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── Admin API ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let state = test_state();
    let (status, json) = get(&state, "/api/admin/bookings").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["code"], "unauthorized");

    let (status, _) = send(
        &state,
        Request::builder()
            .uri("/api/admin/bookings")
            .header("Authorization", "Bearer wrong-token")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lifecycle() {
    let state = test_state();
    let monday = next_monday(&state);
    let (_, created) = book(&state, monday, "02:00 PM").await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &state,
        admin_request("GET", &format!("/api/admin/bookings?date={monday}&status=pending"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    for next in ["confirmed", "in_progress", "completed"] {
        let (status, json) = send(
            &state,
            admin_request(
                "PATCH",
                &format!("/api/admin/bookings/{id}"),
                Some(format!(r#"{{"status":"{next}"}}"#)),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], next);
    }

    // Completed is terminal and frees the slot
    let (status, json) = send(
        &state,
        admin_request(
            "PATCH",
            &format!("/api/admin/bookings/{id}"),
            Some(r#"{"status":"cancelled"}"#.to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "invalid_transition");

    let (_, availability) = get(&state, &format!("/api/availability?date={monday}")).await;
    assert_eq!(slot(&availability, "02:00 PM")["available"], true);
}

#[tokio::test]
async fn test_admin_unknown_status_filter() {
    let state = test_state();
    let (status, json) = send(
        &state,
        admin_request("GET", "/api/admin/bookings?status=Confirmed", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "bad_request");
}

#[tokio::test]
async fn test_admin_update_missing_booking() {
    let state = test_state();
    let (status, _) = send(
        &state,
        admin_request(
            "PATCH",
            "/api/admin/bookings/nope",
            Some(r#"{"status":"confirmed"}"#.to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_schedule_update() {
    let state = test_state();
    let monday = next_monday(&state);
    let schedule = r#"{
        "monday": {"isClosed": true, "from": "09:00 AM", "to": "05:00 PM"},
        "tuesday": {"isClosed": false, "from": "10:00 AM", "to": "12:00 PM"}
    }"#;

    let (status, _) = send(
        &state,
        admin_request("PUT", "/api/admin/schedule", Some(schedule.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, availability) = get(&state, &format!("/api/availability?date={monday}")).await;
    assert!(availability["slots"].as_array().unwrap().is_empty());

    let tuesday = monday.succ_opt().unwrap();
    let (_, availability) = get(&state, &format!("/api/availability?date={tuesday}")).await;
    assert_eq!(availability["slots"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_admin_schedule_rejects_inverted_hours() {
    let state = test_state();
    let schedule = r#"{"monday": {"isClosed": false, "from": "05:00 PM", "to": "09:00 AM"}}"#;
    let (status, json) = send(
        &state,
        admin_request("PUT", "/api/admin/schedule", Some(schedule.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "invalid_schedule_format");

    // Previous schedule is untouched
    let (_, json) = get(&state, "/api/schedule").await;
    assert_eq!(json["monday"]["from"], "09:00 AM");
}

#[tokio::test]
async fn test_admin_save_service() {
    let state = test_state();
    let (status, _) = send(
        &state,
        admin_request(
            "POST",
            "/api/admin/services",
            Some(r#"{"id":"whitening","title":"Teeth whitening","isActive":true}"#.to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = get(&state, "/api/services").await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

// ── Calendar ──

#[tokio::test]
async fn test_calendar_not_found() {
    let state = test_state();
    let res = test_app(state)
        .oneshot(
            Request::builder()
                .uri("/calendar/nonexistent.ics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_download() {
    let state = test_state();
    let monday = next_monday(&state);
    let (_, created) = book(&state, monday, "10:00 AM").await;
    let id = created["id"].as_str().unwrap().to_string();

    let res = test_app(state)
        .oneshot(
            Request::builder()
                .uri(format!("/calendar/{id}.ics"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/calendar; charset=utf-8"
    );

    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let ics = String::from_utf8(body.to_vec()).unwrap();
    assert!(ics.contains(&format!("DTSTART:{}T100000", monday.format("%Y%m%d"))));
    assert!(ics.contains("SUMMARY:Teeth cleaning at Smile Dental"));
    assert!(ics.contains(&format!("UID:{id}@clinic-booking")));
}
