use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};

use crate::models::{
    Booking, BookingStatus, ClinicSchedule, ClinicService, DaySchedule, NewNotification,
    Notification, NotificationKind, WallClockTime, Weekday,
};

const DATE_FMT: &str = "%Y-%m-%d";
const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str = "id, service_id, date, time, status, client_name, client_phone, \
     client_email, message, user_id, created_at, updated_at";

// ── Clinic schedule ──

pub fn get_schedule(conn: &Connection) -> anyhow::Result<ClinicSchedule> {
    let mut stmt =
        conn.prepare("SELECT weekday, is_closed, open_from, open_to FROM clinic_schedule")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i32>(1)? != 0,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut schedule = ClinicSchedule::default();
    for row in rows {
        let (weekday, is_closed, from, to) = row?;
        let Some(day) = Weekday::parse(&weekday) else {
            tracing::warn!(weekday = %weekday, "ignoring unknown weekday in clinic schedule");
            continue;
        };
        let hours = DaySchedule {
            is_closed,
            from: WallClockTime::parse(&from)?,
            to: WallClockTime::parse(&to)?,
        };
        schedule.days.insert(day, hours);
    }
    Ok(schedule)
}

/// Replaces the whole weekly schedule. Days absent from `schedule` become closed.
pub fn save_schedule(conn: &Connection, schedule: &ClinicSchedule) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM clinic_schedule", [])?;
    for (day, hours) in &schedule.days {
        tx.execute(
            "INSERT INTO clinic_schedule (weekday, is_closed, open_from, open_to) VALUES (?1, ?2, ?3, ?4)",
            params![
                day.as_str(),
                hours.is_closed as i32,
                hours.from.to_24h(),
                hours.to.to_24h(),
            ],
        )?;
    }
    tx.commit().context("failed to save clinic schedule")?;
    Ok(())
}

// ── Services ──

pub fn list_services(conn: &Connection, active_only: bool) -> anyhow::Result<Vec<ClinicService>> {
    let sql = if active_only {
        "SELECT id, title, is_active FROM services WHERE is_active = 1 ORDER BY title ASC"
    } else {
        "SELECT id, title, is_active FROM services ORDER BY title ASC"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<ClinicService>> {
    let result = conn.query_row(
        "SELECT id, title, is_active FROM services WHERE id = ?1",
        params![id],
        parse_service_row,
    );

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_service(conn: &Connection, service: &ClinicService) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, title, is_active) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET title = excluded.title, is_active = excluded.is_active",
        params![service.id, service.title, service.is_active as i32],
    )?;
    Ok(())
}

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<ClinicService> {
    Ok(ClinicService {
        id: row.get(0)?,
        title: row.get(1)?,
        is_active: row.get::<_, i32>(2)? != 0,
    })
}

// ── Bookings ──

/// Inserts a booking. Returns `false` when another live booking already holds
/// the same date and time (enforced by the partial unique index).
pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let result = conn.execute(
        "INSERT INTO bookings (id, service_id, date, time, status, client_name, client_phone, client_email, message, user_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            booking.id,
            booking.service_id,
            booking.date.format(DATE_FMT).to_string(),
            booking.time.to_24h(),
            booking.status.as_str(),
            booking.client_name,
            booking.client_phone,
            booking.client_email,
            booking.message,
            booking.user_id,
            booking.created_at.format(TIMESTAMP_FMT).to_string(),
            booking.updated_at.format(TIMESTAMP_FMT).to_string(),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation
                && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Every booking on `date`, whatever its status, in time order.
pub fn get_bookings_for_date(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE date = ?1 ORDER BY time ASC"
    ))?;

    let rows = stmt.query_map(params![date.format(DATE_FMT).to_string()], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_phone(conn: &Connection, phone: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE client_phone = ?1 ORDER BY date DESC, time DESC"
    ))?;

    let rows = stmt.query_map(params![phone], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_all_bookings(
    conn: &Connection,
    date: Option<NaiveDate>,
    status: Option<BookingStatus>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut clauses = vec![];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(date) = date {
        params_vec.push(Box::new(date.format(DATE_FMT).to_string()));
        clauses.push(format!("date = ?{}", params_vec.len()));
    }
    if let Some(status) = status {
        params_vec.push(Box::new(status.as_str()));
        clauses.push(format!("status = ?{}", params_vec.len()));
    }
    params_vec.push(Box::new(limit));

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings {where_clause} ORDER BY date DESC, time DESC LIMIT ?{}",
        params_vec.len()
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FMT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(2)?;
    let time_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FMT)
        .with_context(|| format!("bad booking date: {date_str}"))?;
    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("unknown booking status: {status_str}"))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FMT)
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, TIMESTAMP_FMT)
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Booking {
        id: row.get(0)?,
        service_id: row.get(1)?,
        date,
        time: WallClockTime::parse(&time_str)?,
        status,
        client_name: row.get(5)?,
        client_phone: row.get(6)?,
        client_email: row.get(7)?,
        message: row.get(8)?,
        user_id: row.get(9)?,
        created_at,
        updated_at,
    })
}

// ── Notifications ──

pub fn insert_notification(
    conn: &Connection,
    notification: &NewNotification,
) -> anyhow::Result<Notification> {
    let created_at = Utc::now().format(TIMESTAMP_FMT).to_string();
    conn.execute(
        "INSERT INTO notifications (title, message, kind, ref, ref_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            notification.title,
            notification.message,
            notification.kind.as_str(),
            notification.reference,
            notification.ref_id,
            created_at,
        ],
    )?;

    Ok(Notification {
        id: conn.last_insert_rowid(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        kind: notification.kind,
        reference: notification.reference.clone(),
        ref_id: notification.ref_id.clone(),
        is_read: false,
        created_at,
    })
}

pub fn list_notifications(
    conn: &Connection,
    unread_only: bool,
    limit: i64,
) -> anyhow::Result<Vec<Notification>> {
    let sql = if unread_only {
        "SELECT id, title, message, kind, ref, ref_id, is_read, created_at
         FROM notifications WHERE is_read = 0 ORDER BY id DESC LIMIT ?1"
    } else {
        "SELECT id, title, message, kind, ref, ref_id, is_read, created_at
         FROM notifications ORDER BY id DESC LIMIT ?1"
    };
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params![limit], parse_notification_row)?;

    let mut notifications = vec![];
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}

pub fn get_notifications_since(conn: &Connection, since_id: i64) -> anyhow::Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, message, kind, ref, ref_id, is_read, created_at
         FROM notifications WHERE id > ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![since_id], parse_notification_row)?;

    let mut notifications = vec![];
    for row in rows {
        notifications.push(row?);
    }
    Ok(notifications)
}

pub fn mark_notification_read(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1",
        params![id],
    )?;
    Ok(count > 0)
}

fn parse_notification_row(row: &rusqlite::Row) -> rusqlite::Result<Notification> {
    let kind: String = row.get(3)?;
    Ok(Notification {
        id: row.get(0)?,
        title: row.get(1)?,
        message: row.get(2)?,
        kind: NotificationKind::parse(&kind),
        reference: row.get(4)?,
        ref_id: row.get(5)?,
        is_read: row.get::<_, i32>(6)? != 0,
        created_at: row.get(7)?,
    })
}
