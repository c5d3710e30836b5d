use chrono::Duration;

use crate::models::Booking;
use crate::services::slots::SLOT_DURATION_MINUTES;

pub fn generate_ics(booking: &Booking, service_title: &str, clinic_name: &str) -> String {
    let start = booking.date.and_hms_opt(booking.time.hour(), booking.time.minute(), 0);
    let Some(start) = start else {
        return String::new();
    };
    let end = start + Duration::minutes(SLOT_DURATION_MINUTES as i64);

    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = end.format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = booking.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@clinic-booking", booking.id);

    let summary = escape_text(&format!("{service_title} at {clinic_name}"));
    let description = escape_text(booking.message.as_deref().unwrap_or("No additional notes"));
    let status = match booking.status {
        crate::models::BookingStatus::Cancelled => "CANCELLED",
        crate::models::BookingStatus::Pending => "TENTATIVE",
        _ => "CONFIRMED",
    };

    format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Clinic Booking//Appointments//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    )
}

fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, WallClockTime};
    use chrono::{NaiveDate, NaiveDateTime};

    fn booking(status: BookingStatus, message: Option<&str>) -> Booking {
        let created = NaiveDateTime::parse_from_str("2025-03-10 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: "test-123".to_string(),
            service_id: "cleaning".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            time: WallClockTime::parse("02:00 PM").unwrap(),
            status,
            client_name: "Mona".to_string(),
            client_phone: "01012345678".to_string(),
            client_email: None,
            message: message.map(str::to_string),
            user_id: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_generate_ics() {
        let ics = generate_ics(
            &booking(BookingStatus::Confirmed, Some("Sensitive tooth, upper left")),
            "Teeth cleaning",
            "Smile Dental",
        );
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("DTSTART:20250315T140000"));
        assert!(ics.contains("DTEND:20250315T143000"));
        assert!(ics.contains("DTSTAMP:20250310T100000Z"));
        assert!(ics.contains("SUMMARY:Teeth cleaning at Smile Dental"));
        assert!(ics.contains("DESCRIPTION:Sensitive tooth\\, upper left"));
        assert!(ics.contains("UID:test-123@clinic-booking"));
        assert!(ics.contains("STATUS:CONFIRMED"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_generate_ics_pending_without_message() {
        let ics = generate_ics(&booking(BookingStatus::Pending, None), "Whitening", "Clinic");
        assert!(ics.contains("DESCRIPTION:No additional notes"));
        assert!(ics.contains("STATUS:TENTATIVE"));
    }
}
