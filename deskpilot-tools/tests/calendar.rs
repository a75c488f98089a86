use chrono::{NaiveDate, NaiveTime};

use deskpilot_tools::{
    BookingRequest, CalendarBackend, CalendarError, InMemoryCalendar, SlotWindow,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 5, 4).unwrap()
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn request(start: NaiveTime, key: Option<&str>) -> BookingRequest {
    BookingRequest {
        idempotency_key: key.map(ToOwned::to_owned),
        email: "ada@acme.test".to_string(),
        title: "Acme: Quarterly Review (Ada Lovelace)".to_string(),
        date: day(),
        start,
    }
}

#[tokio::test]
async fn open_slots_walk_the_day_with_buffers() {
    let calendar = InMemoryCalendar::default();

    let slots = calendar.open_slots(day(), 3).await.unwrap();

    assert_eq!(
        slots,
        vec![
            SlotWindow {
                start: at(9, 0),
                end: at(10, 0)
            },
            SlotWindow {
                start: at(10, 15),
                end: at(11, 15)
            },
            SlotWindow {
                start: at(11, 30),
                end: at(12, 30)
            },
        ]
    );
    assert_eq!(slots[0].to_string(), "09:00 AM - 10:00 AM");
}

#[tokio::test]
async fn open_slots_skip_past_booked_windows() {
    let calendar = InMemoryCalendar::default();
    calendar.book(request(at(10, 0), None)).await.unwrap();

    let slots = calendar.open_slots(day(), 2).await.unwrap();

    assert_eq!(slots[0].start, at(9, 0));
    // Next window starts a buffer after the booked meeting ends.
    assert_eq!(slots[1].start, at(11, 15));
}

#[tokio::test]
async fn double_booking_is_a_conflict() {
    let calendar = InMemoryCalendar::default();
    calendar.book(request(at(10, 0), None)).await.unwrap();

    let err = calendar
        .book(request(at(10, 30), None))
        .await
        .unwrap_err();

    assert!(matches!(err, CalendarError::Conflict { .. }));
}

#[tokio::test]
async fn idempotency_key_replays_confirmation() {
    let calendar = InMemoryCalendar::default();

    let first = calendar
        .book(request(at(10, 0), Some("thread-1:0:1")))
        .await
        .unwrap();
    let second = calendar
        .book(request(at(10, 0), Some("thread-1:0:1")))
        .await
        .unwrap();

    assert_eq!(first.booking_id, second.booking_id);
    assert_eq!(first.meet_link, second.meet_link);
    let slots = calendar.open_slots(day(), 10).await.unwrap();
    assert_eq!(slots.len(), 5);
}

#[tokio::test]
async fn cancel_matches_title_case_insensitively() {
    let calendar = InMemoryCalendar::default();
    calendar.book(request(at(10, 0), None)).await.unwrap();

    let cancelled = calendar
        .cancel_matching("ada@acme.test", "quarterly review")
        .await
        .unwrap();

    assert_eq!(
        cancelled.as_deref(),
        Some("Acme: Quarterly Review (Ada Lovelace) on 2099-05-04")
    );
    let slots = calendar.open_slots(day(), 10).await.unwrap();
    assert_eq!(slots.len(), 6);
}

#[tokio::test]
async fn cancel_requires_matching_attendee() {
    let calendar = InMemoryCalendar::default();
    calendar.book(request(at(10, 0), None)).await.unwrap();

    let cancelled = calendar
        .cancel_matching("grace@acme.test", "quarterly review")
        .await
        .unwrap();

    assert!(cancelled.is_none());
}
