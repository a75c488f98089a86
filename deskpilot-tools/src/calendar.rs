use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveTime};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar backend failure: {0}")]
    Backend(String),
    #[error("slot {start} on {date} is already taken")]
    Conflict { date: NaiveDate, start: NaiveTime },
}

/// Scheduling windows and meeting shape for a calendar.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub meeting_minutes: i64,
    pub buffer_minutes: i64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            meeting_minutes: 60,
            buffer_minutes: 15,
        }
    }
}

/// A bookable span within one day, rendered as `09:00 AM - 10:00 AM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl fmt::Display for SlotWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%I:%M %p"),
            self.end.format("%I:%M %p")
        )
    }
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub idempotency_key: Option<String>,
    pub email: String,
    pub title: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub date: NaiveDate,
    pub window: SlotWindow,
    pub meet_link: String,
}

/// Calendar seam for the booking tool.
///
/// `book` checks availability and inserts in one step; a taken slot is
/// `CalendarError::Conflict`. With a previously seen idempotency key it
/// must return the original confirmation without creating a second event.
#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Up to `limit` open windows on `date`, earliest first.
    async fn open_slots(&self, date: NaiveDate, limit: usize)
        -> Result<Vec<SlotWindow>, CalendarError>;

    async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation, CalendarError>;

    /// Cancels the first event whose attendee and title match, returning a
    /// short description of what was removed.
    async fn cancel_matching(
        &self,
        email: &str,
        topic: &str,
    ) -> Result<Option<String>, CalendarError>;
}

#[derive(Clone)]
struct Event {
    email: String,
    title: String,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Default)]
struct Inner {
    events: Vec<Event>,
    replays: HashMap<String, BookingConfirmation>,
}

/// Calendar held in process memory, for tests and single-node demos.
#[derive(Clone)]
pub struct InMemoryCalendar {
    config: CalendarConfig,
    inner: Arc<Mutex<Inner>>,
}

impl Default for InMemoryCalendar {
    fn default() -> Self {
        Self::new(CalendarConfig::default())
    }
}

impl InMemoryCalendar {
    pub fn new(config: CalendarConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    fn meeting(&self) -> Duration {
        Duration::minutes(self.config.meeting_minutes)
    }

    fn buffer(&self) -> Duration {
        Duration::minutes(self.config.buffer_minutes)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, CalendarError> {
        self.inner
            .lock()
            .map_err(|_| CalendarError::Backend("lock".to_string()))
    }
}

fn overlaps(events: &[Event], date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
    events
        .iter()
        .any(|ev| ev.date == date && start < ev.end && end > ev.start)
}

#[async_trait]
impl CalendarBackend for InMemoryCalendar {
    async fn open_slots(
        &self,
        date: NaiveDate,
        limit: usize,
    ) -> Result<Vec<SlotWindow>, CalendarError> {
        let inner = self.lock()?;
        let mut booked: Vec<(NaiveTime, NaiveTime)> = inner
            .events
            .iter()
            .filter(|ev| ev.date == date)
            .map(|ev| (ev.start, ev.end))
            .collect();
        booked.sort();

        let mut slots = Vec::new();
        let mut current = self.config.day_start;
        while slots.len() < limit && current < self.config.day_end {
            let (slot_end, wrapped) = current.overflowing_add_signed(self.meeting());
            if wrapped != 0 {
                break;
            }

            if let Some((_, booked_end)) = booked
                .iter()
                .find(|(bs, be)| current < *be && slot_end > *bs)
            {
                let (next, wrapped) = booked_end.overflowing_add_signed(self.buffer());
                if wrapped != 0 {
                    break;
                }
                current = next;
                continue;
            }

            if slot_end <= self.config.day_end {
                slots.push(SlotWindow {
                    start: current,
                    end: slot_end,
                });
            }
            let (next, wrapped) = current.overflowing_add_signed(self.meeting() + self.buffer());
            if wrapped != 0 {
                break;
            }
            current = next;
        }

        Ok(slots)
    }

    async fn book(&self, request: BookingRequest) -> Result<BookingConfirmation, CalendarError> {
        let mut inner = self.lock()?;
        if let Some(key) = &request.idempotency_key {
            if let Some(prior) = inner.replays.get(key) {
                tracing::debug!(idempotency_key = %key, "replaying booking confirmation");
                return Ok(prior.clone());
            }
        }

        let (end, wrapped) = request.start.overflowing_add_signed(self.meeting());
        if wrapped != 0 {
            return Err(CalendarError::Backend(
                "meeting would cross midnight".to_string(),
            ));
        }
        if overlaps(&inner.events, request.date, request.start, end) {
            return Err(CalendarError::Conflict {
                date: request.date,
                start: request.start,
            });
        }

        let booking_id = Uuid::new_v4().to_string();
        let meet_link = format!("https://meet.deskpilot.dev/{}", &booking_id[..8]);
        inner.events.push(Event {
            email: request.email.clone(),
            title: request.title.clone(),
            date: request.date,
            start: request.start,
            end,
        });

        let confirmation = BookingConfirmation {
            booking_id,
            date: request.date,
            window: SlotWindow {
                start: request.start,
                end,
            },
            meet_link,
        };
        if let Some(key) = request.idempotency_key {
            inner.replays.insert(key, confirmation.clone());
        }
        Ok(confirmation)
    }

    async fn cancel_matching(
        &self,
        email: &str,
        topic: &str,
    ) -> Result<Option<String>, CalendarError> {
        let mut inner = self.lock()?;
        let needle = topic.to_lowercase();
        let position = inner
            .events
            .iter()
            .position(|ev| ev.email == email && ev.title.to_lowercase().contains(&needle));

        Ok(position.map(|at| {
            let removed = inner.events.remove(at);
            format!("{} on {}", removed.title, removed.date)
        }))
    }
}
