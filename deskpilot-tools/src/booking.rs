use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use deskpilot_core::{Tool, ToolError, Value};

use crate::calendar::{BookingRequest, CalendarBackend, CalendarConfig, CalendarError};
use crate::dates::{normalize_date, parse_clock};

/// Books appointments against a [`CalendarBackend`].
///
/// Returns user-facing text for every readable-but-unbookable input (bad
/// date, out-of-hours time, taken slot). `Err` is reserved for arguments
/// that do not deserialize and for backend failures.
pub struct BookingTool {
    calendar: Arc<dyn CalendarBackend>,
    config: CalendarConfig,
}

#[derive(Debug, Deserialize)]
struct BookingArgs {
    date: String,
    time: String,
    email: String,
    name: String,
    #[serde(default)]
    contact: String,
    #[serde(default)]
    company_name: String,
    #[serde(default = "default_reason")]
    reason: String,
    #[serde(default)]
    reschedule: bool,
    #[serde(default)]
    idempotency_key: Option<String>,
}

fn default_reason() -> String {
    "General Consultation".to_string()
}

impl BookingTool {
    pub fn new(calendar: Arc<dyn CalendarBackend>, config: CalendarConfig) -> Self {
        Self { calendar, config }
    }

    async fn unavailable_message(
        &self,
        preamble: &str,
        time: &str,
        date: NaiveDate,
    ) -> Result<String, ToolError> {
        let alternatives = self
            .calendar
            .open_slots(date, 5)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;

        let mut message = format!("{preamble}The slot **{time} on {date}** is not available.\n");
        if alternatives.is_empty() {
            message.push_str("No open slots remain on that day. Please try another date.");
        } else {
            message.push_str("Available slots:\n");
            for slot in &alternatives {
                message.push_str(&format!("- {slot}\n"));
            }
        }
        Ok(message)
    }
}

#[async_trait]
impl Tool for BookingTool {
    fn name(&self) -> &str {
        "book_meeting"
    }

    fn description(&self) -> &str {
        "Books or reschedules an appointment on the business calendar and \
         suggests open slots when the requested one is taken"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "date": {
                    "type": "string",
                    "description": "Date for the appointment, e.g. 2025-11-27, tomorrow or next Monday"
                },
                "time": {
                    "type": "string",
                    "description": "Start time within business hours, e.g. 10:00 AM or 14:00"
                },
                "email": {"type": "string", "description": "Attendee email address"},
                "name": {"type": "string", "description": "Attendee full name"},
                "contact": {"type": "string", "description": "Phone number or other contact details"},
                "company_name": {"type": "string", "description": "Attendee company"},
                "reason": {"type": "string", "description": "Topic for the appointment"},
                "reschedule": {
                    "type": "boolean",
                    "description": "Cancel the existing appointment on the same topic before booking"
                }
            },
            "required": ["date", "time", "email", "name"]
        })
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: BookingArgs = serde_json::from_value(args)?;
        tracing::info!(
            name = %args.name,
            company = %args.company_name,
            contact = %args.contact,
            date = %args.date,
            time = %args.time,
            reason = %args.reason,
            reschedule = args.reschedule,
            "booking request"
        );

        if args.date.trim().is_empty() || args.time.trim().is_empty() {
            return Ok(Value::String(
                "I need both date and time to book your appointment.".to_string(),
            ));
        }

        let Some(start) = parse_clock(&args.time) else {
            return Ok(Value::String(
                "Invalid time format. Please use 'HH:MM AM/PM'.".to_string(),
            ));
        };
        if start < self.config.day_start || start >= self.config.day_end {
            return Ok(Value::String(format!(
                "Time {} is out of business hours ({} - {}). Please choose a valid time.",
                args.time,
                self.config.day_start.format("%-I %p"),
                self.config.day_end.format("%-I %p"),
            )));
        }

        let today = Utc::now().date_naive();
        let Some(date) = normalize_date(&args.date, today) else {
            return Ok(Value::String(format!(
                "I couldn't understand the date \"{}\". Try a format like 2025-11-27, tomorrow or next Monday.",
                args.date
            )));
        };

        let mut preamble = String::new();
        if args.reschedule {
            let cancelled = self
                .calendar
                .cancel_matching(&args.email, &args.reason)
                .await
                .map_err(|err| ToolError::ExecutionFailed(err.to_string()))?;
            preamble = match cancelled {
                Some(description) => {
                    format!("**Previous meeting cancelled:** {description}\n\n")
                }
                None => {
                    "Could not find a previous meeting to cancel, proceeding with the new booking.\n\n"
                        .to_string()
                }
            };
        }

        let request = BookingRequest {
            idempotency_key: args.idempotency_key.clone(),
            email: args.email.clone(),
            title: format!("{}: {} ({})", args.company_name, args.reason, args.name),
            date,
            start,
        };
        match self.calendar.book(request).await {
            Ok(confirmation) => Ok(Value::String(format!(
                "{preamble}Appointment booked.\n\n\
                 **Topic:** {}\n\
                 **Company:** {}\n\
                 **Name:** {}\n\
                 **Date:** {}\n\
                 **Time:** {}\n\
                 **Meet link:** {}",
                args.reason,
                args.company_name,
                args.name,
                confirmation.date,
                confirmation.window,
                confirmation.meet_link,
            ))),
            Err(CalendarError::Conflict { .. }) => {
                let message = self.unavailable_message(&preamble, &args.time, date).await?;
                Ok(Value::String(message))
            }
            Err(err) => Err(ToolError::ExecutionFailed(err.to_string())),
        }
    }
}
