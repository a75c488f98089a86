//! Capability tools for Deskpilot workers.
//!
//! Each tool implements [`deskpilot_core::Tool`] and returns a user-facing
//! message as its payload. Backends sit behind traits so deployments swap
//! a real calendar, FAQ index or ticketing system in without touching the
//! tools themselves; the in-memory implementations back tests and demos.
//!
//! Callers may inject an `idempotency_key` into the tool arguments. Backends
//! that mutate state replay the original outcome when they see a key again
//! instead of acting twice.

mod booking;
mod calendar;
mod dates;
mod escalation;
mod faq;

pub use booking::BookingTool;
pub use calendar::{
    BookingConfirmation, BookingRequest, CalendarBackend, CalendarConfig, CalendarError,
    InMemoryCalendar, SlotWindow,
};
pub use dates::{normalize_date, parse_clock};
pub use escalation::{
    EscalateTool, InMemoryTicketSink, Severity, Ticket, TicketError, TicketRequest, TicketSink,
};
pub use faq::{FaqEntry, FaqError, FaqHit, FaqIndex, FaqTool, InMemoryFaqIndex};
