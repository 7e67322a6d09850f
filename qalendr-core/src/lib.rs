//! Core engine for the Qalendr holiday calendar.
//!
//! This crate provides the building blocks shared by the server and any
//! other frontends:
//! - `pattern` resolves symbolic date rules to concrete dates
//! - `data` holds the bundled holiday tables
//! - `loader` derives calendar events from a selection
//! - `ics` serializes events to iCalendar documents

pub mod data;
pub mod error;
pub mod event;
pub mod ics;
pub mod loader;
pub mod pattern;

pub use data::Dataset;
pub use error::{QalendrError, QalendrResult};
pub use event::{CalendarEvent, EventCategory, VacationEntry};
pub use loader::{load_events, Selection};
