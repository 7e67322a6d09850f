//! iCalendar (RFC 5545) serialization.

mod format;
mod generate;

pub use format::{
    escape_text, event_uid, fold_line, format_dtstamp, format_ics_date, join_lines, unescape_text,
};
pub use generate::{generate_calendar_name, generate_filename, generate_ics, IcsOptions};
