//! Calendar event types produced by the derivation engine.
//!
//! Events are terminal values: loaders create them fresh per request and
//! the ICS generator consumes them. `end_date` is always the inclusive
//! last day; the exclusive wire-format convention is applied only at
//! serialization time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    SchoolHolidays,
    PublicHolidays,
    Observances,
    FunDays,
    BridgeDays,
    MoonPhases,
    WikipediaToday,
    FamousBirthdays,
    Vacation,
    Custom,
}

impl EventCategory {
    /// Parse the kebab-case tag used in query strings and data files.
    /// Unknown tags yield `None` so callers can drop them silently.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let category = match tag {
            "school-holidays" => EventCategory::SchoolHolidays,
            "public-holidays" => EventCategory::PublicHolidays,
            "observances" => EventCategory::Observances,
            "fun-days" => EventCategory::FunDays,
            "bridge-days" => EventCategory::BridgeDays,
            "moon-phases" => EventCategory::MoonPhases,
            "wikipedia-today" => EventCategory::WikipediaToday,
            "famous-birthdays" => EventCategory::FamousBirthdays,
            "vacation" => EventCategory::Vacation,
            "custom" => EventCategory::Custom,
            _ => return None,
        };
        Some(category)
    }
}

/// Recurrence frequency for the RRULE passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl Frequency {
    pub fn as_ics_str(&self) -> &'static str {
        match self {
            Frequency::Yearly => "YEARLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Daily => "DAILY",
        }
    }
}

/// Recurrence rule for repeating events. Not expanded locally; encoded
/// directly into a single RRULE line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_month_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

/// A single resolved calendar event.
///
/// `id` is stable across repeated resolution for the same inputs, so a
/// re-downloaded calendar keeps its UIDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    /// Inclusive last day of the event.
    pub end_date: NaiveDate,
    pub all_day: bool,
    pub category: EventCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrenceRule>,
}

impl CalendarEvent {
    /// Convenience constructor for a single-day all-day event.
    pub fn single_day(
        id: String,
        title: String,
        date: NaiveDate,
        category: EventCategory,
    ) -> Self {
        CalendarEvent {
            id,
            title,
            start_date: date,
            end_date: date,
            all_day: true,
            category,
            region: None,
            description: None,
            recurrence: None,
        }
    }
}

/// A user-supplied vacation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationEntry {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl VacationEntry {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        VacationEntry {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            start_date,
            end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tag_round_trip() {
        for tag in [
            "school-holidays",
            "public-holidays",
            "observances",
            "fun-days",
            "bridge-days",
            "moon-phases",
            "wikipedia-today",
            "famous-birthdays",
            "vacation",
            "custom",
        ] {
            let category = EventCategory::parse_tag(tag).unwrap();
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{tag}\""));
        }
        assert_eq!(EventCategory::parse_tag("wikipedia-random"), None);
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = CalendarEvent::single_day(
            "de-neujahr-2025".to_string(),
            "Neujahr".to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            EventCategory::PublicHolidays,
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["startDate"], "2025-01-01");
        assert_eq!(json["endDate"], "2025-01-01");
        assert_eq!(json["category"], "public-holidays");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_vacation_entries_get_unique_ids() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 7, 28).unwrap();
        let a = VacationEntry::new("Sommerurlaub", start, end);
        let b = VacationEntry::new("Sommerurlaub", start, end);
        assert_ne!(a.id, b.id);
    }
}
