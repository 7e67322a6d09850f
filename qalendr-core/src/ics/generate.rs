//! VCALENDAR assembly from resolved events.

use chrono::{DateTime, Duration, Utc};

use crate::event::{CalendarEvent, EventCategory, RecurrenceRule};

use super::format::{
    escape_text, event_uid, fold_line, format_dtstamp, format_ics_date, join_lines,
};

/// Options for calendar-level properties.
#[derive(Debug, Clone)]
pub struct IcsOptions {
    /// X-WR-CALNAME; `None` omits the line.
    pub calendar_name: Option<String>,
    /// X-WR-CALDESC; `None` omits the line.
    pub calendar_description: Option<String>,
    pub prod_id: String,
}

impl Default for IcsOptions {
    fn default() -> Self {
        IcsOptions {
            calendar_name: Some("Ferien & Feiertage".to_string()),
            calendar_description: None,
            prod_id: "-//Qalendr//DE".to_string(),
        }
    }
}

fn category_label(category: EventCategory) -> &'static str {
    match category {
        EventCategory::SchoolHolidays => "SCHULFERIEN",
        EventCategory::PublicHolidays => "FEIERTAGE",
        EventCategory::Observances => "GEDENKTAGE",
        EventCategory::FunDays => "KURIOSE TAGE",
        EventCategory::BridgeDays => "BRUECKENTAGE",
        EventCategory::MoonPhases => "MONDPHASEN",
        EventCategory::WikipediaToday => "HISTORISCHES",
        EventCategory::FamousBirthdays => "GEBURTSTAGE",
        EventCategory::Vacation => "URLAUB",
        EventCategory::Custom => "SONSTIGE",
    }
}

fn rrule_line(rule: &RecurrenceRule) -> String {
    let mut parts = vec![format!("FREQ={}", rule.frequency.as_ics_str())];
    if let Some(interval) = rule.interval {
        if interval > 1 {
            parts.push(format!("INTERVAL={interval}"));
        }
    }
    if let Some(month) = rule.by_month {
        parts.push(format!("BYMONTH={month}"));
    }
    if let Some(day) = rule.by_month_day {
        parts.push(format!("BYMONTHDAY={day}"));
    }
    if let Some(count) = rule.count {
        parts.push(format!("COUNT={count}"));
    }
    if let Some(until) = rule.until {
        parts.push(format!("UNTIL={}", format_ics_date(until)));
    }
    format!("RRULE:{}", parts.join(";"))
}

fn event_lines(event: &CalendarEvent, dtstamp: &str, lines: &mut Vec<String>) {
    lines.push("BEGIN:VEVENT".to_string());
    lines.push(fold_line(&format!("UID:{}", event_uid(&event.id))));
    lines.push(format!("DTSTAMP:{dtstamp}"));

    if event.all_day {
        lines.push(format!(
            "DTSTART;VALUE=DATE:{}",
            format_ics_date(event.start_date)
        ));
        // DTEND is exclusive, so the inclusive end moves forward one day
        lines.push(format!(
            "DTEND;VALUE=DATE:{}",
            format_ics_date(event.end_date + Duration::days(1))
        ));
    } else {
        lines.push(format!(
            "DTSTART:{}T000000",
            format_ics_date(event.start_date)
        ));
        lines.push(format!("DTEND:{}T235959", format_ics_date(event.end_date)));
    }

    lines.push(fold_line(&format!("SUMMARY:{}", escape_text(&event.title))));
    if let Some(description) = &event.description {
        lines.push(fold_line(&format!(
            "DESCRIPTION:{}",
            escape_text(description)
        )));
    }
    lines.push(format!("CATEGORIES:{}", category_label(event.category)));
    lines.push("TRANSP:TRANSPARENT".to_string());
    if let Some(rule) = &event.recurrence {
        lines.push(fold_line(&rrule_line(rule)));
    }
    lines.push("END:VEVENT".to_string());
}

/// Serialize events into a complete VCALENDAR document.
///
/// Output is byte-deterministic for a fixed `now`: CRLF line endings, a
/// trailing CRLF after END:VCALENDAR, events in input order.
pub fn generate_ics(events: &[CalendarEvent], options: &IcsOptions, now: DateTime<Utc>) -> String {
    let dtstamp = format_dtstamp(now);
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        fold_line(&format!("PRODID:{}", options.prod_id)),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];
    if let Some(name) = &options.calendar_name {
        lines.push(fold_line(&format!("X-WR-CALNAME:{}", escape_text(name))));
    }
    if let Some(description) = &options.calendar_description {
        lines.push(fold_line(&format!(
            "X-WR-CALDESC:{}",
            escape_text(description)
        )));
    }

    for event in events {
        event_lines(event, &dtstamp, &mut lines);
    }

    lines.push("END:VCALENDAR".to_string());
    let mut out = join_lines(&lines);
    out.push_str("\r\n");
    out
}

/// Display name for the generated calendar, shown by calendar clients
/// that honor X-WR-CALNAME.
pub fn generate_calendar_name(region_names: &[String], categories: &[EventCategory]) -> String {
    let label = if categories.contains(&EventCategory::SchoolHolidays) {
        "Ferien & Feiertage"
    } else if categories.contains(&EventCategory::PublicHolidays) {
        "Feiertage"
    } else {
        "Kalender"
    };
    match region_names {
        [] => label.to_string(),
        [single] => format!("{label} {single}"),
        many => format!("{label} ({} Regionen)", many.len()),
    }
}

/// Download filename for a region selection, e.g. `de_by_2025.ics`.
pub fn generate_filename(region_codes: &[String], year: i32) -> String {
    let base = match region_codes {
        [single] => single.to_lowercase().replace('-', "_"),
        [] => "kalender".to_string(),
        many => format!("kalender_{}_regionen", many.len()),
    };
    format!("{base}_{year}.ics")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Frequency;
    use chrono::{NaiveDate, TimeZone};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn sample_event() -> CalendarEvent {
        CalendarEvent::single_day(
            "de-neujahr-2025".to_string(),
            "Neujahr".to_string(),
            date(2025, 1, 1),
            EventCategory::PublicHolidays,
        )
    }

    #[test]
    fn test_calendar_envelope() {
        let ics = generate_ics(&[sample_event()], &IcsOptions::default(), fixed_now());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("VERSION:2.0\r\n"));
        assert!(ics.contains("PRODID:-//Qalendr//DE\r\n"));
        assert!(ics.contains("CALSCALE:GREGORIAN\r\n"));
        assert!(ics.contains("METHOD:PUBLISH\r\n"));
        assert!(ics.contains("X-WR-CALNAME:Ferien & Feiertage\r\n"));

        // No bare LF anywhere
        assert!(!ics.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_all_day_event_has_exclusive_dtend() {
        let mut event = sample_event();
        event.end_date = date(2025, 1, 3);

        let ics = generate_ics(&[event], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("DTSTART;VALUE=DATE:20250101\r\n"));
        // Inclusive end 2025-01-03 serializes as exclusive 2025-01-04
        assert!(ics.contains("DTEND;VALUE=DATE:20250104\r\n"));
    }

    #[test]
    fn test_single_day_event_spans_one_day() {
        let ics = generate_ics(&[sample_event()], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("DTSTART;VALUE=DATE:20250101\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20250102\r\n"));
    }

    #[test]
    fn test_exclusive_dtend_across_month_and_year() {
        let mut january = sample_event();
        january.end_date = date(2025, 1, 31);
        let mut december = sample_event();
        december.start_date = date(2025, 12, 29);
        december.end_date = date(2025, 12, 31);

        let ics = generate_ics(&[january, december], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("DTEND;VALUE=DATE:20250201\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20260101\r\n"));
    }

    #[test]
    fn test_timed_event_uses_datetime_forms() {
        let mut event = sample_event();
        event.all_day = false;

        let ics = generate_ics(&[event], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("DTSTART:20250101T000000\r\n"));
        assert!(ics.contains("DTEND:20250101T235959\r\n"));
    }

    #[test]
    fn test_uid_and_dtstamp() {
        let ics = generate_ics(&[sample_event()], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("UID:de-neujahr-2025@qalendr.com\r\n"));
        assert!(ics.contains("DTSTAMP:20250115T120000Z\r\n"));
    }

    #[test]
    fn test_summary_is_escaped() {
        let mut event = sample_event();
        event.title = "Tag der Arbeit; Demo, Kundgebung".to_string();

        let ics = generate_ics(&[event], &IcsOptions::default(), fixed_now());
        assert!(ics.contains(r"SUMMARY:Tag der Arbeit\; Demo\, Kundgebung"));
    }

    #[test]
    fn test_long_summary_is_folded() {
        let mut event = sample_event();
        event.title = "W".repeat(120);

        let ics = generate_ics(&[event], &IcsOptions::default(), fixed_now());
        for line in ics.split("\r\n") {
            assert!(line.chars().count() <= 75, "line too long: {line}");
        }
        // Continuation line carries the overflow
        assert!(ics.contains("\r\n W"));
    }

    #[test]
    fn test_categories_label_is_german() {
        let mut school = sample_event();
        school.category = EventCategory::SchoolHolidays;
        let mut bridge = sample_event();
        bridge.category = EventCategory::BridgeDays;

        let ics = generate_ics(&[school, bridge], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("CATEGORIES:SCHULFERIEN\r\n"));
        assert!(ics.contains("CATEGORIES:BRUECKENTAGE\r\n"));
        assert!(ics.contains("TRANSP:TRANSPARENT\r\n"));
    }

    #[test]
    fn test_rrule_line() {
        let mut event = sample_event();
        event.recurrence = Some(RecurrenceRule {
            frequency: Frequency::Yearly,
            interval: Some(1),
            by_month: Some(1),
            by_month_day: Some(1),
            count: None,
            until: Some(date(2030, 12, 31)),
        });

        let ics = generate_ics(&[event], &IcsOptions::default(), fixed_now());
        // INTERVAL=1 is the default and stays implicit
        assert!(ics.contains("RRULE:FREQ=YEARLY;BYMONTH=1;BYMONTHDAY=1;UNTIL=20301231\r\n"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let events = [sample_event()];
        let now = fixed_now();
        let first = generate_ics(&events, &IcsOptions::default(), now);
        let second = generate_ics(&events, &IcsOptions::default(), now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_event_list_still_valid() {
        let ics = generate_ics(&[], &IcsOptions::default(), fixed_now());
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(!ics.contains("BEGIN:VEVENT"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_calendar_name_follows_categories_and_region_count() {
        let bayern = vec!["Bayern".to_string()];
        assert_eq!(
            generate_calendar_name(
                &bayern,
                &[EventCategory::SchoolHolidays, EventCategory::PublicHolidays]
            ),
            "Ferien & Feiertage Bayern"
        );
        assert_eq!(
            generate_calendar_name(&bayern, &[EventCategory::PublicHolidays]),
            "Feiertage Bayern"
        );

        let many = vec!["Bayern".to_string(), "Berlin".to_string(), "Hessen".to_string()];
        assert_eq!(
            generate_calendar_name(&many, &[EventCategory::PublicHolidays]),
            "Feiertage (3 Regionen)"
        );

        assert_eq!(
            generate_calendar_name(&[], &[EventCategory::MoonPhases]),
            "Kalender"
        );
    }

    #[test]
    fn test_filename_variants() {
        let single = vec!["DE-BY".to_string()];
        assert_eq!(generate_filename(&single, 2025), "de_by_2025.ics");

        let multi = vec!["DE-BY".to_string(), "DE-BW".to_string()];
        assert_eq!(generate_filename(&multi, 2025), "kalender_2_regionen_2025.ics");

        assert_eq!(generate_filename(&[], 2026), "kalender_2026.ics");
    }
}
