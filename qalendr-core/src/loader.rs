//! Event derivation engine.
//!
//! Per-category loaders build `CalendarEvent` lists from the raw tables
//! and the pattern resolver; `load_events` aggregates the requested
//! categories into one sorted list. A record whose pattern fails to
//! resolve is logged and skipped, never aborting the batch; a missing
//! table yields zero results.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::data::{Dataset, SpecialDayData};
use crate::error::{QalendrError, QalendrResult};
use crate::event::{CalendarEvent, EventCategory, VacationEntry};
use crate::pattern::resolve_pattern;

/// A requested calendar selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub countries: Vec<String>,
    pub regions: Vec<String>,
    pub categories: Vec<EventCategory>,
    pub year: i32,
    pub vacations: Vec<VacationEntry>,
    /// Observance ids to include; `None` loads all.
    pub selected_observances: Option<Vec<String>>,
    /// Fun-day ids to include; `None` loads all.
    pub selected_fun_days: Option<Vec<String>>,
    /// Famous-person ids to include; `None` loads all.
    pub selected_famous_people: Option<Vec<String>>,
}

impl Selection {
    /// Caller-level validation, checked before any event loading. A
    /// country selection alone is not enough; at least one region code
    /// is required.
    pub fn validate(&self) -> QalendrResult<()> {
        if self.regions.is_empty() {
            return Err(QalendrError::InvalidSelection(
                "Bitte mindestens eine Region auswählen".to_string(),
            ));
        }
        if self.categories.is_empty() {
            return Err(QalendrError::InvalidSelection(
                "Bitte mindestens eine Kategorie auswählen".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load public holidays for the given regions, year, and country.
pub fn load_public_holidays(
    data: &Dataset,
    region_codes: &[String],
    year: i32,
    country: &str,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let expanded = data.expand_regions(region_codes);

    let holidays = match data.public_holidays(country) {
        Ok(holidays) => holidays,
        Err(err) => {
            debug!(country, "{err}");
            return events;
        }
    };

    // Regions that belong to this country; countries without states fall
    // back to the country code itself.
    let country_regions: Vec<String> = expanded
        .iter()
        .filter(|code| {
            data.region_by_code(code)
                .is_some_and(|region| region.country == country)
        })
        .cloned()
        .collect();
    let effective_regions = if country_regions.is_empty() {
        vec![country.to_string()]
    } else {
        country_regions
    };

    let total_states = data.state_codes(country).len();

    for holiday in holidays {
        let applies = match &holiday.regions {
            Some(regions) => regions
                .iter()
                .any(|r| effective_regions.contains(r) || r == country),
            // No region list means nationwide
            None => true,
        };
        if !applies {
            continue;
        }

        let date = match resolve_pattern(&holiday.date, year) {
            Ok(date) => date,
            Err(err) => {
                warn!(holiday = %holiday.id, country, "skipping holiday: {err}");
                continue;
            }
        };

        // Applicable regions in declared order, so the suffix is stable
        // regardless of the caller's selection order.
        let applicable: Vec<&str> = match &holiday.regions {
            Some(regions) => regions
                .iter()
                .filter(|r| effective_regions.contains(r))
                .map(String::as_str)
                .collect(),
            None => effective_regions.iter().map(String::as_str).collect(),
        };

        // Count heuristic: a declared region list shorter than the state
        // count gets a suffix, even if the caller selected every state.
        let region_suffix = match &holiday.regions {
            Some(regions) if regions.len() < total_states && !applicable.is_empty() => {
                format!(" ({})", applicable.join(", "))
            }
            _ => String::new(),
        };

        events.push(CalendarEvent {
            id: format!("{}-{}-{}", country.to_lowercase(), holiday.id, year),
            title: format!("{}{}", holiday.name, region_suffix),
            start_date: date,
            end_date: date,
            all_day: true,
            category: EventCategory::PublicHolidays,
            region: (applicable.len() == 1).then(|| applicable[0].to_string()),
            description: None,
            recurrence: None,
        });
    }

    events
}

/// Load school holidays for the given regions and year.
pub fn load_school_holidays(
    data: &Dataset,
    region_codes: &[String],
    year: i32,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let expanded = data.expand_regions(region_codes);

    // School holiday data exists for German states only
    let de_regions: Vec<&String> = expanded.iter().filter(|r| r.starts_with("DE-")).collect();
    if de_regions.is_empty() {
        return events;
    }

    let Some(year_data) = data.school_holiday_year(year) else {
        debug!(year, "no school holiday table");
        return events;
    };

    for holiday in &year_data.holidays {
        for period in &holiday.periods {
            if !de_regions.iter().any(|r| **r == period.region) {
                continue;
            }

            let region_name = data
                .region_by_code(&period.region)
                .map(|r| r.name.as_str())
                .unwrap_or(&period.region);

            events.push(CalendarEvent {
                id: format!(
                    "{}-{}-{}",
                    period.region.to_lowercase(),
                    holiday.id,
                    year_data.year
                ),
                title: format!("{} {}", holiday.name, region_name),
                start_date: period.start_date,
                end_date: period.end_date,
                all_day: true,
                category: EventCategory::SchoolHolidays,
                region: Some(period.region.clone()),
                description: None,
                recurrence: None,
            });
        }
    }

    events
}

fn load_special_days(
    days: &[SpecialDayData],
    year: i32,
    selected: Option<&[String]>,
    category: EventCategory,
    id_prefix: &str,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for day in days {
        if let Some(selected) = selected {
            if !selected.iter().any(|id| id == &day.id) {
                continue;
            }
        }

        let date = match resolve_pattern(&day.date, year) {
            Ok(date) => date,
            Err(err) => {
                warn!(day = %day.id, "skipping special day: {err}");
                continue;
            }
        };

        let mut event = CalendarEvent::single_day(
            format!("{}-{}-{}", id_prefix, day.id, year),
            day.name.clone(),
            date,
            category,
        );
        event.description = day.note.clone();
        events.push(event);
    }

    events
}

/// Load observances (Gedenktage) for a year, optionally filtered by id.
pub fn load_observances(
    data: &Dataset,
    year: i32,
    selected: Option<&[String]>,
) -> Vec<CalendarEvent> {
    load_special_days(
        &data.observances,
        year,
        selected,
        EventCategory::Observances,
        "observance",
    )
}

/// Load fun days (kuriose Tage) for a year, optionally filtered by id.
pub fn load_fun_days(data: &Dataset, year: i32, selected: Option<&[String]>) -> Vec<CalendarEvent> {
    load_special_days(&data.fun_days, year, selected, EventCategory::FunDays, "funday")
}

/// Load moon phases from the year-keyed table.
pub fn load_moon_phases(data: &Dataset, year: i32) -> Vec<CalendarEvent> {
    let Some(phases) = data.moon_phases(year) else {
        debug!(year, "no moon phase table");
        return Vec::new();
    };

    phases
        .iter()
        .map(|entry| {
            CalendarEvent::single_day(
                format!("moon-{}-{}", entry.phase.tag(), entry.date),
                entry.phase.title().to_string(),
                entry.date,
                EventCategory::MoonPhases,
            )
        })
        .collect()
}

/// Load historical "on this day" facts, substituting the target year into
/// each MM-DD table key.
pub fn load_on_this_day(data: &Dataset, year: i32) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for (key, facts) in &data.on_this_day {
        let date = match NaiveDate::parse_from_str(&format!("{year}-{key}"), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                // Feb 29 keys in non-leap years land here
                warn!(key = %key, year, "skipping historical fact: no such date");
                continue;
            }
        };

        for (index, fact) in facts.iter().enumerate() {
            let years_ago = year - fact.year;
            let description = match &fact.link {
                Some(link) => format!("Vor {} Jahren ({})\n{}", years_ago, fact.year, link),
                None => format!("Vor {} Jahren ({})", years_ago, fact.year),
            };

            let mut event = CalendarEvent::single_day(
                format!("wikipedia-{key}-{index}-{year}"),
                fact.text.clone(),
                date,
                EventCategory::WikipediaToday,
            );
            event.description = Some(description);
            events.push(event);
        }
    }

    events
}

/// Load birth (and, where present, death) anniversaries of famous people.
pub fn load_famous_birthdays(
    data: &Dataset,
    year: i32,
    selected: Option<&[String]>,
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for person in &data.famous_people {
        if let Some(selected) = selected {
            if !selected.iter().any(|id| id == &person.id) {
                continue;
            }
        }

        match NaiveDate::from_ymd_opt(year, person.birth_date.month(), person.birth_date.day()) {
            Some(date) => {
                let age = year - person.birth_year;
                let mut event = CalendarEvent::single_day(
                    format!("birthday-{}-{}", person.id, year),
                    format!("{}. Geburtstag von {}", age, person.name),
                    date,
                    EventCategory::FamousBirthdays,
                );
                event.description = Some(person_description(person));
                events.push(event);
            }
            None => {
                warn!(person = %person.id, year, "skipping birthday: no such date");
            }
        }

        // A person with death data gets an independent memorial event
        if let (Some(death_date), Some(death_year)) = (person.death_date, person.death_year) {
            match NaiveDate::from_ymd_opt(year, death_date.month(), death_date.day()) {
                Some(date) => {
                    let mut event = CalendarEvent::single_day(
                        format!("memorial-{}-{}", person.id, year),
                        format!("{}. Todestag von {}", year - death_year, person.name),
                        date,
                        EventCategory::FamousBirthdays,
                    );
                    event.description = Some(person_description(person));
                    events.push(event);
                }
                None => {
                    warn!(person = %person.id, year, "skipping memorial day: no such date");
                }
            }
        }
    }

    events
}

fn person_description(person: &crate::data::FamousPerson) -> String {
    let life = match person.death_year {
        Some(death_year) => format!("{}–{}", person.birth_year, death_year),
        None => format!("* {}", person.birth_year),
    };
    match &person.link {
        Some(link) => format!("{} ({})\n{}", person.profession, life, link),
        None => format!("{} ({})", person.profession, life),
    }
}

/// Derive bridge-day suggestions from resolved public holidays.
///
/// Monday and Friday holidays already adjoin a weekend and Saturday or
/// Sunday holidays offer nothing to bridge, so only Tuesday, Wednesday,
/// and Thursday holidays produce a suggestion.
pub fn derive_bridge_days(holidays: &[CalendarEvent]) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for holiday in holidays {
        let date = holiday.start_date;
        let name = clean_holiday_name(&holiday.title);

        let (start, end, title, description) = match date.weekday() {
            Weekday::Tue => (
                date - Duration::days(1),
                date - Duration::days(1),
                format!("Brückentag: {name}"),
                format!("Brückentag vor {name}: 1 Urlaubstag ergibt 4 freie Tage"),
            ),
            Weekday::Thu => (
                date + Duration::days(1),
                date + Duration::days(1),
                format!("Brückentag: {name}"),
                format!("Brückentag nach {name}: 1 Urlaubstag ergibt 4 freie Tage"),
            ),
            Weekday::Wed => (
                date + Duration::days(1),
                date + Duration::days(2),
                format!("Brückentage: {name}"),
                format!("Brückentage nach {name}: 2 Urlaubstage ergeben 5 freie Tage"),
            ),
            _ => continue,
        };

        events.push(CalendarEvent {
            id: format!("bridge-{}", holiday.id),
            title,
            start_date: start,
            end_date: end,
            all_day: true,
            category: EventCategory::BridgeDays,
            region: holiday.region.clone(),
            description: Some(description),
            recurrence: None,
        });
    }

    events
}

/// Strip the parenthetical region-code suffix from a holiday title.
fn clean_holiday_name(title: &str) -> &str {
    match title.find(" (") {
        Some(index) => &title[..index],
        None => title,
    }
}

/// Convert user vacation entries to events.
pub fn vacations_to_events(vacations: &[VacationEntry]) -> Vec<CalendarEvent> {
    vacations
        .iter()
        .map(|entry| CalendarEvent {
            id: format!("vacation-{}", entry.id),
            title: if entry.name.is_empty() {
                "Urlaub".to_string()
            } else {
                entry.name.clone()
            },
            start_date: entry.start_date,
            end_date: entry.end_date,
            all_day: true,
            category: EventCategory::Vacation,
            region: None,
            description: None,
            recurrence: None,
        })
        .collect()
}

/// Load all events for a selection, sorted ascending by start date.
/// Ties keep category-load order (the sort is stable).
pub fn load_events(data: &Dataset, selection: &Selection) -> QalendrResult<Vec<CalendarEvent>> {
    selection.validate()?;

    let year = selection.year;
    let has = |category| selection.categories.contains(&category);
    let mut events: Vec<CalendarEvent> = Vec::new();

    // Fall back to the first region's country prefix when no country is
    // selected explicitly
    let countries: Vec<String> = if selection.countries.is_empty() {
        let derived = selection
            .regions
            .first()
            .and_then(|r| r.split('-').next())
            .unwrap_or("DE");
        vec![derived.to_string()]
    } else {
        selection.countries.clone()
    };

    // Public holidays are also needed transiently for bridge days
    let mut public_holidays = Vec::new();
    if has(EventCategory::PublicHolidays) || has(EventCategory::BridgeDays) {
        for country in &countries {
            public_holidays.extend(load_public_holidays(data, &selection.regions, year, country));
        }
    }

    if has(EventCategory::PublicHolidays) {
        events.extend(public_holidays.iter().cloned());
    }
    if has(EventCategory::SchoolHolidays) {
        events.extend(load_school_holidays(data, &selection.regions, year));
    }
    if has(EventCategory::Observances) {
        events.extend(load_observances(
            data,
            year,
            selection.selected_observances.as_deref(),
        ));
    }
    if has(EventCategory::FunDays) {
        events.extend(load_fun_days(
            data,
            year,
            selection.selected_fun_days.as_deref(),
        ));
    }
    if has(EventCategory::BridgeDays) {
        events.extend(derive_bridge_days(&public_holidays));
    }
    if has(EventCategory::MoonPhases) {
        events.extend(load_moon_phases(data, year));
    }
    if has(EventCategory::WikipediaToday) {
        events.extend(load_on_this_day(data, year));
    }
    if has(EventCategory::FamousBirthdays) {
        events.extend(load_famous_birthdays(
            data,
            year,
            selection.selected_famous_people.as_deref(),
        ));
    }
    if has(EventCategory::Vacation) && !selection.vacations.is_empty() {
        events.extend(
            vacations_to_events(&selection.vacations)
                .into_iter()
                .filter(|event| event.start_date.year() == year),
        );
    }

    // ISO dates sort chronologically, so this matches the string sort of
    // the serialized form; Vec::sort_by is stable
    events.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    Ok(events)
}
