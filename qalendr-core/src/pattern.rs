//! Date pattern resolution.
//!
//! A `DatePattern` is a symbolic, year-independent encoding of a date rule:
//! a fixed `MM-DD` date, an Easter-relative offset (`easter+50`), an
//! Nth-or-last-weekday-of-month rule (`second-monday-06`), or a named day
//! bound to a fixed computation (`buss-und-bettag`, `thanksgiving-us`).
//!
//! Resolution is a pure function of (pattern, year): it never consults any
//! other event and yields the same date for the same inputs every time.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{QalendrError, QalendrResult};

/// Which occurrence of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Occurrence {
    /// 1-indexed occurrence number, or `None` for `Last`.
    fn nth(self) -> Option<u32> {
        match self {
            Occurrence::First => Some(1),
            Occurrence::Second => Some(2),
            Occurrence::Third => Some(3),
            Occurrence::Fourth => Some(4),
            Occurrence::Last => None,
        }
    }
}

/// Symbolic days, each bound to a specific fixed computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedDay {
    /// German Buß- und Bettag: the Wednesday between Nov 16 and Nov 22.
    BussUndBettag,
    /// US Thanksgiving: fourth Thursday in November.
    ThanksgivingUs,
    /// US Memorial Day: last Monday in May.
    MemorialDay,
    /// US Labor Day: first Monday in September.
    LaborDayUs,
    /// US MLK Day: third Monday in January.
    MlkDay,
    /// US Presidents Day: third Monday in February.
    PresidentsDay,
    /// US Columbus Day: second Monday in October.
    ColumbusDay,
    /// UK Early May Bank Holiday: first Monday in May.
    EarlyMayBankHoliday,
    /// UK Spring Bank Holiday: last Monday in May.
    SpringBankHoliday,
    /// UK Summer Bank Holiday: last Monday in August.
    SummerBankHoliday,
    /// Canadian Thanksgiving: second Monday in October.
    ThanksgivingCa,
    /// Canadian Victoria Day: the Monday on or before May 24.
    VictoriaDay,
    /// Australian Queen's Birthday: second Monday in June (most states).
    QueensBirthdayAu,
    /// European DST start: last Sunday in March.
    DstSpring,
    /// European DST end: last Sunday in October.
    DstAutumn,
}

/// A parsed, year-independent date rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePattern {
    /// Fixed `MM-DD` date.
    Fixed { month: u32, day: u32 },
    /// Easter Sunday plus a signed day offset.
    EasterOffset(i64),
    /// Nth or last occurrence of a weekday in a month.
    NthWeekday {
        occurrence: Occurrence,
        weekday: Weekday,
        month: u32,
    },
    /// Symbolic day with a fixed computation.
    Named(NamedDay),
}

impl DatePattern {
    /// Resolve this pattern for a concrete year.
    pub fn resolve(&self, year: i32) -> QalendrResult<NaiveDate> {
        match *self {
            DatePattern::Fixed { month, day } => {
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    QalendrError::UnknownPattern(format!(
                        "{month:02}-{day:02} does not exist in {year}"
                    ))
                })
            }
            DatePattern::EasterOffset(offset) => Ok(easter_sunday(year) + Duration::days(offset)),
            DatePattern::NthWeekday {
                occurrence,
                weekday,
                month,
            } => match occurrence.nth() {
                Some(n) => nth_weekday(year, month, weekday, n),
                None => last_weekday(year, month, weekday),
            },
            DatePattern::Named(day) => day.resolve(year),
        }
    }
}

impl NamedDay {
    fn resolve(self, year: i32) -> QalendrResult<NaiveDate> {
        match self {
            NamedDay::BussUndBettag => buss_und_bettag(year),
            NamedDay::ThanksgivingUs => nth_weekday(year, 11, Weekday::Thu, 4),
            NamedDay::MemorialDay => last_weekday(year, 5, Weekday::Mon),
            NamedDay::LaborDayUs => nth_weekday(year, 9, Weekday::Mon, 1),
            NamedDay::MlkDay => nth_weekday(year, 1, Weekday::Mon, 3),
            NamedDay::PresidentsDay => nth_weekday(year, 2, Weekday::Mon, 3),
            NamedDay::ColumbusDay => nth_weekday(year, 10, Weekday::Mon, 2),
            NamedDay::EarlyMayBankHoliday => nth_weekday(year, 5, Weekday::Mon, 1),
            NamedDay::SpringBankHoliday => last_weekday(year, 5, Weekday::Mon),
            NamedDay::SummerBankHoliday => last_weekday(year, 8, Weekday::Mon),
            NamedDay::ThanksgivingCa => nth_weekday(year, 10, Weekday::Mon, 2),
            NamedDay::VictoriaDay => victoria_day(year),
            NamedDay::QueensBirthdayAu => nth_weekday(year, 6, Weekday::Mon, 2),
            NamedDay::DstSpring => last_weekday(year, 3, Weekday::Sun),
            NamedDay::DstAutumn => last_weekday(year, 10, Weekday::Sun),
        }
    }
}

impl FromStr for DatePattern {
    type Err = QalendrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(pattern) = parse_fixed(s) {
            return Ok(pattern);
        }

        if let Some(rest) = s.strip_prefix("easter") {
            if rest.is_empty() {
                return Ok(DatePattern::EasterOffset(0));
            }
            if rest.starts_with('+') || rest.starts_with('-') {
                if let Ok(offset) = rest.parse::<i64>() {
                    return Ok(DatePattern::EasterOffset(offset));
                }
            }
            return Err(QalendrError::UnknownPattern(s.to_string()));
        }

        if let Some(day) = parse_named(s) {
            return Ok(DatePattern::Named(day));
        }

        if let Some(pattern) = parse_nth_weekday(s) {
            return Ok(pattern);
        }

        Err(QalendrError::UnknownPattern(s.to_string()))
    }
}

impl fmt::Display for DatePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DatePattern::Fixed { month, day } => write!(f, "{month:02}-{day:02}"),
            DatePattern::EasterOffset(0) => write!(f, "easter"),
            DatePattern::EasterOffset(offset) => write!(f, "easter{offset:+}"),
            DatePattern::NthWeekday {
                occurrence,
                weekday,
                month,
            } => {
                let occ = match occurrence {
                    Occurrence::First => "first",
                    Occurrence::Second => "second",
                    Occurrence::Third => "third",
                    Occurrence::Fourth => "fourth",
                    Occurrence::Last => "last",
                };
                let day = match weekday {
                    Weekday::Sun => "sunday",
                    Weekday::Mon => "monday",
                    Weekday::Tue => "tuesday",
                    Weekday::Wed => "wednesday",
                    Weekday::Thu => "thursday",
                    Weekday::Fri => "friday",
                    Weekday::Sat => "saturday",
                };
                write!(f, "{occ}-{day}-{month:02}")
            }
            DatePattern::Named(named) => {
                let tag = match named {
                    NamedDay::BussUndBettag => "buss-und-bettag",
                    NamedDay::ThanksgivingUs => "thanksgiving-us",
                    NamedDay::MemorialDay => "memorial-day",
                    NamedDay::LaborDayUs => "labor-day-us",
                    NamedDay::MlkDay => "mlk-day",
                    NamedDay::PresidentsDay => "presidents-day",
                    NamedDay::ColumbusDay => "columbus-day",
                    NamedDay::EarlyMayBankHoliday => "early-may-bank-holiday",
                    NamedDay::SpringBankHoliday => "spring-bank-holiday",
                    NamedDay::SummerBankHoliday => "summer-bank-holiday",
                    NamedDay::ThanksgivingCa => "thanksgiving-ca",
                    NamedDay::VictoriaDay => "victoria-day",
                    NamedDay::QueensBirthdayAu => "queens-birthday-au",
                    NamedDay::DstSpring => "dst-spring",
                    NamedDay::DstAutumn => "dst-autumn",
                };
                write!(f, "{tag}")
            }
        }
    }
}

/// Parse and resolve a pattern string in one step.
pub fn resolve_pattern(pattern: &str, year: i32) -> QalendrResult<NaiveDate> {
    pattern.parse::<DatePattern>()?.resolve(year)
}

fn parse_fixed(s: &str) -> Option<DatePattern> {
    let (m, d) = s.split_once('-')?;
    if m.len() != 2 || d.len() != 2 {
        return None;
    }
    if !m.bytes().all(|b| b.is_ascii_digit()) || !d.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = m.parse().ok()?;
    let day: u32 = d.parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(DatePattern::Fixed { month, day })
}

fn parse_named(s: &str) -> Option<NamedDay> {
    let day = match s {
        "buss-und-bettag" => NamedDay::BussUndBettag,
        "thanksgiving-us" => NamedDay::ThanksgivingUs,
        "memorial-day" => NamedDay::MemorialDay,
        "labor-day-us" => NamedDay::LaborDayUs,
        "mlk-day" => NamedDay::MlkDay,
        "presidents-day" => NamedDay::PresidentsDay,
        "columbus-day" => NamedDay::ColumbusDay,
        "early-may-bank-holiday" => NamedDay::EarlyMayBankHoliday,
        "spring-bank-holiday" => NamedDay::SpringBankHoliday,
        "summer-bank-holiday" => NamedDay::SummerBankHoliday,
        "thanksgiving-ca" => NamedDay::ThanksgivingCa,
        "victoria-day" => NamedDay::VictoriaDay,
        "queens-birthday-au" => NamedDay::QueensBirthdayAu,
        "dst-spring" => NamedDay::DstSpring,
        "dst-autumn" => NamedDay::DstAutumn,
        _ => return None,
    };
    Some(day)
}

fn parse_nth_weekday(s: &str) -> Option<DatePattern> {
    let mut parts = s.split('-');
    let occ = parts.next()?;
    let day = parts.next()?;
    let month = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let occurrence = match occ {
        "first" => Occurrence::First,
        "second" => Occurrence::Second,
        "third" => Occurrence::Third,
        "fourth" => Occurrence::Fourth,
        "last" => Occurrence::Last,
        _ => return None,
    };
    let weekday = match day {
        "sunday" => Weekday::Sun,
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        _ => return None,
    };
    if month.len() != 2 {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }

    Some(DatePattern::NthWeekday {
        occurrence,
        weekday,
        month,
    })
}

/// Easter Sunday via the anonymous Gregorian algorithm
/// (Meeus/Jones/Butcher). Valid for any Gregorian year.
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap()
}

/// Nth occurrence of a weekday in a month (n is 1-indexed).
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> QalendrResult<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        QalendrError::UnknownPattern(format!("invalid month {month} in {year}"))
    })?;

    let until_first =
        (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
    let day = 1 + until_first + (n - 1) * 7;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        QalendrError::UnknownPattern(format!(
            "no occurrence {n} of {weekday} in {year}-{month:02}"
        ))
    })
}

/// Last occurrence of a weekday in a month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> QalendrResult<NaiveDate> {
    let next_month = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1),
        m => NaiveDate::from_ymd_opt(year, m + 1, 1),
    }
    .ok_or_else(|| QalendrError::UnknownPattern(format!("invalid month {month} in {year}")))?;

    let last = next_month - Duration::days(1);
    let back = (last.weekday().num_days_from_sunday() + 7 - weekday.num_days_from_sunday()) % 7;
    Ok(last - Duration::days(back as i64))
}

/// Buß- und Bettag: November 23 minus `((weekday(Nov 23) + 4) mod 7)` days,
/// with a zero result corrected to 7. Always a Wednesday in Nov 16..=22,
/// never Nov 23 itself.
fn buss_und_bettag(year: i32) -> QalendrResult<NaiveDate> {
    let nov23 = NaiveDate::from_ymd_opt(year, 11, 23)
        .ok_or_else(|| QalendrError::UnknownPattern(format!("invalid year {year}")))?;

    let mut back = (nov23.weekday().num_days_from_sunday() + 4) % 7;
    if back == 0 {
        back = 7;
    }

    Ok(nov23 - Duration::days(back as i64))
}

/// Victoria Day: the Monday on or before May 24.
fn victoria_day(year: i32) -> QalendrResult<NaiveDate> {
    let may24 = NaiveDate::from_ymd_opt(year, 5, 24)
        .ok_or_else(|| QalendrError::UnknownPattern(format!("invalid year {year}")))?;

    Ok(may24 - Duration::days(may24.weekday().num_days_from_monday() as i64))
}
