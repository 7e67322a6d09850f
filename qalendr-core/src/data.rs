//! Raw record tables and region lookups.
//!
//! All tables are immutable, externally supplied inputs: the engine reads
//! them, never mutates them. A `Dataset` is passed explicitly into the
//! loaders instead of living as ambient global state, so tests can run
//! against synthetic tables.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{QalendrError, QalendrResult};

/// Country definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub has_school_holidays: bool,
    pub has_states: bool,
}

/// Whether a region code denotes a sub-national state or a whole country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    State,
    Country,
}

/// Region definition (states and country-level pseudo-regions).
#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    pub country: String,
    #[serde(rename = "type")]
    pub kind: RegionKind,
}

/// Public holiday record. `date` is a `DatePattern` string; an absent
/// region list means the holiday applies nationwide.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicHolidayData {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
}

/// One school holiday period for one region, dates inclusive.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolHolidayPeriod {
    pub region: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A school holiday (e.g. summer break) with its per-region periods.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolHolidayData {
    pub id: String,
    pub name: String,
    pub periods: Vec<SchoolHolidayPeriod>,
}

/// School holiday table for one year and country.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolHolidayYearData {
    pub year: i32,
    pub country: String,
    pub holidays: Vec<SchoolHolidayData>,
}

/// Observance or fun-day record. `date` is a `DatePattern` string.
#[derive(Debug, Clone, Deserialize)]
pub struct SpecialDayData {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Moon phase kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoonPhase {
    NewMoon,
    FirstQuarter,
    FullMoon,
    LastQuarter,
}

impl MoonPhase {
    /// Display title for the generated event.
    pub fn title(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "Neumond 🌑",
            MoonPhase::FirstQuarter => "Zunehmender Halbmond 🌓",
            MoonPhase::FullMoon => "Vollmond 🌕",
            MoonPhase::LastQuarter => "Abnehmender Halbmond 🌗",
        }
    }

    /// Stable tag used in event ids.
    pub fn tag(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "neumond",
            MoonPhase::FirstQuarter => "zunehmend",
            MoonPhase::FullMoon => "vollmond",
            MoonPhase::LastQuarter => "abnehmend",
        }
    }
}

/// A single moon phase entry in the year-keyed table.
#[derive(Debug, Clone, Deserialize)]
pub struct MoonPhaseData {
    pub date: NaiveDate,
    pub phase: MoonPhase,
}

/// A historical "on this day" fact, keyed by MM-DD in the table.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricalEvent {
    pub year: i32,
    pub text: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Famous person with birth data and optionally death data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamousPerson {
    pub id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub birth_year: i32,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_year: Option<i32>,
    pub profession: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountriesFile {
    countries: Vec<Country>,
}

#[derive(Debug, Deserialize)]
struct RegionsFile {
    regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct PublicHolidaysFile {
    country: String,
    holidays: Vec<PublicHolidayData>,
}

#[derive(Debug, Deserialize)]
struct SpecialDaysFile {
    #[allow(dead_code)]
    description: String,
    days: Vec<SpecialDayData>,
}

#[derive(Debug, Deserialize)]
struct MoonPhasesFile {
    #[allow(dead_code)]
    description: String,
    years: BTreeMap<i32, Vec<MoonPhaseData>>,
}

#[derive(Debug, Deserialize)]
struct OnThisDayFile {
    #[allow(dead_code)]
    description: String,
    events: BTreeMap<String, Vec<HistoricalEvent>>,
}

#[derive(Debug, Deserialize)]
struct FamousPeopleFile {
    #[allow(dead_code)]
    description: String,
    people: Vec<FamousPerson>,
}

/// All raw record tables, bundled. Process-lifetime-constant once loaded.
#[derive(Debug, Default)]
pub struct Dataset {
    pub countries: Vec<Country>,
    pub regions: Vec<Region>,
    /// Public holidays keyed by country code.
    pub public_holidays: HashMap<String, Vec<PublicHolidayData>>,
    /// School holidays keyed by year.
    pub school_holidays: BTreeMap<i32, SchoolHolidayYearData>,
    pub observances: Vec<SpecialDayData>,
    pub fun_days: Vec<SpecialDayData>,
    /// Moon phases keyed by year.
    pub moon_phases: BTreeMap<i32, Vec<MoonPhaseData>>,
    /// Historical facts keyed by "MM-DD".
    pub on_this_day: BTreeMap<String, Vec<HistoricalEvent>>,
    pub famous_people: Vec<FamousPerson>,
}

impl Dataset {
    /// Parse the data tables embedded in the crate.
    pub fn bundled() -> QalendrResult<Self> {
        let countries: CountriesFile =
            serde_json::from_str(include_str!("../data/countries.json"))?;
        let regions: RegionsFile = serde_json::from_str(include_str!("../data/regions.json"))?;

        let mut public_holidays = HashMap::new();
        for raw in [
            include_str!("../data/holidays/de.json"),
            include_str!("../data/holidays/at.json"),
            include_str!("../data/holidays/us.json"),
        ] {
            let file: PublicHolidaysFile = serde_json::from_str(raw)?;
            public_holidays.insert(file.country, file.holidays);
        }

        let mut school_holidays = BTreeMap::new();
        for raw in [
            include_str!("../data/school-holidays/2025.json"),
            include_str!("../data/school-holidays/2026.json"),
        ] {
            let file: SchoolHolidayYearData = serde_json::from_str(raw)?;
            school_holidays.insert(file.year, file);
        }

        let observances: SpecialDaysFile =
            serde_json::from_str(include_str!("../data/special-days/observances.json"))?;
        let fun_days: SpecialDaysFile =
            serde_json::from_str(include_str!("../data/special-days/fun-days.json"))?;
        let moon_phases: MoonPhasesFile =
            serde_json::from_str(include_str!("../data/moon-phases.json"))?;
        let on_this_day: OnThisDayFile =
            serde_json::from_str(include_str!("../data/wikipedia-today.json"))?;
        let famous_people: FamousPeopleFile =
            serde_json::from_str(include_str!("../data/famous-people.json"))?;

        Ok(Dataset {
            countries: countries.countries,
            regions: regions.regions,
            public_holidays,
            school_holidays,
            observances: observances.days,
            fun_days: fun_days.days,
            moon_phases: moon_phases.years,
            on_this_day: on_this_day.events,
            famous_people: famous_people.people,
        })
    }

    pub fn country_by_code(&self, code: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.code == code)
    }

    pub fn region_by_code(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    pub fn regions_by_country(&self, country: &str) -> Vec<&Region> {
        self.regions.iter().filter(|r| r.country == country).collect()
    }

    /// State-level region codes for a country, in declared table order.
    pub fn state_codes(&self, country: &str) -> Vec<&str> {
        self.regions
            .iter()
            .filter(|r| r.country == country && r.kind == RegionKind::State)
            .map(|r| r.code.as_str())
            .collect()
    }

    /// Expand region codes: a country-level code becomes the country's full
    /// state set (or stays itself for countries without states). Unknown
    /// codes are dropped. Set-union semantics, stable first-seen order,
    /// idempotent.
    pub fn expand_regions(&self, codes: &[String]) -> Vec<String> {
        let mut expanded: Vec<String> = Vec::new();
        let mut push = |code: &str, out: &mut Vec<String>| {
            if !out.iter().any(|c| c == code) {
                out.push(code.to_string());
            }
        };

        for code in codes {
            let Some(region) = self.region_by_code(code) else {
                continue;
            };

            match region.kind {
                RegionKind::Country => {
                    let states = self.state_codes(&region.country);
                    if states.is_empty() {
                        push(code, &mut expanded);
                    } else {
                        for state in states {
                            push(state, &mut expanded);
                        }
                    }
                }
                RegionKind::State => push(code, &mut expanded),
            }
        }

        expanded
    }

    /// Public holiday table for a country.
    pub fn public_holidays(&self, country: &str) -> QalendrResult<&[PublicHolidayData]> {
        self.public_holidays
            .get(country)
            .map(Vec::as_slice)
            .ok_or_else(|| QalendrError::MissingData {
                category: "public holiday",
                scope: country.to_string(),
            })
    }

    pub fn has_holiday_data(&self, country: &str) -> bool {
        self.public_holidays.contains_key(country)
    }

    pub fn school_holiday_year(&self, year: i32) -> Option<&SchoolHolidayYearData> {
        self.school_holidays.get(&year)
    }

    /// Years with school holiday data, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        self.school_holidays.keys().copied().collect()
    }

    pub fn moon_phases(&self, year: i32) -> Option<&[MoonPhaseData]> {
        self.moon_phases.get(&year).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(code: &str, name: &str, country: &str, kind: RegionKind) -> Region {
        Region {
            code: code.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            kind,
        }
    }

    fn test_dataset() -> Dataset {
        Dataset {
            regions: vec![
                region("DE", "Deutschland", "DE", RegionKind::Country),
                region("DE-BW", "Baden-Württemberg", "DE", RegionKind::State),
                region("DE-BY", "Bayern", "DE", RegionKind::State),
                region("AT", "Österreich", "AT", RegionKind::Country),
            ],
            ..Dataset::default()
        }
    }

    fn codes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_country_to_states() {
        let data = test_dataset();
        assert_eq!(data.expand_regions(&codes(&["DE"])), codes(&["DE-BW", "DE-BY"]));
    }

    #[test]
    fn test_expand_country_without_states_stays_itself() {
        let data = test_dataset();
        assert_eq!(data.expand_regions(&codes(&["AT"])), codes(&["AT"]));
    }

    #[test]
    fn test_expand_is_idempotent() {
        let data = test_dataset();
        for input in [codes(&["DE"]), codes(&["DE", "AT"]), codes(&["DE-BY", "DE"])] {
            let once = data.expand_regions(&input);
            let twice = data.expand_regions(&once);
            assert_eq!(once, twice, "input {input:?}");
        }
    }

    #[test]
    fn test_expand_collapses_duplicates() {
        let data = test_dataset();
        assert_eq!(
            data.expand_regions(&codes(&["DE-BY", "DE-BY", "DE"])),
            codes(&["DE-BY", "DE-BW"])
        );
    }

    #[test]
    fn test_expand_drops_unknown_codes() {
        let data = test_dataset();
        assert_eq!(data.expand_regions(&codes(&["XX", "DE-BY"])), codes(&["DE-BY"]));
    }

    #[test]
    fn test_bundled_dataset_parses() {
        let data = Dataset::bundled().unwrap();
        assert!(data.has_holiday_data("DE"));
        assert!(data.has_holiday_data("US"));
        assert!(!data.has_holiday_data("XX"));
        assert_eq!(data.state_codes("DE").len(), 16);
        assert_eq!(data.available_years(), vec![2025, 2026]);
        assert!(data.country_by_code("DE").unwrap().has_school_holidays);
    }

    #[test]
    fn test_missing_country_table_is_an_error() {
        let data = test_dataset();
        assert!(matches!(
            data.public_holidays("FR"),
            Err(QalendrError::MissingData { .. })
        ));
    }
}
