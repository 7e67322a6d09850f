//! Query-string decoding for the calendar endpoint.
//!
//! Parameters are short comma-separated lists: `co` countries, `r` regions,
//! `c` categories, `y` year, `obs`/`fun`/`ppl` optional id filters for
//! observances, fun days, and famous people.

use serde::Deserialize;

use qalendr_core::{EventCategory, Selection};

const MIN_YEAR: i32 = 2020;
const MAX_YEAR: i32 = 2100;

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub co: Option<String>,
    pub r: Option<String>,
    pub c: Option<String>,
    pub y: Option<String>,
    pub obs: Option<String>,
    pub fun: Option<String>,
    pub ppl: Option<String>,
}

fn split_list(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl CalendarQuery {
    /// Decode into a `Selection`, applying the defaults the frontend
    /// relies on. The category default applies only when `c` is absent;
    /// a `c` whose tags are all unknown decodes to an empty list, which
    /// `Selection::validate` then rejects. An out-of-range or unparsable
    /// year falls back to `current_year`.
    pub fn into_selection(self, current_year: i32) -> Selection {
        let countries = {
            let list = split_list(&self.co);
            if list.is_empty() {
                vec!["DE".to_string()]
            } else {
                list
            }
        };

        let categories: Vec<EventCategory> = match &self.c {
            None => vec![EventCategory::SchoolHolidays, EventCategory::PublicHolidays],
            Some(_) => split_list(&self.c)
                .iter()
                .filter_map(|tag| EventCategory::parse_tag(tag))
                .collect(),
        };

        let year = self
            .y
            .as_deref()
            .and_then(|y| y.parse::<i32>().ok())
            .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
            .unwrap_or(current_year);

        let id_filter = |value: &Option<String>| -> Option<Vec<String>> {
            value.as_ref().map(|_| split_list(value))
        };

        Selection {
            countries,
            regions: split_list(&self.r),
            categories,
            year,
            vacations: Vec::new(),
            selected_observances: id_filter(&self.obs),
            selected_fun_days: id_filter(&self.fun),
            selected_famous_people: id_filter(&self.ppl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let selection = CalendarQuery::default().into_selection(2025);
        assert_eq!(selection.countries, vec!["DE"]);
        assert!(selection.regions.is_empty());
        assert_eq!(
            selection.categories,
            vec![EventCategory::SchoolHolidays, EventCategory::PublicHolidays]
        );
        assert_eq!(selection.year, 2025);
        assert_eq!(selection.selected_observances, None);
    }

    #[test]
    fn test_lists_are_comma_separated() {
        let query = CalendarQuery {
            r: Some("DE-BY,DE-BW".to_string()),
            c: Some("public-holidays,bridge-days".to_string()),
            ..CalendarQuery::default()
        };
        let selection = query.into_selection(2025);
        assert_eq!(selection.regions, vec!["DE-BY", "DE-BW"]);
        assert_eq!(
            selection.categories,
            vec![EventCategory::PublicHolidays, EventCategory::BridgeDays]
        );
    }

    #[test]
    fn test_unknown_categories_dropped() {
        let query = CalendarQuery {
            c: Some("public-holidays,wikipedia-random,nonsense".to_string()),
            ..CalendarQuery::default()
        };
        let selection = query.into_selection(2025);
        assert_eq!(selection.categories, vec![EventCategory::PublicHolidays]);
    }

    #[test]
    fn test_all_unknown_categories_yield_rejectable_selection() {
        // c present but entirely invalid must not fall back to the
        // defaults; the resulting empty category list fails validation
        let query = CalendarQuery {
            r: Some("DE-BY".to_string()),
            c: Some("nonsense".to_string()),
            ..CalendarQuery::default()
        };
        let selection = query.into_selection(2025);
        assert!(selection.categories.is_empty());
        assert!(selection.validate().is_err());
    }

    #[test]
    fn test_missing_regions_fail_validation() {
        // No r parameter means no regions; the selection decodes but is
        // rejected before any loading, as a 400 at the boundary
        let selection = CalendarQuery::default().into_selection(2025);
        assert!(selection.regions.is_empty());
        assert!(selection.validate().is_err());
    }

    #[test]
    fn test_year_clamping_and_fallback() {
        for bad in ["1999", "2101", "abc", ""] {
            let query = CalendarQuery {
                y: Some(bad.to_string()),
                ..CalendarQuery::default()
            };
            assert_eq!(query.into_selection(2025).year, 2025, "y={bad}");
        }

        let query = CalendarQuery {
            y: Some("2026".to_string()),
            ..CalendarQuery::default()
        };
        assert_eq!(query.into_selection(2025).year, 2026);
    }

    #[test]
    fn test_empty_id_filter_differs_from_absent() {
        // obs= present but empty means "none selected", not "all"
        let query = CalendarQuery {
            obs: Some(String::new()),
            ..CalendarQuery::default()
        };
        let selection = query.into_selection(2025);
        assert_eq!(selection.selected_observances, Some(Vec::new()));

        let selection = CalendarQuery::default().into_selection(2025);
        assert_eq!(selection.selected_observances, None);
    }
}
